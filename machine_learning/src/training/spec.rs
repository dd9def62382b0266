use std::num::NonZeroUsize;

pub const DEFAULT_LEARNING_RATE: f64 = 0.001;
pub const DEFAULT_EPOCHS: NonZeroUsize = NonZeroUsize::new(15).unwrap();
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(50).unwrap();

/// The hyperparameters of a training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerSpec {
    pub learning_rate: f64,
    pub epochs: NonZeroUsize,
    pub batch_size: NonZeroUsize,
    /// Seeds the shuffling, `None` draws the seed from the OS.
    pub seed: Option<u64>,
}

impl Default for TrainerSpec {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
        }
    }
}
