mod builder;
mod model_trainer;
mod spec;
mod trace;

pub use builder::{SgdTrainer, TrainerBuilder};
pub use model_trainer::ModelTrainer;
pub use spec::{DEFAULT_BATCH_SIZE, DEFAULT_EPOCHS, DEFAULT_LEARNING_RATE, TrainerSpec};
pub use trace::LossTrace;
