use std::num::NonZeroUsize;

use machine_learning::{arch::Dims, training::TrainerSpec};

use super::{Config, DatasetConfig, HoldoutConfig, ModelConfig, TrainingConfig};
use crate::TrainerError;

/// Validates the user facing configuration and turns it into the library's types.
#[derive(Default)]
pub struct Adapter;

impl Adapter {
    pub fn new() -> Self {
        Self
    }

    /// Checks the whole configuration before any data is read.
    ///
    /// # Returns
    /// The layer sizes and the trainer's hyperparameters.
    ///
    /// # Errors
    /// `TrainerError::InvalidConfig` describing the first invalid value.
    pub fn adapt_configs(&self, config: &Config) -> Result<(Dims, TrainerSpec), TrainerError> {
        let dims = self.adapt_model(&config.model)?;
        let spec = self.adapt_training(&config.training)?;
        self.validate_holdout(&config.holdout)?;
        self.validate_dataset(&config.dataset, dims)?;
        Ok((dims, spec))
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    fn validate_holdout(&self, holdout: &HoldoutConfig) -> Result<(), TrainerError> {
        if !(0. ..1.).contains(&holdout.fraction) {
            return Err(TrainerError::InvalidConfig(format!(
                "holdout fraction ({}) must be in [0, 1)",
                holdout.fraction
            )));
        }

        Ok(())
    }

    fn validate_dataset(&self, dataset: &DatasetConfig, dims: Dims) -> Result<(), TrainerError> {
        match *dataset {
            DatasetConfig::Csv { pixel_scale, .. } => {
                if !(pixel_scale.is_finite() && pixel_scale > 0.) {
                    return Err(TrainerError::InvalidConfig(format!(
                        "pixel_scale ({pixel_scale}) must be a positive number"
                    )));
                }
            }
            DatasetConfig::Synthetic {
                samples, spread, ..
            } => {
                if samples == 0 {
                    return Err(TrainerError::InvalidConfig(
                        "synthetic dataset must have at least one sample".into(),
                    ));
                }
                if !(spread.is_finite() && spread >= 0.) {
                    return Err(TrainerError::InvalidConfig(format!(
                        "spread ({spread}) must be a non negative number"
                    )));
                }
                if dims.input < dims.output {
                    return Err(TrainerError::InvalidConfig(format!(
                        "synthetic clusters need input_size ({}) >= output_size ({})",
                        dims.input, dims.output
                    )));
                }
            }
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Adaptation
    // -------------------------------------------------------------------------

    /// # Errors
    /// `TrainerError::InvalidConfig` if any layer size is zero.
    pub fn adapt_model(&self, model: &ModelConfig) -> Result<Dims, TrainerError> {
        Dims::new(model.input_size, model.hidden_size, model.output_size)
            .map_err(|e| TrainerError::InvalidConfig(e.to_string()))
    }

    fn adapt_training(&self, training: &TrainingConfig) -> Result<TrainerSpec, TrainerError> {
        let learning_rate = training.learning_rate;
        if !(learning_rate.is_finite() && learning_rate > 0.) {
            return Err(TrainerError::InvalidConfig(format!(
                "learning_rate ({learning_rate}) must be a positive number"
            )));
        }

        Ok(TrainerSpec {
            learning_rate,
            epochs: self.non_zero("epochs", training.epochs)?,
            batch_size: self.non_zero("batch_size", training.batch_size)?,
            seed: training.seed,
        })
    }

    fn non_zero(&self, name: &str, value: usize) -> Result<NonZeroUsize, TrainerError> {
        NonZeroUsize::new(value)
            .ok_or_else(|| TrainerError::InvalidConfig(format!("{name} must be greater than 0")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::from_json(
            r#"{
                "model": { "input_size": 4, "hidden_size": 8, "output_size": 2 },
                "training": { "learning_rate": 0.01, "epochs": 20, "batch_size": 10, "seed": 3 },
                "dataset": { "kind": "synthetic", "samples": 40, "spread": 0.05 }
            }"#,
        )
        .unwrap()
    }

    fn assert_invalid(config: &Config) {
        assert!(matches!(
            Adapter::new().adapt_configs(config),
            Err(TrainerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn valid_config() {
        let (dims, spec) = Adapter::new().adapt_configs(&config()).unwrap();

        assert_eq!(dims, Dims::new(4, 8, 2).unwrap());
        assert_eq!(spec.learning_rate, 0.01);
        assert_eq!(spec.epochs.get(), 20);
        assert_eq!(spec.batch_size.get(), 10);
        assert_eq!(spec.seed, Some(3));
    }

    #[test]
    fn zero_sizes_are_invalid() {
        let mut c = config();
        c.model.hidden_size = 0;
        assert_invalid(&c);

        let mut c = config();
        c.training.epochs = 0;
        assert_invalid(&c);

        let mut c = config();
        c.training.batch_size = 0;
        assert_invalid(&c);
    }

    #[test]
    fn non_positive_learning_rate_is_invalid() {
        for learning_rate in [0., -0.1, f64::NAN] {
            let mut c = config();
            c.training.learning_rate = learning_rate;
            assert_invalid(&c);
        }
    }

    #[test]
    fn holdout_fraction_must_leave_training_samples() {
        let mut c = config();
        c.holdout.fraction = 1.;
        assert_invalid(&c);
    }

    #[test]
    fn dataset_values_are_checked() {
        let mut c = config();
        c.dataset = DatasetConfig::Csv {
            path: "x.csv".into(),
            has_headers: false,
            pixel_scale: 0.,
        };
        assert_invalid(&c);

        let mut c = config();
        c.model.input_size = 1;
        assert_invalid(&c);
    }
}
