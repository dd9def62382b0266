mod adapter;
mod model;
mod training;

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

pub use adapter::Adapter;
pub use model::ModelConfig;
pub use training::{DatasetConfig, HoldoutConfig, TrainingConfig};

use crate::TrainerError;

/// The whole configuration surface of the trainer, read from a json file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub holdout: HoldoutConfig,
    /// The directory the trained parameters are stored in.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("params")
}

impl Config {
    /// Parses a configuration from its json representation.
    pub fn from_json(json: &str) -> Result<Self, TrainerError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses the configuration file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TrainerError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = Config::from_json(r#"{ "dataset": { "kind": "synthetic", "samples": 10 } }"#)
            .unwrap();

        assert_eq!(config.model, ModelConfig::default());
        assert_eq!(config.model.hidden_size, 128);
        assert_eq!(config.training, TrainingConfig::default());
        assert_eq!(config.training.batch_size, 50);
        assert_eq!(config.holdout, HoldoutConfig::default());
        assert_eq!(config.output_dir, PathBuf::from("params"));
        assert_eq!(
            config.dataset,
            DatasetConfig::Synthetic {
                samples: 10,
                spread: 0.1,
                seed: 0
            }
        );
    }

    #[test]
    fn csv_dataset() {
        let json = r#"{
            "model": { "input_size": 4, "hidden_size": 8, "output_size": 2 },
            "training": { "learning_rate": 0.01, "epochs": 3, "batch_size": 2, "seed": 1 },
            "dataset": { "kind": "csv", "path": "data/train.csv", "has_headers": true },
            "output_dir": "out"
        }"#;
        let config = Config::from_json(json).unwrap();

        assert_eq!(config.training.seed, Some(1));
        assert_eq!(
            config.dataset,
            DatasetConfig::Csv {
                path: "data/train.csv".into(),
                has_headers: true,
                pixel_scale: 255.
            }
        );
    }

    #[test]
    fn unknown_fields_fail() {
        let json = r#"{ "dataset": { "kind": "synthetic", "samples": 10 }, "momentum": 0.9 }"#;
        assert!(matches!(Config::from_json(json), Err(TrainerError::Json(_))));
    }

    #[test]
    fn dataset_is_required() {
        assert!(Config::from_json("{}").is_err());
    }
}
