use std::path::PathBuf;

use machine_learning::training::{DEFAULT_BATCH_SIZE, DEFAULT_EPOCHS, DEFAULT_LEARNING_RATE};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainingConfig {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

fn default_epochs() -> usize {
    DEFAULT_EPOCHS.get()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE.get()
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            seed: None,
        }
    }
}

/// How much of the dataset is kept away from training to measure accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HoldoutConfig {
    #[serde(default = "default_holdout_fraction")]
    pub fraction: f64,
    #[serde(default = "default_holdout_seed")]
    pub seed: u64,
}

fn default_holdout_fraction() -> f64 {
    0.2
}

fn default_holdout_seed() -> u64 {
    42
}

impl Default for HoldoutConfig {
    fn default() -> Self {
        Self {
            fraction: default_holdout_fraction(),
            seed: default_holdout_seed(),
        }
    }
}

/// Where the samples come from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetConfig {
    /// A csv file, one sample per record: the label followed by the raw features.
    Csv {
        path: PathBuf,
        #[serde(default)]
        has_headers: bool,
        /// Every raw feature is divided by this value.
        #[serde(default = "default_pixel_scale")]
        pixel_scale: f64,
    },
    /// Gaussian clusters, one per class, see `machine_learning::data::Clusters`.
    Synthetic {
        samples: usize,
        #[serde(default = "default_spread")]
        spread: f64,
        #[serde(default)]
        seed: u64,
    },
}

fn default_pixel_scale() -> f64 {
    255.
}

fn default_spread() -> f64 {
    0.1
}
