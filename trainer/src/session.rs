use std::path::PathBuf;

use log::info;
use machine_learning::{
    arch::ParamSet,
    data::Dataset,
    evaluation, persistence,
    training::{LossTrace, SgdTrainer, TrainerBuilder},
};

use crate::{
    TrainerError,
    configs::{Adapter, Config},
    load_dataset,
};

/// The outcome of a finished training run.
#[derive(Debug, Clone)]
pub struct Report {
    pub trace: LossTrace,
    /// Accuracy over the held out samples, `None` if nothing was held out.
    pub holdout_accuracy: Option<f64>,
    pub train_samples: usize,
    pub holdout_samples: usize,
}

/// A training run that's ready to start: the data is loaded and split, the parameters are
/// initialized.
pub struct Session {
    params: ParamSet,
    trainer: SgdTrainer,
    train: Dataset,
    holdout: Dataset,
    output_dir: PathBuf,
}

impl Session {
    /// Creates a new `Session`.
    ///
    /// # Arguments
    /// * `config` - The configuration of the whole run.
    ///
    /// # Errors
    /// If the configuration is invalid or the dataset can't be loaded.
    pub fn new(config: &Config) -> Result<Self, TrainerError> {
        info!("adapting configs");
        let (dims, spec) = Adapter::new().adapt_configs(config)?;

        let dataset = load_dataset(&config.dataset, dims)?;
        let (train, holdout) = dataset.split(config.holdout.fraction, config.holdout.seed)?;
        info!(
            "{} training and {} holdout samples",
            train.len(),
            holdout.len()
        );

        let (params, trainer) = TrainerBuilder::new().build_initialized(&spec, dims)?;

        Ok(Self {
            params,
            trainer,
            train,
            holdout,
            output_dir: config.output_dir.clone(),
        })
    }

    /// Trains the parameters, measures them against the holdout samples and stores them.
    ///
    /// # Returns
    /// The trained parameters along with a report of the run.
    pub fn run(mut self) -> Result<(ParamSet, Report), TrainerError> {
        let trace = self.trainer.train(&mut self.params, &mut self.train)?;

        let holdout_accuracy = if self.holdout.is_empty() {
            None
        } else {
            let accuracy = evaluation::accuracy(&self.params, &self.holdout)?;
            info!(accuracy = accuracy; "holdout accuracy: {accuracy:.4}");
            Some(accuracy)
        };

        persistence::save(&self.params, &self.output_dir)?;

        let report = Report {
            trace,
            holdout_accuracy,
            train_samples: self.train.len(),
            holdout_samples: self.holdout.len(),
        };

        Ok((self.params, report))
    }
}
