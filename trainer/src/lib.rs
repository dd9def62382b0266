pub mod configs;
pub mod data;
pub mod error;
mod session;

use log::info;
use machine_learning::{
    MlErr,
    arch::{Dims, ParamSet},
    data::{Clusters, Dataset, DatasetProvider},
    evaluation::{self, Prediction},
    persistence,
    preprocess::{self, Canvas},
};
use ndarray::{Array1, ArrayView1};

use configs::{Adapter, Config, DatasetConfig};
use data::CsvProvider;

pub use error::TrainerError;
pub use session::{Report, Session};

/// Loads the configured dataset, with samples of `dims.input` features labeled with one of
/// `dims.output` classes.
pub fn load_dataset(dataset: &DatasetConfig, dims: Dims) -> Result<Dataset, TrainerError> {
    match *dataset {
        DatasetConfig::Csv {
            ref path,
            has_headers,
            pixel_scale,
        } => {
            let provider = CsvProvider {
                x_size: dims.input,
                classes: dims.output,
                has_headers,
                pixel_scale,
            };
            provider.load(&path.to_string_lossy())
        }
        DatasetConfig::Synthetic {
            samples,
            spread,
            seed,
        } => {
            let clusters = Clusters {
                classes: dims.output,
                x_size: dims.input,
                samples,
                spread,
                seed,
            };
            Ok(clusters.load("synthetic")?)
        }
    }
}

/// Runs a whole training session: loads and splits the data, trains, evaluates the holdout and
/// stores the parameters in `config.output_dir`.
///
/// # Errors
/// Returns a `TrainerError` if the configuration is invalid or any stage of the run fails.
pub fn train(config: &Config) -> Result<(ParamSet, Report), TrainerError> {
    Session::new(config)?.run()
}

/// Measures the stored parameters against the configured dataset.
///
/// # Arguments
/// * `config` - The configuration the parameters were trained with.
/// * `whole` - Whether to use every sample instead of only the holdout ones.
pub fn evaluate(config: &Config, whole: bool) -> Result<f64, TrainerError> {
    let dims = Adapter::new().adapt_model(&config.model)?;
    let params = persistence::load(&config.output_dir, dims)?;

    let dataset = load_dataset(&config.dataset, dims)?;
    let dataset = if whole {
        dataset
    } else {
        dataset.split(config.holdout.fraction, config.holdout.seed)?.1
    };

    let accuracy = evaluation::accuracy(&params, &dataset)?;
    info!(accuracy = accuracy, samples = dataset.len(); "evaluated {} samples", dataset.len());
    Ok(accuracy)
}

/// Classifies a single feature vector with the stored parameters.
pub fn predict(config: &Config, features: ArrayView1<f64>) -> Result<Prediction, TrainerError> {
    let dims = Adapter::new().adapt_model(&config.model)?;
    let params = persistence::load(&config.output_dir, dims)?;
    Ok(evaluation::classify(&params, features)?)
}

/// Parses the input of a prediction. It's either a single row with exactly `dims.input`
/// features, or a grid of grayscale brightnesses (dark ink on white) holding a drawn digit, which
/// is normalized into a 28×28 image.
///
/// # Errors
/// If the text is not a table, or it is a drawing but the network doesn't take 28×28 images.
pub fn read_input(text: &str, dims: Dims) -> Result<Array1<f64>, TrainerError> {
    let mut rows = persistence::parse_rows("input", text)?;

    match rows.len() {
        0 => Err(MlErr::SizeMismatch {
            what: "input features",
            got: 0,
            expected: dims.input,
        }
        .into()),
        1 => {
            let row = rows.remove(0);
            if row.len() != dims.input {
                return Err(MlErr::SizeMismatch {
                    what: "input features",
                    got: row.len(),
                    expected: dims.input,
                }
                .into());
            }
            Ok(Array1::from(row))
        }
        _ => {
            let image_size = preprocess::SIDE * preprocess::SIDE;
            if dims.input != image_size {
                return Err(MlErr::SizeMismatch {
                    what: "input features",
                    got: image_size,
                    expected: dims.input,
                }
                .into());
            }
            Ok(Canvas::from_rows(rows)?.to_features())
        }
    }
}
