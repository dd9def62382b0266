use ndarray::{Array1, ArrayView1, Axis};

use crate::{
    MlErr, Result,
    arch::{self, ParamSet},
    data::Dataset,
};

/// The network's answer for a single sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class: usize,
    pub probabilities: Array1<f64>,
}

/// Returns the index of the largest value, the lowest index wins ties.
pub fn argmax(values: ArrayView1<f64>) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, max), (i, &v)| {
            if v > max { (i, v) } else { (best, max) }
        })
        .0
}

/// Runs the network over a single feature vector.
pub fn classify(params: &ParamSet, features: ArrayView1<f64>) -> Result<Prediction> {
    let x = features.insert_axis(Axis(0));
    let probabilities = arch::predict(params, x)?.row(0).to_owned();

    Ok(Prediction {
        class: argmax(probabilities.view()),
        probabilities,
    })
}

/// The fraction of samples whose most likely class is their label, every sample is forwarded on
/// its own.
///
/// # Errors
/// `MlErr::EmptyDataset` if there is nothing to evaluate.
pub fn accuracy(params: &ParamSet, dataset: &Dataset) -> Result<f64> {
    if dataset.is_empty() {
        return Err(MlErr::EmptyDataset);
    }
    dataset.check_labels(params.dims().output)?;

    let mut correct = 0;
    for (x, label) in dataset.rows() {
        let z = arch::predict(params, x)?;
        if argmax(z.row(0)) == label {
            correct += 1;
        }
    }

    Ok(correct as f64 / dataset.len() as f64)
}
