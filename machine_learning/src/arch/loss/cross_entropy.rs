use ndarray::{Array2, ArrayView1, ArrayView2};

use super::LossFn;
use crate::{MlErr, Result};

/// Sparse categorical cross entropy, summed over the batch.
///
/// Meant to be placed after a softmax: `loss_prime` returns the combined derivative of both,
/// `z - one_hot(labels)`, with respect to the softmax input.
#[derive(Debug, Default, Clone, Copy)]
pub struct SparseCrossEntropy;

impl SparseCrossEntropy {
    /// Returns a new `SparseCrossEntropy`.
    pub fn new() -> Self {
        Self
    }

    /// Expands `labels` into a `(labels.len(), classes)` one-hot matrix.
    ///
    /// # Errors
    /// `MlErr::InvalidLabel` if any label is not lower than `classes`.
    pub fn one_hot(labels: ArrayView1<usize>, classes: usize) -> Result<Array2<f64>> {
        let mut y = Array2::zeros((labels.len(), classes));

        for (i, &label) in labels.iter().enumerate() {
            check_label(i, label, classes)?;
            y[[i, label]] = 1.;
        }

        Ok(y)
    }
}

fn check_label(index: usize, label: usize, classes: usize) -> Result<()> {
    if label >= classes {
        return Err(MlErr::InvalidLabel {
            index,
            label,
            classes,
        });
    }

    Ok(())
}

fn check_rows(y_pred: ArrayView2<f64>, labels: ArrayView1<usize>) -> Result<()> {
    if y_pred.nrows() != labels.len() {
        return Err(MlErr::SizeMismatch {
            what: "labels",
            got: labels.len(),
            expected: y_pred.nrows(),
        });
    }

    Ok(())
}

impl LossFn for SparseCrossEntropy {
    // A probability that underflowed to zero yields an infinite loss, it is left as is.
    fn loss(&self, y_pred: ArrayView2<f64>, labels: ArrayView1<usize>) -> Result<f64> {
        check_rows(y_pred, labels)?;
        let classes = y_pred.ncols();

        labels
            .iter()
            .enumerate()
            .try_fold(0., |acc, (i, &label)| {
                check_label(i, label, classes)?;
                Ok(acc - y_pred[[i, label]].ln())
            })
    }

    fn loss_prime(
        &self,
        y_pred: ArrayView2<f64>,
        labels: ArrayView1<usize>,
    ) -> Result<Array2<f64>> {
        check_rows(y_pred, labels)?;
        let y = Self::one_hot(labels, y_pred.ncols())?;
        Ok(&y_pred - &y)
    }
}
