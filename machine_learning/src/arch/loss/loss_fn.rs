use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::Result;

/// A loss over a batch of predicted class distributions and their integer labels.
pub trait LossFn {
    /// Returns the loss of the whole batch.
    fn loss(&self, y_pred: ArrayView2<f64>, labels: ArrayView1<usize>) -> Result<f64>;

    /// Returns the derivative of the loss with respect to the logits that produced `y_pred`.
    fn loss_prime(&self, y_pred: ArrayView2<f64>, labels: ArrayView1<usize>)
    -> Result<Array2<f64>>;
}
