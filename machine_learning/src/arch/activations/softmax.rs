use ndarray::{Array2, ArrayView2, Axis};

/// Normalizes every row of `t` into a probability distribution.
///
/// The row maximum is subtracted before exponentiating so large logits don't overflow, this
/// leaves the result unchanged up to floating point error.
pub fn softmax_rows(t: ArrayView2<f64>) -> Array2<f64> {
    let mut z = t.to_owned();

    for mut row in z.axis_iter_mut(Axis(0)) {
        let max = row.fold(f64::NEG_INFINITY, |acc, &x| acc.max(x));
        row.mapv_inplace(|x| (x - max).exp());
        let sum = row.sum();
        row /= sum;
    }

    z
}
