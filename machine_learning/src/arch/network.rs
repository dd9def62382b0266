use ndarray::{Array2, ArrayView1, ArrayView2, Axis, linalg};

use super::{
    Gradients, ParamSet,
    activations::{Relu, softmax_rows},
    loss::LossFn,
};
use crate::{MlErr, Result};

/// The intermediate tensors of a forward pass over a batch of `B` samples.
///
/// Only lives for a single forward and backward step.
#[derive(Debug, Clone)]
pub struct Activations {
    /// Hidden pre-activation, `B×H`.
    pub t1: Array2<f64>,
    /// Hidden activation, `B×H`.
    pub h1: Array2<f64>,
    /// Output logits, `B×C`.
    pub t2: Array2<f64>,
    /// Output class distribution, `B×C`.
    pub z: Array2<f64>,
}

/// Makes a forward pass through both layers.
///
/// # Arguments
/// * `params` - The network's parameters.
/// * `x` - A `B×D` batch of inputs.
///
/// # Errors
/// `MlErr::SizeMismatch` if `x` doesn't have `D` columns.
pub fn forward(params: &ParamSet, x: ArrayView2<f64>) -> Result<Activations> {
    check_input(params, x)?;
    let relu = Relu::new();

    let t1 = affine(x, &params.w1, &params.b1);
    let h1 = relu.forward(t1.view());
    let t2 = affine(h1.view(), &params.w2, &params.b2);
    let z = softmax_rows(t2.view());

    Ok(Activations { t1, h1, t2, z })
}

/// Returns the class distribution of every row of `x`.
pub fn predict(params: &ParamSet, x: ArrayView2<f64>) -> Result<Array2<f64>> {
    forward(params, x).map(|activations| activations.z)
}

/// Computes the gradient of `loss_fn` with respect to every parameter, summed over the batch.
///
/// # Arguments
/// * `params` - The parameters `activations` were computed with.
/// * `x` - The batch of inputs.
/// * `activations` - The result of `forward(params, x)`.
/// * `labels` - The expected class of every row of `x`.
/// * `loss_fn` - The loss function, its derivative must be taken with respect to the logits.
pub fn backward<L: LossFn>(
    params: &ParamSet,
    x: ArrayView2<f64>,
    activations: &Activations,
    labels: ArrayView1<usize>,
    loss_fn: &L,
) -> Result<Gradients> {
    check_input(params, x)?;
    let Activations { t1, h1, z, .. } = activations;

    let dz = loss_fn.loss_prime(z.view(), labels)?;
    let (dw2, db2) = dense_grad(h1.view(), &dz, params.w2.dim());

    let mut dt1 = Array2::zeros(h1.dim());
    linalg::general_mat_mul(1.0, &dz, &params.w2.t(), 0.0, &mut dt1);
    Relu::new().backward(&mut dt1, t1.view());

    let (dw1, db1) = dense_grad(x, &dt1, params.w1.dim());

    Ok(Gradients { dw1, db1, dw2, db2 })
}

fn check_input(params: &ParamSet, x: ArrayView2<f64>) -> Result<()> {
    let expected = params.w1.nrows();

    if x.ncols() != expected {
        return Err(MlErr::SizeMismatch {
            what: "input features",
            got: x.ncols(),
            expected,
        });
    }

    Ok(())
}

fn affine(x: ArrayView2<f64>, w: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    let mut t = Array2::zeros((x.nrows(), w.ncols()));
    linalg::general_mat_mul(1.0, &x, w, 0.0, &mut t);
    t += b;
    t
}

fn dense_grad(
    x: ArrayView2<f64>,
    d: &Array2<f64>,
    w_dim: (usize, usize),
) -> (Array2<f64>, Array2<f64>) {
    let mut dw = Array2::zeros(w_dim);
    linalg::general_mat_mul(1.0, &x.t(), d, 0.0, &mut dw);
    let db = d.sum_axis(Axis(0)).insert_axis(Axis(0));
    (dw, db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arch::{Dims, loss::SparseCrossEntropy},
        initialization::ConstParamGen,
    };
    use ndarray::array;

    fn const_params(value: f64) -> ParamSet {
        let dims = Dims::new(2, 3, 2).unwrap();
        ParamSet::generate_with(dims, &mut ConstParamGen::new(value, usize::MAX)).unwrap()
    }

    #[test]
    fn forward_shapes() {
        let params = const_params(0.1);
        let x = array![[0.5, 0.5], [1., 0.], [0., 0.]];

        let a = forward(&params, x.view()).unwrap();
        assert_eq!(a.t1.dim(), (3, 3));
        assert_eq!(a.h1.dim(), (3, 3));
        assert_eq!(a.t2.dim(), (3, 2));
        assert_eq!(a.z.dim(), (3, 2));
    }

    #[test]
    fn forward_values() {
        let params = const_params(0.5);
        let x = array![[1., 2.]];

        let a = forward(&params, x.view()).unwrap();
        // every hidden unit: 0.5 * (1 + 2) + 0.5
        assert_eq!(a.t1, array![[2., 2., 2.]]);
        assert_eq!(a.h1, a.t1);
        assert_eq!(a.t2, array![[3.5, 3.5]]);
        assert_eq!(a.z, array![[0.5, 0.5]]);
    }

    #[test]
    fn relu_clips_negative_hidden_units() {
        let params = const_params(-1.);
        let a = forward(&params, array![[1., 1.]].view()).unwrap();

        assert!(a.t1.iter().all(|&t| t < 0.));
        assert!(a.h1.iter().all(|&h| h == 0.));
    }

    #[test]
    fn wrong_feature_count_fails() {
        let params = const_params(0.1);
        let x = array![[1., 2., 3.]];

        assert!(matches!(
            forward(&params, x.view()),
            Err(MlErr::SizeMismatch {
                got: 3,
                expected: 2,
                ..
            })
        ));
    }

    #[test]
    fn gradients_are_summed_over_the_batch() {
        let params = const_params(0.2);
        let x = array![[0.3, 0.7]];
        let labels = array![1];

        let single = {
            let a = forward(&params, x.view()).unwrap();
            backward(&params, x.view(), &a, labels.view(), &SparseCrossEntropy).unwrap()
        };

        let x2 = array![[0.3, 0.7], [0.3, 0.7]];
        let labels2 = array![1, 1];
        let a = forward(&params, x2.view()).unwrap();
        let double = backward(&params, x2.view(), &a, labels2.view(), &SparseCrossEntropy).unwrap();

        for (s, d) in single.tensors().iter().zip(double.tensors()) {
            assert_eq!(s.dim(), d.dim());
            for (a, b) in s.iter().zip(d.iter()) {
                assert!((2. * a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn gradient_shapes_match_params() {
        let params = const_params(0.2);
        let x = array![[0.3, 0.7], [0.9, 0.1]];
        let a = forward(&params, x.view()).unwrap();
        let grads = backward(&params, x.view(), &a, array![0, 1].view(), &SparseCrossEntropy).unwrap();

        for (g, p) in grads.tensors().iter().zip(params.tensors()) {
            assert_eq!(g.dim(), p.dim());
        }
    }
}
