use machine_learning::{
    Result,
    arch::{
        self, Dims, ParamSet, TENSOR_NAMES,
        loss::{LossFn, SparseCrossEntropy},
    },
};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng, rngs::StdRng};

const EPS: f64 = 1e-5;
const TOLERANCE: f64 = 1e-4;

fn batch_loss(params: &ParamSet, x: &Array2<f64>, labels: &Array1<usize>) -> Result<f64> {
    let z = arch::predict(params, x.view())?;
    SparseCrossEntropy.loss(z.view(), labels.view())
}

fn perturbed(params: &ParamSet, tensor: usize, idx: (usize, usize), delta: f64) -> ParamSet {
    let mut tensors = params.tensors().map(|t| t.to_owned());
    tensors[tensor][idx] += delta;
    let [w1, b1, w2, b2] = tensors;
    ParamSet::from_tensors(w1, b1, w2, b2).unwrap()
}

#[test]
fn analytic_gradient_matches_central_differences() -> Result<()> {
    let dims = Dims::new(5, 6, 3)?;
    let mut rng = StdRng::seed_from_u64(11);
    let params = ParamSet::initialize(dims, &mut rng)?;

    let x = Array2::from_shape_fn((4, 5), |_| rng.random::<f64>());
    let labels = Array1::from_shape_fn(4, |i| i % 3);

    let activations = arch::forward(&params, x.view())?;
    let grads = arch::backward(
        &params,
        x.view(),
        &activations,
        labels.view(),
        &SparseCrossEntropy,
    )?;

    for (k, (name, grad)) in TENSOR_NAMES.iter().zip(grads.tensors()).enumerate() {
        for (idx, &analytic) in grad.indexed_iter() {
            let plus = batch_loss(&perturbed(&params, k, idx, EPS), &x, &labels)?;
            let minus = batch_loss(&perturbed(&params, k, idx, -EPS), &x, &labels)?;
            let numeric = (plus - minus) / (2. * EPS);

            let scale = 1f64.max(analytic.abs() + numeric.abs());
            assert!(
                (analytic - numeric).abs() <= TOLERANCE * scale,
                "d{name}{idx:?}: analytic {analytic}, numeric {numeric}"
            );
        }
    }

    Ok(())
}
