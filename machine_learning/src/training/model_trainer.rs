use std::num::NonZeroUsize;

use log::{debug, info, warn};
use rand::Rng;

use super::LossTrace;
use crate::{
    MlErr, Result,
    arch::{self, ParamSet, loss::LossFn},
    data::{Batch, Dataset},
    optimization::Optimizer,
};

/// A model `Trainer`. Contains the relevant components needed for training the network's
/// parameters with mini-batch gradient descent.
pub struct ModelTrainer<O, L, R>
where
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    optimizer: O,
    loss_fn: L,

    epochs: NonZeroUsize,
    batch_size: NonZeroUsize,
    rng: R,
}

impl<O, L, R> ModelTrainer<O, L, R>
where
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    /// Returns a new `ModelTrainer`.
    ///
    /// # Arguments
    /// * `optimizer` - Dictates how to update the parameters on each gradient calculation.
    /// * `loss_fn` - Measures the difference between the network's output and the expected one.
    /// * `epochs` - The amount of passes over the dataset.
    /// * `batch_size` - The amount of samples per parameter update.
    /// * `rng` - A random number generator, used for shuffling.
    pub fn new(
        optimizer: O,
        loss_fn: L,
        epochs: NonZeroUsize,
        batch_size: NonZeroUsize,
        rng: R,
    ) -> Self {
        Self {
            optimizer,
            loss_fn,
            epochs,
            batch_size,
            rng,
        }
    }

    /// Performs `epochs` epochs of training. Each epoch shuffles the whole dataset and updates
    /// `params` once per full batch, a trailing partial batch is skipped.
    ///
    /// # Arguments
    /// * `params` - The parameters to train, updated in place.
    /// * `dataset` - The training samples.
    ///
    /// # Returns
    /// The loss of every processed batch.
    ///
    /// # Errors
    /// If the dataset is empty, smaller than a batch or its samples don't fit `params`.
    pub fn train(&mut self, params: &mut ParamSet, dataset: &mut Dataset) -> Result<LossTrace> {
        let batch_size = self.batch_size.get();
        self.check_dataset(params, dataset)?;

        let epochs = self.epochs.get();
        let mut trace = LossTrace::new(dataset.num_batches(batch_size));
        let mut warned = false;

        for epoch in 1..=epochs {
            dataset.shuffle(&mut self.rng);
            let mut epoch_loss = 0.;
            let mut nbatches = 0;

            for batch in dataset.batches(batch_size) {
                let loss = self.step(params, &batch)?;

                if !loss.is_finite() && !warned {
                    warn!(epoch = epoch, batch = nbatches; "non finite batch loss: {loss}");
                    warned = true;
                }

                debug!(epoch = epoch, batch = nbatches, loss = loss; "batch processed");
                trace.push(loss);
                epoch_loss += loss;
                nbatches += 1;
            }

            let loss = epoch_loss / nbatches as f64;
            info!(epoch = epoch, epochs = epochs, loss = loss; "epoch {epoch}/{epochs} finished");
        }

        Ok(trace)
    }

    /// Runs a single forward, backward and update cycle over `batch`.
    ///
    /// # Returns
    /// The batch loss, computed before the update.
    pub fn step(&mut self, params: &mut ParamSet, batch: &Batch) -> Result<f64> {
        let activations = arch::forward(params, batch.x.view())?;
        let loss = self
            .loss_fn
            .loss(activations.z.view(), batch.labels.view())?;

        let grad = arch::backward(
            params,
            batch.x.view(),
            &activations,
            batch.labels.view(),
            &self.loss_fn,
        )?;

        self.optimizer.update_params(params, &grad);
        Ok(loss)
    }

    fn check_dataset(&self, params: &ParamSet, dataset: &Dataset) -> Result<()> {
        if dataset.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        let batch_size = self.batch_size.get();
        if batch_size > dataset.len() {
            return Err(MlErr::BatchTooLarge {
                batch_size,
                len: dataset.len(),
            });
        }

        let expected = params.dims().input;
        if dataset.x_size() != expected {
            return Err(MlErr::SizeMismatch {
                what: "input features",
                got: dataset.x_size(),
                expected,
            });
        }

        dataset.check_labels(params.dims().output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arch::{Dims, loss::SparseCrossEntropy},
        initialization::ConstParamGen,
        optimization::GradientDescent,
    };
    use ndarray::{Array2, array};
    use rand::{SeedableRng, rngs::StdRng};

    type Trainer = ModelTrainer<GradientDescent, SparseCrossEntropy, StdRng>;

    fn trainer(epochs: usize, batch_size: usize) -> Trainer {
        ModelTrainer::new(
            GradientDescent::new(0.1).unwrap(),
            SparseCrossEntropy,
            NonZeroUsize::new(epochs).unwrap(),
            NonZeroUsize::new(batch_size).unwrap(),
            StdRng::seed_from_u64(0),
        )
    }

    fn params() -> ParamSet {
        let dims = Dims::new(2, 3, 2).unwrap();
        ParamSet::generate_with(dims, &mut ConstParamGen::new(0.1, usize::MAX)).unwrap()
    }

    fn dataset(len: usize) -> Dataset {
        let features = (0..len).flat_map(|i| [(i % 2) as f64, 0.]).collect();
        let labels = (0..len).map(|i| i % 2).collect();
        Dataset::from_vec(features, labels, 2).unwrap()
    }

    #[test]
    fn one_loss_per_full_batch() {
        let mut ds = dataset(7);
        let trace = trainer(3, 3).train(&mut params(), &mut ds).unwrap();

        assert_eq!(trace.len(), 3 * 2);
        assert_eq!(trace.epoch_means().len(), 3);
    }

    #[test]
    fn params_change_after_training() {
        let mut p = params();
        let before = p.clone();
        trainer(1, 2).train(&mut p, &mut dataset(4)).unwrap();

        assert_ne!(p, before);
        assert_eq!(p.dims(), before.dims());
    }

    #[test]
    fn step_applies_summed_gradient() {
        let batch = Batch {
            x: array![[1., 0.], [1., 0.]],
            labels: array![0, 0],
        };

        let mut p = params();
        let loss = trainer(1, 2).step(&mut p, &batch).unwrap();

        // both logits are equal with constant parameters
        assert!((loss - 2. * 2f64.ln()).abs() < 1e-12);
        // db2 = sum(z - y) = [2 * (0.5 - 1), 2 * 0.5]
        let [.., b2] = p.tensors();
        assert!((b2[[0, 0]] - (0.1 + 0.1)).abs() < 1e-12);
        assert!((b2[[0, 1]] - (0.1 - 0.1)).abs() < 1e-12);
    }

    #[test]
    fn empty_dataset_fails() {
        let mut ds = Dataset::from_vec(vec![], vec![], 2).unwrap();
        assert!(matches!(
            trainer(1, 1).train(&mut params(), &mut ds),
            Err(MlErr::EmptyDataset)
        ));
    }

    #[test]
    fn batch_larger_than_dataset_fails() {
        assert!(matches!(
            trainer(1, 5).train(&mut params(), &mut dataset(4)),
            Err(MlErr::BatchTooLarge {
                batch_size: 5,
                len: 4
            })
        ));
    }

    #[test]
    fn out_of_range_label_fails_before_any_update() {
        let mut ds = Dataset::from_vec(vec![1.; 8], vec![0, 1, 0, 7], 2).unwrap();
        let mut p = params();
        let before = p.clone();

        assert!(matches!(
            trainer(1, 1).train(&mut p, &mut ds),
            Err(MlErr::InvalidLabel {
                index: 3,
                label: 7,
                classes: 2
            })
        ));
        assert_eq!(p, before);
    }

    #[test]
    fn non_finite_loss_does_not_stop_training() {
        // the second logit is so low its probability underflows to zero
        let mut p = ParamSet::from_tensors(
            Array2::ones((2, 3)),
            Array2::zeros((1, 3)),
            array![[1000., -1000.], [1000., -1000.], [1000., -1000.]],
            Array2::zeros((1, 2)),
        )
        .unwrap();
        let mut ds = Dataset::from_vec(vec![1., 0., 1., 0., 1., 0., 1., 0.], vec![1; 4], 2).unwrap();

        let trace = trainer(3, 2).train(&mut p, &mut ds).unwrap();

        assert_eq!(trace.len(), 3 * 2);
        assert_eq!(trace.epoch_means().len(), 3);
        assert!(trace.losses()[0].is_infinite());
        assert!(p.tensors().iter().all(|t| t.iter().all(|x| x.is_finite())));
    }

    #[test]
    fn mismatched_features_fail() {
        let mut ds = Dataset::from_vec(vec![0.; 6], vec![0, 1], 3).unwrap();
        assert!(matches!(
            trainer(1, 1).train(&mut params(), &mut ds),
            Err(MlErr::SizeMismatch { .. })
        ));
    }
}
