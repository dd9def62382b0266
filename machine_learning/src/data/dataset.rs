use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{MlErr, Result};

/// An owned batch of samples, materialized from a `Dataset`.
#[derive(Debug, Clone)]
pub struct Batch {
    /// `B×D` features.
    pub x: Array2<f64>,
    /// The `B` labels.
    pub labels: Array1<usize>,
}

impl Batch {
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// An in-memory labeled dataset, one sample per row of `x`.
///
/// Shuffling only permutes the order in which batches are drawn, the samples stay in place.
#[derive(Debug, Clone)]
pub struct Dataset {
    x: Array2<f64>,
    labels: Array1<usize>,
    order: Vec<usize>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `x` - The features, one sample per row.
    /// * `labels` - The class of every sample.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` if there isn't exactly one label per row.
    pub fn new(x: Array2<f64>, labels: Array1<usize>) -> Result<Self> {
        if x.nrows() != labels.len() {
            return Err(MlErr::SizeMismatch {
                what: "labels",
                got: labels.len(),
                expected: x.nrows(),
            });
        }

        let order = (0..labels.len()).collect();
        Ok(Self { x, labels, order })
    }

    /// Creates a new `Dataset` from a flat row-major buffer of features.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` if `features` doesn't hold `x_size` values per label.
    pub fn from_vec(features: Vec<f64>, labels: Vec<usize>, x_size: usize) -> Result<Self> {
        let expected = labels.len() * x_size;
        if features.len() != expected {
            return Err(MlErr::SizeMismatch {
                what: "features",
                got: features.len(),
                expected,
            });
        }

        let x = Array2::from_shape_vec((labels.len(), x_size), features).map_err(|_| {
            MlErr::SizeMismatch {
                what: "features",
                got: expected,
                expected,
            }
        })?;

        Self::new(x, Array1::from(labels))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The length of every feature vector.
    #[inline]
    pub fn x_size(&self) -> usize {
        self.x.ncols()
    }

    #[inline]
    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    #[inline]
    pub fn labels(&self) -> ArrayView1<'_, usize> {
        self.labels.view()
    }

    /// Returns the features and label of the `idx`-th sample (panics if out of bounds).
    #[inline]
    pub fn sample(&self, idx: usize) -> (ArrayView1<'_, f64>, usize) {
        (self.x.row(idx), self.labels[idx])
    }

    /// Checks every label is one of `classes`.
    ///
    /// # Errors
    /// `MlErr::InvalidLabel` with the position of the first offending sample.
    pub fn check_labels(&self, classes: usize) -> Result<()> {
        match self.labels.iter().position(|&label| label >= classes) {
            Some(index) => Err(MlErr::InvalidLabel {
                index,
                label: self.labels[index],
                classes,
            }),
            None => Ok(()),
        }
    }

    /// Iterates over every sample as a single row batch, in storage order.
    pub fn rows(&self) -> impl Iterator<Item = (ArrayView2<'_, f64>, usize)> {
        self.x
            .axis_chunks_iter(Axis(0), 1)
            .zip(self.labels.iter().copied())
    }

    /// Permutes the order in which `batches` yields the samples, uniformly at random.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.order.shuffle(rng);
    }

    /// Partitions the dataset, in its current order, into consecutive batches of `batch_size`
    /// samples. A trailing remainder shorter than `batch_size` is skipped.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = Batch> + '_ {
        self.order.chunks_exact(batch_size.max(1)).map(|indices| Batch {
            x: self.x.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        })
    }

    /// The amount of full batches of `batch_size` samples.
    pub fn num_batches(&self, batch_size: usize) -> usize {
        self.len() / batch_size.max(1)
    }

    /// Splits the samples into a training and a holdout dataset. The holdout gets
    /// `ceil(len * holdout_fraction)` samples picked at random, the rest go to training.
    ///
    /// # Arguments
    /// * `holdout_fraction` - The portion of samples to hold out, in `[0, 1)`.
    /// * `seed` - The seed of the permutation, the same seed always yields the same split.
    ///
    /// # Errors
    /// `MlErr::InvalidHyperparameter` if the fraction is out of range.
    pub fn split(&self, holdout_fraction: f64, seed: u64) -> Result<(Dataset, Dataset)> {
        if !(0. ..1.).contains(&holdout_fraction) {
            return Err(MlErr::InvalidHyperparameter {
                name: "holdout_fraction",
                reason: format!("must be in [0, 1), got {holdout_fraction}"),
            });
        }

        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(seed));

        let holdout_len = (self.len() as f64 * holdout_fraction).ceil() as usize;
        let (holdout, train) = indices.split_at(holdout_len.min(self.len()));

        Ok((self.subset(train)?, self.subset(holdout)?))
    }

    fn subset(&self, indices: &[usize]) -> Result<Dataset> {
        Self::new(
            self.x.select(Axis(0), indices),
            self.labels.select(Axis(0), indices),
        )
    }
}
