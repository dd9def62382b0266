use ndarray::{Array1, Array2};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

use super::{Dataset, DatasetProvider};
use crate::{MlErr, Result};

const HIGH: f64 = 0.85;
const LOW: f64 = 0.15;

/// Gaussian blobs, one per class, with features clamped into `[0, 1]`.
///
/// The center of class `k` sits at `0.85` on every feature `j` with `j % classes == k` and at
/// `0.15` on the rest, so `x_size` must be at least `classes` for the blobs to be apart.
#[derive(Debug, Clone, Copy)]
pub struct Clusters {
    pub classes: usize,
    pub x_size: usize,
    pub samples: usize,
    pub spread: f64,
    pub seed: u64,
}

impl Clusters {
    /// Generates the dataset, samples are assigned to classes in turns.
    ///
    /// # Errors
    /// `MlErr::InvalidHyperparameter` if there are fewer features than classes or the spread is
    /// not a finite non negative number.
    pub fn generate(&self) -> Result<Dataset> {
        let &Self {
            classes,
            x_size,
            samples,
            spread,
            seed,
        } = self;

        if classes == 0 || x_size < classes {
            return Err(MlErr::InvalidHyperparameter {
                name: "x_size",
                reason: format!("{x_size} features can't hold {classes} separate clusters"),
            });
        }

        let noise = Normal::new(0., spread).map_err(|e| MlErr::InvalidHyperparameter {
            name: "spread",
            reason: e.to_string(),
        })?;

        let mut rng = StdRng::seed_from_u64(seed);
        let labels = Array1::from_shape_fn(samples, |i| i % classes);
        let x = Array2::from_shape_fn((samples, x_size), |(i, j)| {
            let center = if j % classes == labels[i] { HIGH } else { LOW };
            (center + noise.sample(&mut rng)).clamp(0., 1.)
        });

        Dataset::new(x, labels)
    }
}

impl DatasetProvider for Clusters {
    type Error = MlErr;

    fn load(&self, _id: &str) -> Result<Dataset> {
        self.generate()
    }
}
