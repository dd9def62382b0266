use rand::Rng;
use rand_distr::{Distribution, Uniform};

use super::ParamGen;
use crate::{MlErr, Result};

/// A parameter generator that follows a certain probabilistic distribution.
pub struct RandParamGen<'r, R: Rng, D: Distribution<f64>> {
    rng: &'r mut R,
    distribution: D,
    remaining: usize,
}

impl<'r, R: Rng, D: Distribution<f64>> RandParamGen<'r, R, D> {
    /// Creates a new `RandParamGen` parameter generator.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `distribution` - The distribution to sample the random numbers from.
    /// * `limit` - The maximum amount of numbers to generate.
    pub fn new(rng: &'r mut R, distribution: D, limit: usize) -> Self {
        Self {
            rng,
            distribution,
            remaining: limit,
        }
    }
}

impl<'r, R: Rng> RandParamGen<'r, R, Uniform<f64>> {
    /// Creates a new `RandParamGen` with a uniform distribution over `[low, high)`.
    ///
    /// # Errors
    /// `MlErr::InvalidHyperparameter` if the range is empty or not finite.
    pub fn uniform(rng: &'r mut R, limit: usize, low: f64, high: f64) -> Result<Self> {
        let distribution =
            Uniform::new(low, high).map_err(|e| MlErr::InvalidHyperparameter {
                name: "initialization range",
                reason: e.to_string(),
            })?;

        Ok(Self::new(rng, distribution, limit))
    }

    /// Creates a new `RandParamGen` whose samples are `(u - 0.5) * 2 * sqrt(1 / fan_in)` for a
    /// standard uniform `u`, that is, uniform over `[-sqrt(1 / fan_in), sqrt(1 / fan_in))`.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `limit` - The maximum amount of numbers to generate.
    /// * `fan_in` - The number of input units feeding the layer.
    ///
    /// # Errors
    /// `MlErr::InvalidHyperparameter` if `fan_in` is zero.
    pub fn fan_in_uniform(rng: &'r mut R, limit: usize, fan_in: usize) -> Result<Self> {
        if fan_in == 0 {
            return Err(MlErr::InvalidHyperparameter {
                name: "fan_in",
                reason: "must be greater than 0".into(),
            });
        }

        let range = (1. / fan_in as f64).sqrt();
        Self::uniform(rng, limit, -range, range)
    }
}

impl<R: Rng, D: Distribution<f64>> ParamGen for RandParamGen<'_, R, D> {
    fn sample(&mut self, mut n: usize) -> Option<Vec<f64>> {
        if self.remaining == 0 {
            return None;
        }

        n = n.min(self.remaining);
        self.remaining -= n;

        let Self {
            rng, distribution, ..
        } = self;

        let sample = (0..n).map(|_| distribution.sample(&mut **rng)).collect();

        Some(sample)
    }
}
