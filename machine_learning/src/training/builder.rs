use rand::{SeedableRng, rngs::StdRng};

use super::{ModelTrainer, TrainerSpec};
use crate::{
    Result,
    arch::{Dims, ParamSet, loss::SparseCrossEntropy},
    optimization::GradientDescent,
};

/// The trainer every spec resolves to.
pub type SgdTrainer = ModelTrainer<GradientDescent, SparseCrossEntropy, StdRng>;

/// Builds `ModelTrainer`s given a specification.
#[derive(Default)]
pub struct TrainerBuilder;

impl TrainerBuilder {
    /// Creates a new `TrainerBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new trainer following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification for the trainer.
    ///
    /// # Errors
    /// If the learning rate is not a positive number.
    pub fn build(&self, spec: &TrainerSpec) -> Result<SgdTrainer> {
        self.build_with_rng(spec, self.generate_rng(spec.seed))
    }

    /// Builds a new trainer along with freshly initialized parameters for it. Both draw from the
    /// same generator, so a seeded spec reproduces the whole run.
    ///
    /// # Arguments
    /// * `spec` - The specification for the trainer.
    /// * `dims` - The layer sizes of the parameters.
    pub fn build_initialized(&self, spec: &TrainerSpec, dims: Dims) -> Result<(ParamSet, SgdTrainer)> {
        let mut rng = self.generate_rng(spec.seed);
        let params = ParamSet::initialize(dims, &mut rng)?;
        let trainer = self.build_with_rng(spec, rng)?;
        Ok((params, trainer))
    }

    fn build_with_rng(&self, spec: &TrainerSpec, rng: StdRng) -> Result<SgdTrainer> {
        let optimizer = GradientDescent::new(spec.learning_rate)?;

        Ok(ModelTrainer::new(
            optimizer,
            SparseCrossEntropy::new(),
            spec.epochs,
            spec.batch_size,
            rng,
        ))
    }

    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_builds_are_reproducible() {
        let spec = TrainerSpec {
            seed: Some(5),
            ..Default::default()
        };
        let dims = Dims::new(3, 4, 2).unwrap();

        let (a, _) = TrainerBuilder::new().build_initialized(&spec, dims).unwrap();
        let (b, _) = TrainerBuilder::new().build_initialized(&spec, dims).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_learning_rate_fails() {
        let spec = TrainerSpec {
            learning_rate: 0.,
            ..Default::default()
        };
        assert!(TrainerBuilder::new().build(&spec).is_err());
    }
}
