use super::Optimizer;
use crate::{
    MlErr, Result,
    arch::{Gradients, ParamSet},
};

/// Gradient descent optimization algorithm.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update_params`.
    ///
    /// # Errors
    /// `MlErr::InvalidHyperparameter` if `learning_rate` is not a positive finite number.
    pub fn new(learning_rate: f64) -> Result<Self> {
        if !(learning_rate.is_finite() && learning_rate > 0.) {
            return Err(MlErr::InvalidHyperparameter {
                name: "learning_rate",
                reason: format!("must be positive and finite, got {learning_rate}"),
            });
        }

        Ok(Self { learning_rate })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

impl Optimizer for GradientDescent {
    /// Updates the parameters according to the algorithm's learning rule, that is, making a step in
    /// the opposite direction of the gradient, with a length of `learning_rate`.
    ///
    /// # Arguments
    /// * `params` - The parameters that are going to be modified.
    /// * `grad` - The gradient used for taking the step.
    fn update_params(&mut self, params: &mut ParamSet, grad: &Gradients) {
        let lr = self.learning_rate;

        for (w, g) in params.tensors_mut().into_iter().zip(grad.tensors()) {
            w.scaled_add(-lr, &g);
        }
    }
}
