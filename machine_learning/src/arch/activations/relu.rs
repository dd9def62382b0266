use ndarray::{Array2, ArrayView2};

/// Rectified linear unit, `max(z, 0)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Relu;

impl Relu {
    pub fn new() -> Self {
        Self
    }

    pub fn f(&self, z: f64) -> f64 {
        z.max(0.)
    }

    /// Subgradient of `f`, taking the unit as active at `z == 0`.
    pub fn df(&self, z: f64) -> f64 {
        if z >= 0. { 1. } else { 0. }
    }

    /// Applies `f` elementwise.
    pub fn forward(&self, z: ArrayView2<f64>) -> Array2<f64> {
        z.mapv(|z| self.f(z))
    }

    /// Multiplies the incoming delta by `df(z)` in place.
    ///
    /// # Arguments
    /// * `d` - The delta coming from the next layer.
    /// * `z` - The pre-activation values this unit was fed with.
    pub fn backward(&self, d: &mut Array2<f64>, z: ArrayView2<f64>) {
        d.zip_mut_with(&z, |d, &z| *d *= self.df(z));
    }
}
