use crate::arch::{Gradients, ParamSet};

pub trait Optimizer {
    fn update_params(&mut self, params: &mut ParamSet, grad: &Gradients);
}
