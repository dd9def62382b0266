pub mod activations;
pub mod loss;
mod network;
mod params;

pub use network::{Activations, backward, forward, predict};
pub use params::{Dims, Gradients, ParamSet, TENSOR_NAMES};
