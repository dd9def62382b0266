use ndarray::{Array2, ArrayView2};
use rand::Rng;

use crate::{
    MlErr, Result,
    initialization::{ParamGen, RandParamGen},
};

/// The sizes of the three layers of units of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    pub input: usize,
    pub hidden: usize,
    pub output: usize,
}

impl Dims {
    /// Creates a new `Dims`.
    ///
    /// # Errors
    /// `MlErr::InvalidHyperparameter` if any of the sizes is zero.
    pub fn new(input: usize, hidden: usize, output: usize) -> Result<Self> {
        for (name, size) in [("input_size", input), ("hidden_size", hidden), ("output_size", output)] {
            if size == 0 {
                return Err(MlErr::InvalidHyperparameter {
                    name,
                    reason: "must be greater than 0".into(),
                });
            }
        }

        Ok(Self {
            input,
            hidden,
            output,
        })
    }

    /// The shapes of `w1`, `b1`, `w2` and `b2`, in that order.
    pub fn shapes(&self) -> [(usize, usize); 4] {
        [
            (self.input, self.hidden),
            (1, self.hidden),
            (self.hidden, self.output),
            (1, self.output),
        ]
    }
}

/// The weights and biases of the two dense layers.
///
/// Biases are kept as single row matrices so they broadcast over the rows of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSet {
    pub(crate) w1: Array2<f64>,
    pub(crate) b1: Array2<f64>,
    pub(crate) w2: Array2<f64>,
    pub(crate) b2: Array2<f64>,
}

/// The tensor names, in storage order.
pub const TENSOR_NAMES: [&str; 4] = ["W1", "b1", "W2", "b2"];

impl ParamSet {
    /// Builds a parameter set from its four tensors, checking they agree on the layer sizes.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` if the shapes are not those of a `D×H`, `1×H`, `H×C`, `1×C` set.
    pub fn from_tensors(
        w1: Array2<f64>,
        b1: Array2<f64>,
        w2: Array2<f64>,
        b2: Array2<f64>,
    ) -> Result<Self> {
        let dims = Dims::new(w1.nrows(), w1.ncols(), w2.ncols())?;
        let params = Self { w1, b1, w2, b2 };
        params.check_dims(dims)?;
        Ok(params)
    }

    /// Draws every entry of layer `l` uniformly from `[-sqrt(1 / fan_in), sqrt(1 / fan_in))`,
    /// where `fan_in` is `dims.input` for the first layer and `dims.hidden` for the second one.
    pub fn initialize<R: Rng>(dims: Dims, rng: &mut R) -> Result<Self> {
        let fan_ins = [dims.input, dims.input, dims.hidden, dims.hidden];
        let mut tensors = Vec::with_capacity(4);

        for (shape, fan_in) in dims.shapes().into_iter().zip(fan_ins) {
            let size = shape.0 * shape.1;
            let mut param_gen = RandParamGen::fan_in_uniform(rng, size, fan_in)?;
            tensors.push(Self::generate(&mut param_gen, shape)?);
        }

        Self::from_vec(tensors)
    }

    /// Fills the four tensors, in storage order, with the values of a single generator.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` if the generator runs out before filling every tensor.
    pub fn generate_with<G: ParamGen>(dims: Dims, param_gen: &mut G) -> Result<Self> {
        let tensors = dims
            .shapes()
            .into_iter()
            .map(|shape| Self::generate(param_gen, shape))
            .collect::<Result<Vec<_>>>()?;

        Self::from_vec(tensors)
    }

    fn generate<G: ParamGen>(param_gen: &mut G, shape: (usize, usize)) -> Result<Array2<f64>> {
        let size = shape.0 * shape.1;
        let values = param_gen.sample(size).unwrap_or_default();

        if values.len() != size {
            return Err(MlErr::SizeMismatch {
                what: "generated parameters",
                got: values.len(),
                expected: size,
            });
        }

        Array2::from_shape_vec(shape, values).map_err(|_| MlErr::SizeMismatch {
            what: "generated parameters",
            got: size,
            expected: size,
        })
    }

    fn from_vec(tensors: Vec<Array2<f64>>) -> Result<Self> {
        let [w1, b1, w2, b2]: [Array2<f64>; 4] =
            tensors
                .try_into()
                .map_err(|v: Vec<_>| MlErr::SizeMismatch {
                    what: "tensors",
                    got: v.len(),
                    expected: 4,
                })?;

        Self::from_tensors(w1, b1, w2, b2)
    }

    /// Returns the layer sizes these parameters were built for.
    pub fn dims(&self) -> Dims {
        Dims {
            input: self.w1.nrows(),
            hidden: self.w1.ncols(),
            output: self.w2.ncols(),
        }
    }

    /// Checks every tensor against the shapes `dims` expects.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` naming the first tensor with an unexpected shape.
    pub fn check_dims(&self, dims: Dims) -> Result<()> {
        for ((name, tensor), (rows, cols)) in TENSOR_NAMES
            .into_iter()
            .zip(self.tensors())
            .zip(dims.shapes())
        {
            if tensor.nrows() != rows {
                return Err(MlErr::SizeMismatch {
                    what: name,
                    got: tensor.nrows(),
                    expected: rows,
                });
            }

            if tensor.ncols() != cols {
                return Err(MlErr::SizeMismatch {
                    what: name,
                    got: tensor.ncols(),
                    expected: cols,
                });
            }
        }

        Ok(())
    }

    /// The amount of scalars in the set.
    pub fn size(&self) -> usize {
        self.tensors().iter().map(|t| t.len()).sum()
    }

    /// Views of `w1`, `b1`, `w2` and `b2`, in that order.
    pub fn tensors(&self) -> [ArrayView2<'_, f64>; 4] {
        [self.w1.view(), self.b1.view(), self.w2.view(), self.b2.view()]
    }

    pub(crate) fn tensors_mut(&mut self) -> [&mut Array2<f64>; 4] {
        [&mut self.w1, &mut self.b1, &mut self.w2, &mut self.b2]
    }
}

/// The gradient of the loss with respect to every tensor of a `ParamSet`, summed over a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub dw1: Array2<f64>,
    pub db1: Array2<f64>,
    pub dw2: Array2<f64>,
    pub db2: Array2<f64>,
}

impl Gradients {
    /// Views of `dw1`, `db1`, `dw2` and `db2`, in the same order as `ParamSet::tensors`.
    pub fn tensors(&self) -> [ArrayView2<'_, f64>; 4] {
        [
            self.dw1.view(),
            self.db1.view(),
            self.dw2.view(),
            self.db2.view(),
        ]
    }
}
