use crate::error::{Error, Result};

use ndarray::prelude::*;
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
///  z = a_prev.W + b
pub struct FcLayer {
    pub weights: Array2<f32>, // (input_size, output_size)
    pub bias: Array1<f32>,    //  (output_size)
}

impl FcLayer {
    /// Fills the weights and biases with independent uniform draws.
    /// Both ranges must be non-empty (`low < high`).
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        weight_range: (f32, f32),
        bias_range: (f32, f32),
        rng: &mut R,
    ) -> FcLayer {
        FcLayer {
            weights: Array2::random_using(
                (input_size, output_size),
                Uniform::new(weight_range.0, weight_range.1),
                rng,
            ),
            bias: Array1::random_using(output_size, Uniform::new(bias_range.0, bias_range.1), rng),
        }
    }

    pub fn from_parts(weights: Array2<f32>, bias: Array1<f32>) -> Result<FcLayer> {
        if weights.ncols() != bias.len() {
            return Err(Error::ShapeMismatch {
                expected: weights.ncols(),
                actual: bias.len(),
            });
        }
        Ok(FcLayer { weights, bias })
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Pre-activation of the next layer.
    pub fn forward(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        if input.len() != self.input_size() {
            return Err(Error::ShapeMismatch {
                expected: self.input_size(),
                actual: input.len(),
            });
        }
        // (input_size) X (input_size, output_size) = (output_size)
        Ok(input.dot(&self.weights) + &self.bias)
    }

    /// Pulls `delta` (one entry per output unit) back onto the input units,
    /// i.e. `W . delta`, before the local derivative is applied.
    pub fn backward(&self, delta: &Array1<f32>) -> Array1<f32> {
        // (input_size, output_size) X (output_size) = (input_size)
        self.weights.dot(delta)
    }
}
