use crate::error::{Error, Result};

use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use std::f32;

/// Value returned by the sigmoid when `e^-x` overflows.
pub const SIGMOID_OVERFLOW_FALLBACK: f32 = 1.0;

/// Elementwise non-linearity used on the hidden layers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Activation {
    Relu,
    Sigmoid,
}

impl Activation {
    pub fn activate(self, x: f32) -> f32 {
        match self {
            Activation::Relu => relu(x),
            Activation::Sigmoid => sigmoid(x),
        }
    }

    /// Derivative evaluated on the post-activation value.
    ///
    /// For ReLU the sign of the output matches the sign of the pre-activation,
    /// and the sigmoid derivative only depends on its output `o`: `o * (1 - o)`.
    pub fn derivative(self, output: f32) -> f32 {
        match self {
            Activation::Relu => {
                if output > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Sigmoid => output * (1.0 - output),
        }
    }

    pub fn apply(self, z: &mut Array1<f32>) {
        z.mapv_inplace(|x| self.activate(x));
    }

    pub fn derivative_vec(self, outputs: &Array1<f32>) -> Array1<f32> {
        outputs.mapv(|o| self.derivative(o))
    }
}

/// How the last layer turns its pre-activations into outputs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputLayer {
    /// exp(x - max) / sum, applied directly to the pre-activations
    Softmax,
    /// Hidden activation first, then divide every entry by the sum
    SumNormalize,
    /// Elementwise logistic sigmoid
    Sigmoid,
}

impl OutputLayer {
    pub fn apply(self, z: Array1<f32>, hidden: Activation) -> Result<Array1<f32>> {
        match self {
            OutputLayer::Softmax => Ok(softmax(&z)),
            OutputLayer::SumNormalize => {
                let mut out = z;
                hidden.apply(&mut out);
                sum_normalize(out)
            }
            OutputLayer::Sigmoid => {
                let mut out = z;
                Activation::Sigmoid.apply(&mut out);
                Ok(out)
            }
        }
    }
}

pub fn relu(x: f32) -> f32 {
    x.max(0.0)
}

pub fn sigmoid(x: f32) -> f32 {
    let e = (-x).exp();
    if e.is_infinite() {
        return SIGMOID_OVERFLOW_FALLBACK;
    }
    1.0 / (1.0 + e)
}

pub fn softmax(v: &Array1<f32>) -> Array1<f32> {
    let max = v.fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    // exp(x - max)
    let out = v.mapv(|x| (x - max).exp());
    let sum = out.sum();
    out / sum
}

/// Divides every entry by the sum of all entries, without exponentiation.
pub fn sum_normalize(v: Array1<f32>) -> Result<Array1<f32>> {
    let total = v.sum();
    if total == 0.0 || !total.is_finite() {
        return Err(Error::DegenerateNormalization);
    }
    Ok(v / total)
}
