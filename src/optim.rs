use crate::error::{Error, Result};
use crate::model::{Deltas, ForwardPass, Mlp};

use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

/// What happens to the biases on each update step.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BiasUpdate {
    /// Biases keep their initial values
    Frozen,
    /// `b -= delta`, without the learning rate
    Unscaled,
    /// `b -= learning_rate * delta`
    Scaled,
}

/// One-hot target vector: 1.0 at `label`, 0.0 elsewhere.
pub fn one_hot(label: usize, num_classes: usize) -> Result<Array1<f32>> {
    if label >= num_classes {
        return Err(Error::LabelOutOfRange {
            label,
            classes: num_classes,
        });
    }
    let mut y = Array1::zeros(num_classes);
    y[label] = 1.0;
    Ok(y)
}

/// Sum over the output units of `(output - target)^2`.
pub fn squared_error(output: &Array1<f32>, target: &Array1<f32>) -> f32 {
    output
        .iter()
        .zip(target.iter())
        .map(|(o, y)| (o - y).powi(2))
        .sum()
}

/// Plain per-example stochastic gradient descent: no momentum, no batching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f32,
    pub bias_update: BiasUpdate,
}

impl Sgd {
    pub fn new(learning_rate: f32, bias_update: BiasUpdate) -> Sgd {
        Sgd {
            learning_rate,
            bias_update,
        }
    }

    /// `W[l] -= lr * a[l] (outer) delta[l]` for every layer transition, plus
    /// the bias step selected by `bias_update`.
    ///
    /// Assumes `pass` and `deltas` come from the same example, in that order.
    pub fn step(&self, nn: &mut Mlp, pass: &ForwardPass, deltas: &Deltas) -> Result<()> {
        if deltas.layers.len() != nn.layers.len() || pass.activations.len() != nn.layers.len() + 1
        {
            return Err(Error::ShapeMismatch {
                expected: nn.layers.len(),
                actual: deltas.layers.len(),
            });
        }

        // check every layer before touching any of them
        for (l, layer) in nn.layers.iter().enumerate() {
            let (a, delta) = (&pass.activations[l], &deltas.layers[l]);
            if a.len() != layer.input_size() || delta.len() != layer.output_size() {
                return Err(Error::ShapeMismatch {
                    expected: layer.input_size() * layer.output_size(),
                    actual: a.len() * delta.len(),
                });
            }
        }

        for (l, layer) in nn.layers.iter_mut().enumerate().rev() {
            let a = &pass.activations[l];
            let delta = &deltas.layers[l];

            // (input_size, 1) X (1, output_size) = (input_size, output_size)
            let a_col = a.view().insert_axis(Axis(1));
            let delta_row = delta.view().insert_axis(Axis(0));
            layer
                .weights
                .scaled_add(-self.learning_rate, &a_col.dot(&delta_row));

            match self.bias_update {
                BiasUpdate::Frozen => (),
                BiasUpdate::Unscaled => layer.bias -= delta,
                BiasUpdate::Scaled => layer.bias.scaled_add(-self.learning_rate, delta),
            }
        }
        Ok(())
    }
}
