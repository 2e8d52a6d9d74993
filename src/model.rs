use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::layers::{Activation, FcLayer, OutputLayer};
use crate::optim::one_hot;

use log::debug;
use ndarray::prelude::*;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::SeedableRng;
use serde::{Deserialize, Serialize};

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// Activations of every layer for one example, input layer first.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
    pub activations: Vec<Array1<f32>>,
}

impl ForwardPass {
    pub fn output(&self) -> &Array1<f32> {
        self.activations
            .last()
            .expect("a forward pass always holds the input layer")
    }

}

/// Error signals of every non-input layer, first hidden layer first.
#[derive(Debug, Clone, PartialEq)]
pub struct Deltas {
    pub layers: Vec<Array1<f32>>,
}

/// A fully-connected perceptron. Owns one `FcLayer` (weights + bias) per
/// layer transition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Mlp {
    pub layers: Vec<FcLayer>,
    pub activation: Activation,
    pub output: OutputLayer,
}

impl Mlp {
    /// Builds a randomly initialised network. Fails with a configuration
    /// error before allocating anything if `config` is invalid.
    pub fn new(config: &NetworkConfig) -> Result<Mlp> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let layers = config
            .layer_sizes
            .windows(2)
            .map(|pair| {
                FcLayer::new(
                    pair[0],
                    pair[1],
                    config.weight_range,
                    config.bias_range,
                    &mut rng,
                )
            })
            .collect();
        debug!("initialised network with layer sizes {:?}", config.layer_sizes);

        Ok(Mlp {
            layers,
            activation: config.activation,
            output: config.output,
        })
    }

    /// Builds a network from explicit layers; each layer's bias must match its
    /// weight columns and its input size the previous layer's output size.
    pub fn from_layers(
        layers: Vec<FcLayer>,
        activation: Activation,
        output: OutputLayer,
    ) -> Result<Mlp> {
        if layers.is_empty() {
            return Err(Error::Configuration(
                "a network needs at least one layer".to_string(),
            ));
        }
        for layer in &layers {
            if layer.bias.len() != layer.output_size() {
                return Err(Error::ShapeMismatch {
                    expected: layer.output_size(),
                    actual: layer.bias.len(),
                });
            }
        }
        for pair in layers.windows(2) {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(Error::ShapeMismatch {
                    expected: pair[0].output_size(),
                    actual: pair[1].input_size(),
                });
            }
        }
        Ok(Mlp {
            layers,
            activation,
            output,
        })
    }

    /// 0 for a network without layers
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, FcLayer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, FcLayer::output_size)
    }

    fn check_not_empty(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(Error::Configuration(
                "a network needs at least one layer".to_string(),
            ));
        }
        Ok(())
    }

    pub fn layer_sizes(&self) -> Vec<usize> {
        std::iter::once(self.input_size())
            .chain(self.layers.iter().map(FcLayer::output_size))
            .collect()
    }

    /// Runs the input through every layer and keeps each layer's activation.
    pub fn forward(&self, input: ArrayView1<f32>) -> Result<ForwardPass> {
        let (mut activations, z) = self.hidden_pass(input)?;
        activations.push(self.output.apply(z, self.activation)?);
        Ok(ForwardPass { activations })
    }

    /// Predicted label for one input: the arg-max of the output layer before
    /// any normalization. Every output kind is monotonic, so the arg-max is the
    /// same as on `forward`'s output, but a dead sum-normalized output cannot
    /// fail here.
    pub fn predict(&self, input: ArrayView1<f32>) -> Result<usize> {
        let (_, mut z) = self.hidden_pass(input)?;
        if self.output == OutputLayer::SumNormalize {
            self.activation.apply(&mut z);
        }
        Ok(argmax(z.view()))
    }

    /// Activations of the input and hidden layers, plus the output layer's
    /// pre-activation.
    fn hidden_pass(&self, input: ArrayView1<f32>) -> Result<(Vec<Array1<f32>>, Array1<f32>)> {
        self.check_not_empty()?;
        if input.len() != self.input_size() {
            return Err(Error::ShapeMismatch {
                expected: self.input_size(),
                actual: input.len(),
            });
        }

        let last = self.layers.len() - 1;
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(input.to_owned());

        for (l, layer) in self.layers[..last].iter().enumerate() {
            let mut z = layer.forward(activations[l].view())?;
            self.activation.apply(&mut z);
            activations.push(z);
        }
        let z = self.layers[last].forward(activations[last].view())?;
        Ok((activations, z))
    }

    /// Computes the error signal of every non-input layer for the example that
    /// produced `pass`.
    ///
    /// Output layer: `loss_scale * (o - y)`, times `o * (1 - o)` when the output
    /// is a sigmoid. Hidden layers: `W[l+1] . delta[l+1]` times the activation
    /// derivative, from the output back to the first hidden layer.
    pub fn backward(&self, pass: &ForwardPass, label: usize, loss_scale: f32) -> Result<Deltas> {
        self.check_not_empty()?;
        let sizes = self.layer_sizes();
        if pass.activations.len() != sizes.len() {
            return Err(Error::ShapeMismatch {
                expected: sizes.len(),
                actual: pass.activations.len(),
            });
        }
        for (a, &size) in pass.activations.iter().zip(&sizes) {
            if a.len() != size {
                return Err(Error::ShapeMismatch {
                    expected: size,
                    actual: a.len(),
                });
            }
        }

        let output = pass.output();
        let target = one_hot(label, output.len())?;

        let mut delta = (output - &target) * loss_scale;
        if self.output == OutputLayer::Sigmoid {
            delta *= &Activation::Sigmoid.derivative_vec(output);
        }

        let mut layers = vec![delta];
        for l in (0..self.layers.len() - 1).rev() {
            let next = &layers[0];
            let derivative = self.activation.derivative_vec(&pass.activations[l + 1]);
            let delta = self.layers[l + 1].backward(next) * derivative;
            layers.insert(0, delta);
        }

        Ok(Deltas { layers })
    }

    /// Save the whole network (parameters and activation kinds) as JSON
    pub fn to_checkpoint<P: AsRef<Path>>(&self, filepath: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(filepath)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Load a network written by `to_checkpoint`
    pub fn from_checkpoint<P: AsRef<Path>>(filepath: P) -> Result<Mlp> {
        let mut file = File::open(filepath)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let nn: Mlp = serde_json::from_str(&contents)?;
        // re-check every shape, the file may have been edited by hand
        Mlp::from_layers(nn.layers, nn.activation, nn.output)
    }

    /// Writes one `weights_layer{n}.json` file per layer transition, each a
    /// dense matrix together with its shape. Returns the written paths.
    pub fn save_weights<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<String>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?; // in case the folder does not exist

        let mut paths = Vec::with_capacity(self.layers.len());
        for (idx, layer) in self.layers.iter().enumerate() {
            let path = dir.join(format!("weights_layer{}.json", idx + 1));
            let json = serde_json::to_string(&layer.weights)?;
            fs::write(&path, json)?;
            paths.push(path.display().to_string());
        }
        Ok(paths)
    }

    /// Reads a matrix written by `save_weights`.
    pub fn load_weights<P: AsRef<Path>>(path: P) -> Result<Array2<f32>> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Index of the first maximum.
pub fn argmax(values: ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (idx, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = idx;
        }
    }
    best
}
