use crate::error::{Error, Result};
use crate::layers::{Activation, OutputLayer};
use crate::optim::BiasUpdate;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Layer sizes of the reference network: input, two hidden layers, output.
pub const MNIST_LAYER_SIZES: [usize; 4] = [784, 16, 16, 10];

/// The two reference training programs this crate reproduces.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// ReLU hidden layers, softmax output, frozen biases, loss scaled by 2
    ReluSoftmax,
    /// Sigmoid everywhere, biases updated by the raw delta
    Sigmoid,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub layer_sizes: Vec<usize>,
    pub activation: Activation,
    pub output: OutputLayer,
    pub weight_range: (f32, f32),
    pub bias_range: (f32, f32),
    /// `None` seeds from system entropy
    pub seed: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f32,
    pub bias_update: BiasUpdate,
    /// Factor applied to `(output - target)` in the output delta
    pub loss_scale: f32,
    /// The running cost is published every `cost_window` examples
    pub cost_window: usize,
    /// ... as the accumulated squared error divided by `cost_divisor`
    pub cost_divisor: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub training: TrainingConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Config::preset(Variant::ReluSoftmax).network
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Config::preset(Variant::ReluSoftmax).training
    }
}

impl Config {
    pub fn preset(variant: Variant) -> Config {
        match variant {
            Variant::ReluSoftmax => Config {
                network: NetworkConfig {
                    layer_sizes: MNIST_LAYER_SIZES.to_vec(),
                    activation: Activation::Relu,
                    output: OutputLayer::Softmax,
                    weight_range: (-0.25, 0.25),
                    bias_range: (-0.25, 0.25),
                    seed: None,
                },
                training: TrainingConfig {
                    epochs: 1,
                    learning_rate: 0.05,
                    bias_update: BiasUpdate::Frozen,
                    loss_scale: 2.0,
                    cost_window: 10,
                    cost_divisor: 20.0,
                },
            },
            Variant::Sigmoid => Config {
                network: NetworkConfig {
                    layer_sizes: MNIST_LAYER_SIZES.to_vec(),
                    activation: Activation::Sigmoid,
                    output: OutputLayer::Sigmoid,
                    weight_range: (-1.0, 1.0),
                    bias_range: (0.0, 1.0),
                    seed: None,
                },
                training: TrainingConfig {
                    epochs: 1,
                    learning_rate: 0.05,
                    bias_update: BiasUpdate::Unscaled,
                    loss_scale: 1.0,
                    cost_window: 10,
                    cost_divisor: 10.0,
                },
            },
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let json = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&json)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.network.validate()?;
        self.training.validate()
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.layer_sizes.len() < 2 {
            return Err(Error::Configuration(format!(
                "need at least an input and an output layer, got {} layer sizes",
                self.layer_sizes.len()
            )));
        }
        if let Some(idx) = self.layer_sizes.iter().position(|&size| size == 0) {
            return Err(Error::Configuration(format!("layer {idx} has size 0")));
        }
        check_range("weight_range", self.weight_range)?;
        check_range("bias_range", self.bias_range)
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::Configuration("epochs must be positive".to_string()));
        }
        check_positive("learning_rate", self.learning_rate)?;
        check_positive("loss_scale", self.loss_scale)?;
        check_positive("cost_divisor", self.cost_divisor)?;
        if self.cost_window == 0 {
            return Err(Error::Configuration("cost_window must be positive".to_string()));
        }
        Ok(())
    }
}

fn check_positive(name: &str, value: f32) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(Error::Configuration(format!(
            "{name} must be positive and finite, got {value}"
        )));
    }
    Ok(())
}

fn check_range(name: &str, (low, high): (f32, f32)) -> Result<()> {
    if !(low.is_finite() && high.is_finite() && low < high) {
        return Err(Error::Configuration(format!(
            "{name} must satisfy low < high, got [{low}, {high}]"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        Config::preset(Variant::ReluSoftmax).validate().unwrap();
        Config::preset(Variant::Sigmoid).validate().unwrap();
    }

    #[test]
    fn rejects_zero_layer_size() {
        let mut config = Config::default();
        config.network.layer_sizes = vec![784, 0, 10];
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn rejects_single_layer() {
        let mut config = Config::default();
        config.network.layer_sizes = vec![784];
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn rejects_non_positive_training_values() {
        let mut config = Config::default();
        config.training.epochs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.training.learning_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.training.learning_rate = -0.1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.training.learning_rate = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_init_range() {
        let mut config = Config::default();
        config.network.weight_range = (0.5, 0.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{ "training": { "epochs": 3, "bias_update": "scaled" },
                        "network": { "output": "sum-normalize", "seed": 42 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.training.epochs, 3);
        assert_eq!(config.training.bias_update, BiasUpdate::Scaled);
        assert_eq!(config.training.learning_rate, 0.05);
        assert_eq!(config.network.output, OutputLayer::SumNormalize);
        assert_eq!(config.network.seed, Some(42));
        assert_eq!(config.network.layer_sizes, MNIST_LAYER_SIZES.to_vec());
    }
}
