use crate::error::{Error, Result};
use crate::model::Mlp;

use log::info;
use ndarray::Array1;
use std::fs;

/// Run inference on a raw 28x28 greyscale image (784 bytes) with a network
/// loaded from a checkpoint. Returns the predicted digit.
pub fn run(checkpoint_path: &str, example_path: &str) -> Result<usize> {
    let nn = Mlp::from_checkpoint(checkpoint_path)?;
    info!("Loaded checkpoint from: {}", checkpoint_path);

    let image_bytes = fs::read(example_path)?;
    predict_bytes(&nn, &image_bytes)
}

/// One byte per input unit of `nn`, scaled to [0, 1].
pub fn predict_bytes(nn: &Mlp, image_bytes: &[u8]) -> Result<usize> {
    if image_bytes.len() != nn.input_size() {
        return Err(Error::ShapeMismatch {
            expected: nn.input_size(),
            actual: image_bytes.len(),
        });
    }

    let input: Array1<f32> = image_bytes.iter().map(|&x| x as f32 / 255.0).collect();
    let predicted_label = nn.predict(input.view())?;

    info!("Prediction: {}", predicted_label);
    Ok(predicted_label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn rejects_wrong_image_size() {
        let mut config = Config::default().network;
        config.seed = Some(0);
        let nn = Mlp::new(&config).unwrap();
        assert!(matches!(
            predict_bytes(&nn, &[0u8; 100]),
            Err(Error::ShapeMismatch {
                expected: 784,
                actual: 100
            })
        ));
        assert!(predict_bytes(&nn, &[128u8; 784]).unwrap() < 10);
    }

    #[test]
    fn image_size_follows_the_network_input() {
        let mut config = Config::default().network;
        config.layer_sizes = vec![4, 3, 2];
        config.seed = Some(0);
        let nn = Mlp::new(&config).unwrap();
        assert!(predict_bytes(&nn, &[10, 20, 30, 40]).unwrap() < 2);
        assert!(matches!(
            predict_bytes(&nn, &[0u8; 784]),
            Err(Error::ShapeMismatch {
                expected: 4,
                actual: 784
            })
        ));
    }
}
