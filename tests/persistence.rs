use mnist_mlp::config::{Config, Variant};
use mnist_mlp::model::Mlp;
use mnist_mlp::run::predict_bytes;
use ndarray::Array1;
use std::path::Path;

fn seeded(variant: Variant) -> Mlp {
    let mut config = Config::preset(variant).network;
    config.seed = Some(9);
    Mlp::new(&config).unwrap()
}

#[test]
fn save_weights_writes_one_file_per_layer() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let nn = seeded(Variant::ReluSoftmax);

    let paths = nn.save_weights(dir.path().join("weights"))?;
    assert_eq!(paths.len(), 3);
    for (idx, path) in paths.iter().enumerate() {
        assert!(path.ends_with(&format!("weights_layer{}.json", idx + 1)));
        let weights = Mlp::load_weights(Path::new(path))?;
        assert_eq!(weights, nn.layers[idx].weights);
    }
    Ok(())
}

#[test]
fn checkpoint_round_trip_keeps_predictions() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("final.json");
    let nn = seeded(Variant::Sigmoid);

    nn.to_checkpoint(&path)?;
    let loaded = Mlp::from_checkpoint(&path)?;
    assert_eq!(loaded, nn);

    let image = [200u8; 784];
    assert_eq!(predict_bytes(&loaded, &image)?, predict_bytes(&nn, &image)?);
    Ok(())
}

#[test]
fn checkpoint_with_wrong_bias_length_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("edited.json");
    seeded(Variant::ReluSoftmax).to_checkpoint(&path)?;

    // first layer has 16 units, give it 3 biases
    let mut checkpoint: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    checkpoint["layers"][0]["bias"] = serde_json::to_value(Array1::<f32>::zeros(3))?;
    std::fs::write(&path, serde_json::to_string(&checkpoint)?)?;

    let err = Mlp::from_checkpoint(&path).unwrap_err();
    assert!(matches!(
        err,
        mnist_mlp::Error::ShapeMismatch {
            expected: 16,
            actual: 3
        }
    ));
    Ok(())
}

#[test]
fn missing_checkpoint_is_an_io_error() {
    let err = Mlp::from_checkpoint("/no/such/checkpoint.json").unwrap_err();
    assert!(matches!(err, mnist_mlp::Error::Io(_)));
}
