use crate::dataset::Dataset;
use crate::error::{Error, Result};

use log::info;
use mnist::MnistBuilder;
use std::path::Path;

pub const IMAGE_PIXELS: usize = 28 * 28;
pub const TRAIN_LEN: usize = 60_000;
pub const TEST_LEN: usize = 10_000;

const IDX_FILES: [&str; 4] = [
    "train-images-idx3-ubyte",
    "train-labels-idx1-ubyte",
    "t10k-images-idx3-ubyte",
    "t10k-labels-idx1-ubyte",
];

/// Loads the MNIST train (60,000) and test (10,000) splits from the IDX
/// files in `data_dir`, with pixels scaled to [0, 1].
pub fn load_mnist(data_dir: &str) -> Result<(Dataset, Dataset)> {
    // the mnist crate panics on missing files, so look first
    for name in IDX_FILES {
        if !Path::new(data_dir).join(name).is_file() {
            return Err(Error::Dataset(format!(
                "missing {name} in {data_dir}, download the MNIST IDX files there first"
            )));
        }
    }

    let base_path = if data_dir.ends_with('/') {
        data_dir.to_string()
    } else {
        format!("{data_dir}/")
    };
    let mnist = MnistBuilder::new()
        .base_path(&base_path)
        .training_set_length(TRAIN_LEN as u32)
        .test_set_length(TEST_LEN as u32)
        .finalize();

    let train = Dataset::from_bytes(&mnist.trn_img, mnist.trn_lbl, IMAGE_PIXELS)?;
    let test = Dataset::from_bytes(&mnist.tst_img, mnist.tst_lbl, IMAGE_PIXELS)?;
    info!("[TRAIN] len: {}", train.len());
    info!("[TEST] len: {}", test.len());
    Ok((train, test))
}
