use crate::error::{Error, Result};

use ndarray::prelude::*;

/// One split of labelled examples, kept in memory in its original order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub images: Array2<f32>, // (nb_examples, nb_features)
    pub labels: Vec<u8>,
}

impl Dataset {
    pub fn new(images: Array2<f32>, labels: Vec<u8>) -> Result<Dataset> {
        if images.nrows() != labels.len() {
            return Err(Error::ShapeMismatch {
                expected: images.nrows(),
                actual: labels.len(),
            });
        }
        Ok(Dataset { images, labels })
    }

    /// Builds a split from raw 0-255 pixels, scaling them to [0, 1].
    pub fn from_bytes(pixels: &[u8], labels: Vec<u8>, nb_features: usize) -> Result<Dataset> {
        let expected = labels.len() * nb_features;
        if pixels.len() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        let img_f32: Vec<f32> = pixels.iter().map(|&x| x as f32 / 255.0).collect();
        let images = Array2::from_shape_vec((labels.len(), nb_features), img_f32)
            .map_err(|e| Error::Dataset(format!("failed to create image array: {e}")))?;
        Dataset::new(images, labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, idx: usize) -> (ArrayView1<'_, f32>, u8) {
        (self.images.row(idx), self.labels[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArrayView1<'_, f32>, u8)> + '_ {
        self.images
            .outer_iter()
            .zip(self.labels.iter().copied())
    }
}
