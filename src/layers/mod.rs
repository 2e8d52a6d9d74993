pub use crate::layers::activations::{Activation, OutputLayer};
pub use crate::layers::fc::FcLayer;

pub mod activations;
pub mod fc;
