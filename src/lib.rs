pub mod config;
pub mod dataset;
pub mod error;
pub mod layers;
pub mod mnist_dataset;
pub mod model;
pub mod optim;
pub mod report;
pub mod run;
pub mod train;

pub use error::{Error, Result};
