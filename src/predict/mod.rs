//! Prediction and inference
//!
//! Load trained artifacts and generate predictions.

pub mod inference;

pub use inference::{format_prediction, Artifacts, Predictor};
