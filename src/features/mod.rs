//! Feature extraction and encoding
//!
//! Converts a match context into model-ready features.

pub mod encoding;
pub mod match_repr;
pub mod scaler;

pub use encoding::{CategoricalEncoders, LabelEncoder};
pub use match_repr::{FeatureVector, ScaledFeatureVector};
pub use scaler::StandardScaler;
