//! Prediction model
//!
//! - MLP: burn feed-forward regressor loaded from a trained record
//! - ScoreRegressor: the seam the predictor calls through

pub mod mlp;
pub mod regressor;

pub use mlp::{ScoreModel, ScoreModelConfig};
pub use regressor::{BurnRegressor, ScoreRegressor};
