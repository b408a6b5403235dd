//! Score regression MLP
//!
//! Architecture: Input(5) → Hidden(128) → ReLU
//!                        → Hidden(64)  → ReLU
//!                        → score_head(1)

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::record::{FullPrecisionSettings, Recorder};
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::features::FeatureVector;
use crate::{IplError, ModelConfig};

/// Configuration for the score model
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreModelConfig {
    /// Input dimension (scaled categorical codes)
    pub input_dim: usize,
    /// Hidden layer dimensions, in order
    pub hidden_dims: Vec<usize>,
}

impl Default for ScoreModelConfig {
    fn default() -> Self {
        ScoreModelConfig {
            input_dim: FeatureVector::DIM,
            hidden_dims: vec![128, 64],
        }
    }
}

impl ScoreModelConfig {
    pub fn from_model_config(config: &ModelConfig) -> Self {
        ScoreModelConfig {
            input_dim: FeatureVector::DIM,
            hidden_dims: config.hidden_dims.clone(),
        }
    }
}

/// A single hidden layer block: Linear → ReLU
#[derive(Module, Debug)]
pub struct HiddenBlock<B: Backend> {
    linear: Linear<B>,
}

impl<B: Backend> HiddenBlock<B> {
    pub fn new(device: &B::Device, in_dim: usize, out_dim: usize) -> Self {
        HiddenBlock {
            linear: LinearConfig::new(in_dim, out_dim).init(device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        relu(self.linear.forward(x))
    }
}

/// Feed-forward regressor from scaled features to a final score
#[derive(Module, Debug)]
pub struct ScoreModel<B: Backend> {
    hidden: Vec<HiddenBlock<B>>,
    score_head: Linear<B>,
}

impl<B: Backend> ScoreModel<B> {
    /// Create a new model with freshly initialized weights
    pub fn new(device: &B::Device, config: &ScoreModelConfig) -> Self {
        let mut hidden = Vec::with_capacity(config.hidden_dims.len());
        let mut in_dim = config.input_dim;
        for &out_dim in &config.hidden_dims {
            hidden.push(HiddenBlock::new(device, in_dim, out_dim));
            in_dim = out_dim;
        }

        ScoreModel {
            hidden,
            score_head: LinearConfig::new(in_dim, 1).init(device),
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `features` - Scaled features [batch, input_dim]
    ///
    /// # Returns
    /// Predicted score [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self
            .hidden
            .iter()
            .fold(features, |x, block| block.forward(x));
        self.score_head.forward(x)
    }

    /// Save model to file
    pub fn save(&self, path: &str) -> crate::Result<()>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = burn::record::NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        recorder
            .record(self.clone().into_record(), path.into())
            .map_err(|e| IplError::Io(std::io::Error::other(e.to_string())))
    }

    /// Load model from file
    pub fn load(device: &B::Device, path: &str, config: &ScoreModelConfig) -> crate::Result<Self>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = burn::record::NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let record = recorder
            .load(path.into(), device)
            .map_err(|e| IplError::Config(format!("Failed to load model {}: {}", path, e)))?;

        let model = Self::new(device, config);
        Ok(model.load_record(record))
    }
}
