//! Prediction model seam
//!
//! The predictor only sees a scaled vector going in and a scalar coming out.

use std::sync::Arc;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::features::{FeatureVector, ScaledFeatureVector};
use crate::model::mlp::{ScoreModel, ScoreModelConfig};
use crate::PredictError;

/// Opaque trained function from a scaled feature vector to a score
pub trait ScoreRegressor {
    fn predict(&self, features: &ScaledFeatureVector) -> Result<f32, PredictError>;
}

impl<T: ScoreRegressor + ?Sized> ScoreRegressor for &T {
    fn predict(&self, features: &ScaledFeatureVector) -> Result<f32, PredictError> {
        (**self).predict(features)
    }
}

impl<T: ScoreRegressor + ?Sized> ScoreRegressor for Box<T> {
    fn predict(&self, features: &ScaledFeatureVector) -> Result<f32, PredictError> {
        (**self).predict(features)
    }
}

impl<T: ScoreRegressor + ?Sized> ScoreRegressor for Arc<T> {
    fn predict(&self, features: &ScaledFeatureVector) -> Result<f32, PredictError> {
        (**self).predict(features)
    }
}

/// Burn MLP bound to the device it runs on
pub struct BurnRegressor<B: Backend> {
    model: ScoreModel<B>,
    input_dim: usize,
    device: B::Device,
}

impl<B: Backend> BurnRegressor<B> {
    pub fn new(model: ScoreModel<B>, config: &ScoreModelConfig, device: B::Device) -> Self {
        BurnRegressor {
            model,
            input_dim: config.input_dim,
            device,
        }
    }

    /// Load the model record and bind it to a device
    pub fn load(device: B::Device, path: &str, config: &ScoreModelConfig) -> crate::Result<Self>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let model = ScoreModel::load(&device, path, config)?;
        Ok(Self::new(model, config, device))
    }

    pub fn model(&self) -> &ScoreModel<B> {
        &self.model
    }
}

impl<B: Backend> ScoreRegressor for BurnRegressor<B> {
    fn predict(&self, features: &ScaledFeatureVector) -> Result<f32, PredictError> {
        if self.input_dim != FeatureVector::DIM {
            return Err(PredictError::inference(format!(
                "model expects {} inputs, feature vector has {}",
                self.input_dim,
                FeatureVector::DIM
            )));
        }

        let input = Tensor::<B, 1>::from_floats(features.as_slice(), &self.device)
            .reshape([1, FeatureVector::DIM]);
        let output = self.model.forward(input);

        let dims = output.dims();
        if dims != [1, 1] {
            return Err(PredictError::inference(format!(
                "expected a single output, got shape {:?}",
                dims
            )));
        }

        let values = output
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| PredictError::inference(format!("{:?}", e)))?;

        match values.first() {
            Some(v) if v.is_finite() => Ok(*v),
            Some(v) => Err(PredictError::inference(format!("non-finite output {}", v))),
            None => Err(PredictError::inference("empty model output")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn regressor(config: ScoreModelConfig) -> BurnRegressor<TestBackend> {
        let device = Default::default();
        let model = ScoreModel::<TestBackend>::new(&device, &config);
        BurnRegressor::new(model, &config, device)
    }

    #[test]
    fn test_predict_scalar() {
        let regressor = regressor(ScoreModelConfig::default());
        let features = ScaledFeatureVector::new([0.1, -0.4, 1.2, 0.0, -2.0]);

        let score = regressor.predict(&features).unwrap();
        assert!(score.is_finite());
    }

    #[test]
    fn test_predict_deterministic() {
        let regressor = regressor(ScoreModelConfig::default());
        let features = ScaledFeatureVector::new([0.3, 0.3, -0.3, 1.0, 0.5]);

        let first = regressor.predict(&features).unwrap();
        let second = regressor.predict(&features).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_dim_mismatch() {
        let regressor = regressor(ScoreModelConfig {
            input_dim: 7,
            hidden_dims: vec![4],
        });
        let features = ScaledFeatureVector::new([0.0; FeatureVector::DIM]);

        let err = regressor.predict(&features).unwrap_err();
        assert!(matches!(err, PredictError::Inference { .. }));
    }

    #[test]
    fn test_through_references() {
        let regressor = regressor(ScoreModelConfig::default());
        let features = ScaledFeatureVector::new([0.0; FeatureVector::DIM]);
        let direct = regressor.predict(&features).unwrap();

        let boxed: Box<dyn ScoreRegressor> = Box::new(regressor);
        assert_eq!(boxed.predict(&features).unwrap(), direct);
        assert_eq!((&boxed).predict(&features).unwrap(), direct);
    }
}
