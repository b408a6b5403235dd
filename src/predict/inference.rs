//! Model inference for predictions

use std::path::Path;

use crate::features::{CategoricalEncoders, FeatureVector, ScaledFeatureVector, StandardScaler};
use crate::model::ScoreRegressor;
use crate::{ArtifactConfig, MatchContext, PredictError, PredictionResult, Result};

/// Encoders and scaler fixed at training time, loaded once
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub encoders: CategoricalEncoders,
    pub scaler: StandardScaler,
}

impl Artifacts {
    pub fn new(encoders: CategoricalEncoders, scaler: StandardScaler) -> Self {
        Artifacts { encoders, scaler }
    }

    /// Load the preprocessing artifacts named in config
    pub fn load(config: &ArtifactConfig) -> Result<Self> {
        let encoders = CategoricalEncoders::load(|field| Path::new(config.encoder_path(field)))?;
        let scaler = StandardScaler::load(&config.scaler)?;

        log::info!(
            "Loaded encoders: {}",
            crate::Field::ALL
                .iter()
                .map(|f| format!("{}={}", f, encoders.encoder(*f).len()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Artifacts { encoders, scaler })
    }
}

/// Predictor for making score predictions
pub struct Predictor<M> {
    artifacts: Artifacts,
    model: M,
}

impl<M: ScoreRegressor> Predictor<M> {
    /// Create a new predictor
    pub fn new(artifacts: Artifacts, model: M) -> Self {
        Predictor { artifacts, model }
    }

    /// Encode a request into the model's feature layout
    pub fn encode(&self, ctx: &MatchContext) -> std::result::Result<FeatureVector, PredictError> {
        self.artifacts.encoders.encode(ctx)
    }

    /// Encode and scale a request
    pub fn prepare(
        &self,
        ctx: &MatchContext,
    ) -> std::result::Result<ScaledFeatureVector, PredictError> {
        let features = self.encode(ctx)?;
        log::debug!("Encoded features: {:?}", features.to_array());

        let scaled = self.artifacts.scaler.transform(&features);
        if let Some(field) = scaled.first_non_finite() {
            return Err(PredictError::inference(format!(
                "scaled {} is not finite",
                field
            )));
        }
        log::debug!("Scaled features: {:?}", scaled.as_slice());

        Ok(scaled)
    }

    /// Predict the final score for a single request
    pub fn predict(&self, ctx: &MatchContext) -> std::result::Result<PredictionResult, PredictError> {
        let scaled = self.prepare(ctx)?;

        let raw = self.model.predict(&scaled)?;
        if !raw.is_finite() {
            return Err(PredictError::inference(format!("non-finite output {}", raw)));
        }

        let result = PredictionResult::from_raw(raw);
        log::debug!("Raw prediction {:.3} -> {}", raw, result.score);
        Ok(result)
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

/// Format a prediction for display
pub fn format_prediction(ctx: &MatchContext, result: &PredictionResult) -> String {
    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {} vs {} at {}
├─────────────────────────────────────────────────┤
│  Striker:          {}
│  Bowler:           {}
│  Predicted score:  {}
│  Model output:     {:.2}
└─────────────────────────────────────────────────┘
"#,
        ctx.batting_team(),
        ctx.bowling_team(),
        ctx.venue(),
        ctx.striker(),
        ctx.bowler(),
        result.score,
        result.raw,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::LabelEncoder;
    use crate::Field;
    use std::cell::Cell;

    /// Weighted sum of positions, counting calls
    struct WeightedSum {
        weights: [f32; FeatureVector::DIM],
        bias: f32,
        calls: Cell<usize>,
    }

    impl WeightedSum {
        fn new(weights: [f32; FeatureVector::DIM], bias: f32) -> Self {
            WeightedSum {
                weights,
                bias,
                calls: Cell::new(0),
            }
        }
    }

    impl ScoreRegressor for WeightedSum {
        fn predict(&self, features: &ScaledFeatureVector) -> std::result::Result<f32, PredictError> {
            self.calls.set(self.calls.get() + 1);
            Ok(features
                .as_slice()
                .iter()
                .zip(self.weights.iter())
                .map(|(x, w)| x * w)
                .sum::<f32>()
                + self.bias)
        }
    }

    /// Returns a fixed value regardless of input
    struct Constant(f32);

    impl ScoreRegressor for Constant {
        fn predict(&self, _: &ScaledFeatureVector) -> std::result::Result<f32, PredictError> {
            Ok(self.0)
        }
    }

    struct Failing;

    impl ScoreRegressor for Failing {
        fn predict(&self, _: &ScaledFeatureVector) -> std::result::Result<f32, PredictError> {
            Err(PredictError::inference("shape mismatch"))
        }
    }

    /// Vocabularies where the example request encodes to (3, 1, 4, 7, 2)
    fn artifacts() -> Artifacts {
        let venues = ["A Stadium", "B Stadium", "C Stadium", "Eden Gardens", "Wankhede"];
        let teams = ["CSK", "KKR", "LSG", "MBX", "MI"];
        let strikers = ["0", "1", "2", "3", "4", "5", "6", "A"];
        let bowlers = ["0", "1", "B"];

        let encoders = CategoricalEncoders::new(
            LabelEncoder::fit(venues),
            LabelEncoder::fit(teams),
            LabelEncoder::fit(teams),
            LabelEncoder::fit(strikers),
            LabelEncoder::fit(bowlers),
        );
        Artifacts::new(encoders, StandardScaler::default())
    }

    fn example() -> MatchContext {
        MatchContext::new("Eden Gardens", "KKR", "MI", "A", "B")
    }

    #[test]
    fn test_example_scenario() {
        let predictor = Predictor::new(artifacts(), Constant(2.37));

        let features = predictor.encode(&example()).unwrap();
        assert_eq!(features.to_array(), [3.0, 1.0, 4.0, 7.0, 2.0]);

        let result = predictor.predict(&example()).unwrap();
        assert_eq!(result.score, 2);
        assert!((result.raw - 2.37).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_venue_skips_model() {
        let model = WeightedSum::new([1.0; FeatureVector::DIM], 0.0);
        let predictor = Predictor::new(artifacts(), &model);
        let ctx = MatchContext::new("Unknown Stadium", "KKR", "MI", "A", "B");

        let err = predictor.predict(&ctx).unwrap_err();
        assert_eq!(
            err,
            PredictError::UnknownCategory {
                field: Field::Venue,
                value: "Unknown Stadium".to_string(),
            }
        );
        assert_eq!(model.calls.get(), 0);
    }

    #[test]
    fn test_unknown_label_in_each_field() {
        let model = WeightedSum::new([1.0; FeatureVector::DIM], 0.0);
        let predictor = Predictor::new(artifacts(), &model);

        for field in Field::ALL {
            let mut labels: Vec<String> = Field::ALL
                .iter()
                .map(|f| example().get(*f).to_string())
                .collect();
            labels[field.index()] = "nobody".to_string();
            let ctx = MatchContext::new(
                labels[0].clone(),
                labels[1].clone(),
                labels[2].clone(),
                labels[3].clone(),
                labels[4].clone(),
            );

            match predictor.predict(&ctx) {
                Err(PredictError::UnknownCategory { field: f, value }) => {
                    assert_eq!(f, field);
                    assert_eq!(value, "nobody");
                }
                other => panic!("expected unknown {}, got {:?}", field, other),
            }
        }
        assert_eq!(model.calls.get(), 0);
    }

    #[test]
    fn test_swapped_teams() {
        let model = WeightedSum::new([0.0, 10.0, 1.0, 0.0, 0.0], 100.0);
        let predictor = Predictor::new(artifacts(), &model);
        let original = example();
        let swapped = MatchContext::new("Eden Gardens", "MI", "KKR", "A", "B");

        let a = predictor.encode(&original).unwrap();
        let b = predictor.encode(&swapped).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.batting_team, b.bowling_team);

        let ra = predictor.predict(&original).unwrap();
        let rb = predictor.predict(&swapped).unwrap();
        // 100 + 10*1 + 4 vs 100 + 10*4 + 1
        assert_eq!(ra.score, 114);
        assert_eq!(rb.score, 141);
    }

    #[test]
    fn test_deterministic() {
        let model = WeightedSum::new([0.3, -1.2, 2.5, 0.7, 1.1], 150.0);
        let predictor = Predictor::new(artifacts(), model);

        let first = predictor.predict(&example()).unwrap();
        let second = predictor.predict(&example()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scaler_applied() {
        let mut artifacts = artifacts();
        artifacts.scaler =
            StandardScaler::new([3.0, 1.0, 4.0, 7.0, 2.0], [1.0, 1.0, 1.0, 1.0, 1.0]).unwrap();
        let predictor = Predictor::new(artifacts, WeightedSum::new([1.0; 5], 42.0));

        let scaled = predictor.prepare(&example()).unwrap();
        assert_eq!(scaled.to_array(), [0.0; 5]);
        assert_eq!(predictor.predict(&example()).unwrap().score, 42);
    }

    #[test]
    fn test_negative_output_truncates_toward_zero() {
        let predictor = Predictor::new(artifacts(), Constant(-2.7));
        assert_eq!(predictor.predict(&example()).unwrap().score, -2);
    }

    #[test]
    fn test_model_failure_propagates() {
        let predictor = Predictor::new(artifacts(), Failing);
        let err = predictor.predict(&example()).unwrap_err();
        assert_eq!(err, PredictError::inference("shape mismatch"));
    }

    #[test]
    fn test_non_finite_output() {
        let predictor = Predictor::new(artifacts(), Constant(f32::NAN));
        let err = predictor.predict(&example()).unwrap_err();
        assert!(matches!(err, PredictError::Inference { .. }));
    }

    #[test]
    fn test_format_prediction() {
        let text = format_prediction(&example(), &PredictionResult::from_raw(171.6));
        assert!(text.contains("KKR vs MI at Eden Gardens"));
        assert!(text.contains("Predicted score:  171"));
        assert!(text.contains("171.60"));
    }
}
