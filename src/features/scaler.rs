//! Z-score feature scaling with parameters fixed at training time

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, ScaledFeatureVector};
use crate::{IplError, Result};

/// Per-position standardization: (x - mean) / scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f32; FeatureVector::DIM],
    pub scale: [f32; FeatureVector::DIM],
}

impl Default for StandardScaler {
    fn default() -> Self {
        // Identity transform
        StandardScaler {
            mean: [0.0; FeatureVector::DIM],
            scale: [1.0; FeatureVector::DIM],
        }
    }
}

impl StandardScaler {
    pub fn new(mean: [f32; FeatureVector::DIM], scale: [f32; FeatureVector::DIM]) -> Result<Self> {
        let scaler = StandardScaler { mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    fn validate(&self) -> Result<()> {
        if let Some(m) = self.mean.iter().find(|m| !m.is_finite()) {
            return Err(IplError::Config(format!("Scaler mean is not finite: {}", m)));
        }
        if let Some(s) = self.scale.iter().find(|s| !s.is_finite() || **s == 0.0) {
            return Err(IplError::Config(format!(
                "Scaler scale must be finite and non-zero, got {}",
                s
            )));
        }
        Ok(())
    }

    /// Load scaler parameters from a JSON `{"mean": [..], "scale": [..]}` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IplError::Config(format!("Failed to read scaler {}: {}", path.display(), e))
        })?;
        let scaler: StandardScaler = serde_json::from_str(&content)?;
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Scale a feature vector
    pub fn transform(&self, features: &FeatureVector) -> ScaledFeatureVector {
        let raw = features.to_array();
        let mut scaled = [0.0f32; FeatureVector::DIM];
        for (i, value) in scaled.iter_mut().enumerate() {
            *value = (raw[i] - self.mean[i]) / self.scale[i];
        }
        ScaledFeatureVector::new(scaled)
    }

    /// Undo scaling
    pub fn inverse_transform(&self, scaled: &ScaledFeatureVector) -> [f32; FeatureVector::DIM] {
        let values = scaled.to_array();
        let mut raw = [0.0f32; FeatureVector::DIM];
        for (i, value) in raw.iter_mut().enumerate() {
            *value = values[i] * self.scale[i] + self.mean[i];
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> FeatureVector {
        FeatureVector {
            venue: 3,
            batting_team: 1,
            bowling_team: 4,
            striker: 7,
            bowler: 2,
        }
    }

    #[test]
    fn test_identity() {
        let scaled = StandardScaler::default().transform(&sample());
        assert_eq!(scaled.to_array(), [3.0, 1.0, 4.0, 7.0, 2.0]);
    }

    #[test]
    fn test_transform() {
        let scaler =
            StandardScaler::new([1.0, 1.0, 2.0, 5.0, 0.0], [2.0, 0.5, 4.0, 1.0, 10.0]).unwrap();
        let scaled = scaler.transform(&sample()).to_array();

        assert_relative_eq!(scaled[0], 1.0);
        assert_relative_eq!(scaled[1], 0.0);
        assert_relative_eq!(scaled[2], 0.5);
        assert_relative_eq!(scaled[3], 2.0);
        assert_relative_eq!(scaled[4], 0.2);
    }

    #[test]
    fn test_inverse_transform() {
        let scaler =
            StandardScaler::new([10.0, 5.0, 5.0, 100.0, 80.0], [6.5, 3.2, 3.2, 90.0, 70.0]).unwrap();
        let raw = scaler.inverse_transform(&scaler.transform(&sample()));

        for (got, want) in raw.iter().zip(sample().to_array()) {
            assert_relative_eq!(*got, want, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_rejects_zero_scale() {
        let result = StandardScaler::new([0.0; 5], [1.0, 1.0, 0.0, 1.0, 1.0]);
        assert!(matches!(result, Err(IplError::Config(_))));
    }

    #[test]
    fn test_rejects_nan_mean() {
        let result = StandardScaler::new([0.0, f32::NAN, 0.0, 0.0, 0.0], [1.0; 5]);
        assert!(matches!(result, Err(IplError::Config(_))));
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let result: serde_json::Result<StandardScaler> =
            serde_json::from_str(r#"{"mean": [0, 0, 0], "scale": [1, 1, 1]}"#);
        assert!(result.is_err());
    }
}
