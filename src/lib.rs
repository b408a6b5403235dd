//! IPL score prediction
//!
//! Encodes a match context into the trained feature layout, scales it and runs
//! a pre-trained regression model to predict the final innings score.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Categorical input fields, in the order the model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Venue,
    BattingTeam,
    BowlingTeam,
    Striker,
    Bowler,
}

impl Field {
    /// All fields in canonical feature order
    pub const ALL: [Field; 5] = [
        Field::Venue,
        Field::BattingTeam,
        Field::BowlingTeam,
        Field::Striker,
        Field::Bowler,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Venue => "venue",
            Field::BattingTeam => "batting_team",
            Field::BowlingTeam => "bowling_team",
            Field::Striker => "striker",
            Field::Bowler => "bowler",
        }
    }

    /// Column holding this field in the ball-by-ball dataset
    pub fn dataset_column(&self) -> &'static str {
        match self {
            Field::Venue => "venue",
            Field::BattingTeam => "bat_team",
            Field::BowlingTeam => "bowl_team",
            Field::Striker => "batsman",
            Field::Bowler => "bowler",
        }
    }

    /// Position of this field in the feature vector
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace('-', "_");
        Field::ALL.into_iter().find(|f| f.name() == normalized)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single prediction request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchContext {
    venue: String,
    batting_team: String,
    bowling_team: String,
    striker: String,
    bowler: String,
}

impl MatchContext {
    pub fn new(
        venue: impl Into<String>,
        batting_team: impl Into<String>,
        bowling_team: impl Into<String>,
        striker: impl Into<String>,
        bowler: impl Into<String>,
    ) -> Self {
        MatchContext {
            venue: venue.into(),
            batting_team: batting_team.into(),
            bowling_team: bowling_team.into(),
            striker: striker.into(),
            bowler: bowler.into(),
        }
    }

    pub fn venue(&self) -> &str {
        &self.venue
    }

    pub fn batting_team(&self) -> &str {
        &self.batting_team
    }

    pub fn bowling_team(&self) -> &str {
        &self.bowling_team
    }

    pub fn striker(&self) -> &str {
        &self.striker
    }

    pub fn bowler(&self) -> &str {
        &self.bowler
    }

    /// Get the label held by a field
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Venue => &self.venue,
            Field::BattingTeam => &self.batting_team,
            Field::BowlingTeam => &self.bowling_team,
            Field::Striker => &self.striker,
            Field::Bowler => &self.bowler,
        }
    }
}

/// Model prediction output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Raw regression output
    pub raw: f32,
    /// Displayed score, truncated toward zero
    pub score: i32,
}

impl PredictionResult {
    pub fn from_raw(raw: f32) -> Self {
        // `as` saturates and truncates toward zero
        PredictionResult {
            raw,
            score: raw.trunc() as i32,
        }
    }

    /// Runs lost to truncation
    pub fn truncation_loss(&self) -> f32 {
        self.raw - self.score as f32
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.score)
    }
}

/// Failures on the prediction path
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("Unknown {field}: {value:?} is not in the trained vocabulary")]
    UnknownCategory { field: Field, value: String },

    #[error("Inference failed: {cause}")]
    Inference { cause: String },
}

impl PredictError {
    pub fn inference(cause: impl Into<String>) -> Self {
        PredictError::Inference {
            cause: cause.into(),
        }
    }

    /// Whether the caller can fix this by changing the input
    pub fn is_user_error(&self) -> bool {
        matches!(self, PredictError::UnknownCategory { .. })
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum IplError {
    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error("Model not found at {0} - check [artifacts] in config")]
    NoModel(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, IplError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub artifacts: ArtifactConfig,
    pub model: ModelConfig,
    pub data: DataConfig,
}

/// Paths to the trained artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub venue_encoder: String,
    pub batting_team_encoder: String,
    pub bowling_team_encoder: String,
    pub striker_encoder: String,
    pub bowler_encoder: String,
    pub scaler: String,
    /// Burn record path, without the `.mpk` extension
    pub model: String,
}

impl ArtifactConfig {
    /// Encoder artifact path for a field
    pub fn encoder_path(&self, field: Field) -> &str {
        match field {
            Field::Venue => &self.venue_encoder,
            Field::BattingTeam => &self.batting_team_encoder,
            Field::BowlingTeam => &self.bowling_team_encoder,
            Field::Striker => &self.striker_encoder,
            Field::Bowler => &self.bowler_encoder,
        }
    }

    /// Model record file as written by burn
    pub fn model_file(&self) -> String {
        format!("{}.mpk", self.model)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub hidden_dims: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub catalog_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            artifacts: ArtifactConfig {
                venue_encoder: "artifacts/venue_encoder.json".to_string(),
                batting_team_encoder: "artifacts/batting_team_encoder.json".to_string(),
                bowling_team_encoder: "artifacts/bowling_team_encoder.json".to_string(),
                striker_encoder: "artifacts/striker_encoder.json".to_string(),
                bowler_encoder: "artifacts/bowler_encoder.json".to_string(),
                scaler: "artifacts/scaler.json".to_string(),
                model: "artifacts/ipl_model".to_string(),
            },
            model: ModelConfig {
                hidden_dims: vec![128, 64],
            },
            data: DataConfig {
                catalog_path: "data/ipl_data.csv".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            IplError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| IplError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| IplError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
