//! Categorical label encoders
//!
//! Each field has a closed vocabulary fixed at training time. A label's code is
//! its index in the sorted vocabulary.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::{Field, IplError, MatchContext, PredictError, Result};

/// On-disk form of an encoder
#[derive(Debug, Serialize, Deserialize)]
struct EncoderRecord {
    classes: Vec<String>,
}

/// Closed label-to-code lookup table for one field
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, u32>,
}

impl LabelEncoder {
    /// Build a vocabulary from raw labels: distinct values, sorted
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self::build(classes)
    }

    /// Use an existing vocabulary verbatim, in the given code order
    pub fn from_classes(classes: Vec<String>) -> Result<Self> {
        let encoder = Self::build(classes);
        if encoder.index.len() != encoder.classes.len() {
            return Err(IplError::Config(
                "Encoder vocabulary contains duplicate labels".to_string(),
            ));
        }
        Ok(encoder)
    }

    fn build(classes: Vec<String>) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i as u32))
            .collect();
        LabelEncoder { classes, index }
    }

    /// Load an encoder from a JSON `{"classes": [...]}` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IplError::Config(format!("Failed to read encoder {}: {}", path.display(), e))
        })?;
        let record: EncoderRecord = serde_json::from_str(&content)?;
        Self::from_classes(record.classes)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let record = EncoderRecord {
            classes: self.classes.clone(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&record)?)?;
        Ok(())
    }

    /// Code for a label, or None if the label was never seen in training
    pub fn encode(&self, label: &str) -> Option<u32> {
        self.index.get(label).copied()
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// One encoder per categorical field
#[derive(Debug, Clone)]
pub struct CategoricalEncoders {
    venue: LabelEncoder,
    batting_team: LabelEncoder,
    bowling_team: LabelEncoder,
    striker: LabelEncoder,
    bowler: LabelEncoder,
}

impl CategoricalEncoders {
    pub fn new(
        venue: LabelEncoder,
        batting_team: LabelEncoder,
        bowling_team: LabelEncoder,
        striker: LabelEncoder,
        bowler: LabelEncoder,
    ) -> Self {
        CategoricalEncoders {
            venue,
            batting_team,
            bowling_team,
            striker,
            bowler,
        }
    }

    /// Load all five encoders, resolving each field's path with `path_for`
    pub fn load<F, P>(path_for: F) -> Result<Self>
    where
        F: Fn(Field) -> P,
        P: AsRef<Path>,
    {
        Ok(CategoricalEncoders {
            venue: LabelEncoder::load(path_for(Field::Venue))?,
            batting_team: LabelEncoder::load(path_for(Field::BattingTeam))?,
            bowling_team: LabelEncoder::load(path_for(Field::BowlingTeam))?,
            striker: LabelEncoder::load(path_for(Field::Striker))?,
            bowler: LabelEncoder::load(path_for(Field::Bowler))?,
        })
    }

    pub fn encoder(&self, field: Field) -> &LabelEncoder {
        match field {
            Field::Venue => &self.venue,
            Field::BattingTeam => &self.batting_team,
            Field::BowlingTeam => &self.bowling_team,
            Field::Striker => &self.striker,
            Field::Bowler => &self.bowler,
        }
    }

    /// Encode a single field's label
    pub fn encode_field(&self, field: Field, label: &str) -> std::result::Result<u32, PredictError> {
        self.encoder(field)
            .encode(label)
            .ok_or_else(|| PredictError::UnknownCategory {
                field,
                value: label.to_string(),
            })
    }

    /// Encode every field of a request into the canonical feature layout
    pub fn encode(&self, ctx: &MatchContext) -> std::result::Result<FeatureVector, PredictError> {
        Ok(FeatureVector {
            venue: self.encode_field(Field::Venue, ctx.venue())?,
            batting_team: self.encode_field(Field::BattingTeam, ctx.batting_team())?,
            bowling_team: self.encode_field(Field::BowlingTeam, ctx.bowling_team())?,
            striker: self.encode_field(Field::Striker, ctx.striker())?,
            bowler: self.encode_field(Field::Bowler, ctx.bowler())?,
        })
    }
}
