//! Feature vector representation for model input
//!
//! The model was trained on a fixed positional layout. The named fields here
//! are the only way to build a vector, and `to_array` is the only place the
//! positional order is written down.

use serde::Serialize;

use crate::Field;

/// Encoded match context, one code per field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureVector {
    pub venue: u32,
    pub batting_team: u32,
    pub bowling_team: u32,
    pub striker: u32,
    pub bowler: u32,
}

impl FeatureVector {
    /// Dimension of feature vector
    pub const DIM: usize = 5;

    /// Code held for a field
    pub fn code(&self, field: Field) -> u32 {
        match field {
            Field::Venue => self.venue,
            Field::BattingTeam => self.batting_team,
            Field::BowlingTeam => self.bowling_team,
            Field::Striker => self.striker,
            Field::Bowler => self.bowler,
        }
    }

    /// Raw numeric layout in canonical order
    pub fn to_array(&self) -> [f32; Self::DIM] {
        [
            self.venue as f32,
            self.batting_team as f32,
            self.bowling_team as f32,
            self.striker as f32,
            self.bowler as f32,
        ]
    }
}

/// Feature vector after scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaledFeatureVector([f32; FeatureVector::DIM]);

impl ScaledFeatureVector {
    pub fn new(values: [f32; FeatureVector::DIM]) -> Self {
        ScaledFeatureVector(values)
    }

    pub fn get(&self, field: Field) -> f32 {
        self.0[field.index()]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn to_array(&self) -> [f32; FeatureVector::DIM] {
        self.0
    }

    /// First field whose scaled value is not finite
    pub fn first_non_finite(&self) -> Option<Field> {
        Field::ALL.into_iter().find(|f| !self.get(*f).is_finite())
    }
}
