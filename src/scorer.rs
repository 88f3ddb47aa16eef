// src/scorer.rs
//
// Chunk scoring: a weighted penalty per counted event, subtracted from a
// 100-point baseline and clamped to [0, 100].

use crate::classifier::EventCounts;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Penalty per event, by category. Potential swerving defaults to a zero
/// weight: the residual lateral-extreme rule is too noisy to price in,
/// but callers may opt in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub harsh_braking: f64,
    pub harsh_acceleration: f64,
    pub swerving: f64,
    pub potential_swerving: f64,
    pub over_speed: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            harsh_braking: 20.0,
            harsh_acceleration: 10.0,
            swerving: 30.0,
            potential_swerving: 0.0,
            over_speed: 20.0,
        }
    }
}

impl ScoreWeights {
    /// Non-finite weights would poison every downstream score.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("harsh_braking", self.harsh_braking),
            ("harsh_acceleration", self.harsh_acceleration),
            ("swerving", self.swerving),
            ("potential_swerving", self.potential_swerving),
            ("over_speed", self.over_speed),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(AnalysisError::InvalidWeight(name));
            }
        }
        Ok(())
    }
}

/// Score one chunk from its event counts.
pub fn score_chunk(counts: &EventCounts, weights: &ScoreWeights) -> f64 {
    let penalty = weights.harsh_braking * counts.harsh_braking_events as f64
        + weights.harsh_acceleration * counts.harsh_acceleration_events as f64
        + weights.swerving * counts.swerving_events as f64
        + weights.potential_swerving * counts.potential_swerving_events as f64
        + weights.over_speed * counts.over_speed_events as f64;

    (100.0 - penalty).clamp(0.0, 100.0)
}
