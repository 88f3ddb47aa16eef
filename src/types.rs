// src/types.rs

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// One raw telemetry record as handed over by the ingestion layer.
///
/// The ingestion collaborator owns schema reconciliation (field naming,
/// casing); this is the single canonical shape the core operates on.
/// Sensor readings are nullable per row; the cleanser gap-fills them.
/// A `counter` supplied by the caller is ignored and regenerated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSample {
    #[serde(default)]
    pub counter: Option<u32>,
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub ax: Option<f64>,
    pub ay: Option<f64>,
    pub az: Option<f64>,
    pub yaw: Option<f64>,
}

/// A cleansed sample: range-valid coordinates, parsed time, gap-filled
/// sensors, calibrated Ax sign, clipped speed, regenerated 1-based index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanSample {
    pub index: u32,
    pub time: NaiveTime,
    pub latitude: f64,
    pub longitude: f64,
    /// km/h, clipped to [0, 200].
    pub speed: f64,
    /// mm/s², sign-flipped relative to the raw feed (deceleration negative).
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    /// Heading, degrees.
    pub yaw: f64,
}

/// A cleansed sample plus derived features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedSample {
    pub index: u32,
    pub time: NaiveTime,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub yaw: f64,
    /// Magnitude of the median-smoothed acceleration vector. Non-negative.
    pub acceleration_magnitude: f64,
    /// Great-circle distance from the previous sample, km. Zero for the
    /// first sample and for degenerate (NaN/infinite) results.
    pub distance_km: f64,
}

/// Final driving-behavior label. Exactly one per sample.
///
/// The classifier's internal candidate pre-label never reaches this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Normal,
    HarshBraking,
    HarshAcceleration,
    Swerving,
    OverSpeed,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Normal => "Normal",
            Label::HarshBraking => "Harsh Braking",
            Label::HarshAcceleration => "Harsh Acceleration",
            Label::Swerving => "Swerving",
            Label::OverSpeed => "Over Speed",
        }
    }
}

/// An enriched sample with its final label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledSample {
    #[serde(flatten)]
    pub sample: EnrichedSample,
    pub label: Label,
}

/// Per-chunk aggregate counts and score.
///
/// `harsh_braking_events` is edge-triggered (entries into the braking
/// state); `detected_events` is the candidate-pass signal and is not
/// user-facing in the final taxonomy, but callers may persist it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkResult {
    /// 1-based counter of the chunk's first sample.
    pub start_index: u32,
    /// 1-based counter of the chunk's last sample.
    pub end_index: u32,
    pub distance_km: f64,
    pub detected_events: usize,
    pub harsh_braking_events: usize,
    pub harsh_acceleration_events: usize,
    pub swerving_events: usize,
    pub potential_swerving_events: usize,
    pub over_speed_events: usize,
    /// Safety score in [0, 100].
    pub score: f64,
}
