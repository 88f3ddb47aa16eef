// src/config.rs

use serde::{Deserialize, Serialize};

/// Top-level configuration for one analysis run.
///
/// Defaults reproduce the production values; tenants typically override
/// only `ScoreWeights`, not these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Accumulated travel that closes a chunk, km.
    pub chunk_distance_km: f64,
    /// Centered window for per-axis median smoothing of acceleration.
    pub median_window: usize,
    pub classifier: ClassifierConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunk_distance_km: 0.1,
            median_window: 5,
            classifier: ClassifierConfig::default(),
        }
    }
}

/// Thresholds and window sizes for the event classifier.
///
/// Acceleration thresholds are in the feed's mm/s² scale, yaw in degrees,
/// speeds in km/h.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Trailing window for the candidate-event magnitude variance.
    pub magnitude_variance_window: usize,
    /// Trailing window for the signed-Ax variance passes.
    pub axial_variance_window: usize,
    /// Centered window for the swerving yaw peak-to-peak range.
    pub swerve_yaw_window: usize,
    /// Wider centered window for the sustained-turn reset.
    pub yaw_reset_window: usize,
    /// Threshold = mean + sigma_multiplier * std of the variance series.
    pub sigma_multiplier: f64,
    pub harsh_braking_ax: f64,
    pub harsh_acceleration_ax: f64,
    pub swerving_ay: f64,
    pub swerve_yaw_min: f64,
    pub swerve_yaw_max: f64,
    /// Yaw range above which swerving candidates reset to Normal.
    pub yaw_reset_range: f64,
    pub over_speed_kmh: f64,
    /// Below this speed a Swerving label reverts to Normal.
    pub min_swerving_speed_kmh: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            magnitude_variance_window: 2,
            axial_variance_window: 35,
            swerve_yaw_window: 12,
            yaw_reset_window: 90,
            sigma_multiplier: 1.5,
            harsh_braking_ax: -2000.0,
            harsh_acceleration_ax: 2000.0,
            swerving_ay: 2000.0,
            swerve_yaw_min: 4.0,
            swerve_yaw_max: 12.0,
            yaw_reset_range: 40.0,
            over_speed_kmh: 120.0,
            min_swerving_speed_kmh: 30.0,
        }
    }
}
