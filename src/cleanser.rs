// src/cleanser.rs
//
// Sample cleansing: the only stage allowed to drop rows. Everything it
// drops is a row-level data defect (unparsable timestamp, invalid GPS
// fix, duplicate timestamp); structural defects abort the run instead.

use crate::error::{AnalysisError, Result};
use crate::types::{CleanSample, RawSample};
use chrono::NaiveTime;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Accepted timestamp formats, tried in order; first parse wins.
const TIMESTAMP_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M", "%I:%M %p"];

const SPEED_MIN_KMH: f64 = 0.0;
const SPEED_MAX_KMH: f64 = 200.0;

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

fn valid_fix(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
        && !(latitude == 0.0 && longitude == 0.0)
}

/// Forward-fill then back-fill a sensor column. A column with no values
/// at all cannot be filled and is a structural error.
fn fill_column(mut values: Vec<Option<f64>>, name: &'static str) -> Result<Vec<f64>> {
    let mut last = None;
    for v in values.iter_mut() {
        match *v {
            Some(x) => last = Some(x),
            None => *v = last,
        }
    }

    let mut next = None;
    for v in values.iter_mut().rev() {
        match *v {
            Some(x) => next = Some(x),
            None => *v = next,
        }
    }

    values
        .into_iter()
        .map(|v| v.ok_or(AnalysisError::MissingColumn(name)))
        .collect()
}

/// Cleanse a raw sample buffer into an ordered, deduplicated, range-valid
/// sequence with sequence indices regenerated 1..N.
///
/// Empty or fully-invalid input yields an empty output, not an error.
pub fn cleanse(buffer: &[RawSample]) -> Result<Vec<CleanSample>> {
    struct Row {
        time: NaiveTime,
        latitude: f64,
        longitude: f64,
        speed: f64,
        ax: Option<f64>,
        ay: Option<f64>,
        az: Option<f64>,
        yaw: Option<f64>,
    }

    let mut rows: Vec<Row> = Vec::with_capacity(buffer.len());
    let mut seen_times: HashSet<NaiveTime> = HashSet::new();
    let mut dropped_time = 0usize;
    let mut dropped_fix = 0usize;
    let mut dropped_dup = 0usize;

    for raw in buffer {
        let Some(time) = parse_time(&raw.timestamp) else {
            debug!(timestamp = %raw.timestamp, "dropping sample with unparsable timestamp");
            dropped_time += 1;
            continue;
        };

        if !valid_fix(raw.latitude, raw.longitude) {
            dropped_fix += 1;
            continue;
        }

        // Duplicate timestamps collapse to the first surviving occurrence.
        if !seen_times.insert(time) {
            dropped_dup += 1;
            continue;
        }

        rows.push(Row {
            time,
            latitude: raw.latitude,
            longitude: raw.longitude,
            speed: raw.speed,
            ax: raw.ax,
            ay: raw.ay,
            az: raw.az,
            yaw: raw.yaw,
        });
    }

    if dropped_time > 0 {
        warn!(
            count = dropped_time,
            "some timestamp values couldn't be parsed; rows dropped"
        );
    }
    if dropped_fix > 0 {
        warn!(count = dropped_fix, "rows dropped for invalid GPS fix");
    }
    if dropped_dup > 0 {
        debug!(count = dropped_dup, "duplicate timestamps collapsed");
    }

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ax = fill_column(rows.iter().map(|r| r.ax).collect(), "ax")?;
    let ay = fill_column(rows.iter().map(|r| r.ay).collect(), "ay")?;
    let az = fill_column(rows.iter().map(|r| r.az).collect(), "az")?;
    let yaw = fill_column(rows.iter().map(|r| r.yaw).collect(), "yaw")?;

    let cleaned = rows
        .iter()
        .enumerate()
        .map(|(i, row)| CleanSample {
            index: i as u32 + 1,
            time: row.time,
            latitude: row.latitude,
            longitude: row.longitude,
            speed: row.speed.clamp(SPEED_MIN_KMH, SPEED_MAX_KMH),
            // Fixed calibration: the raw feed reports forward acceleration
            // positive; downstream rules expect deceleration negative.
            ax: -ax[i],
            ay: ay[i],
            az: az[i],
            yaw: yaw[i],
        })
        .collect();

    Ok(cleaned)
}
