// src/classifier.rs
//
// Per-chunk event classification. Labels are mutated through a fixed,
// priority-ordered stage sequence; later stages may overwrite earlier
// ones, and the order itself is the contract:
//
//   1. candidate-event pass (magnitude variance vs chunk mean)
//   2. harsh-braking mask   (negative-Ax variance threshold)
//   3. harsh-acceleration mask (positive-Ax variance threshold)
//   4. swerving mask + application order: acceleration, swerving,
//      braking, then the sustained-turn (wide yaw range) reset
//   5. residual extreme-value overrides (raw Ax, then raw Ay)
//   6. over-speed (runs last, overwrites anything)
//   7. candidate-label cleanup
//   8. low-speed swerving suppression
//   9. edge-triggered braking count
//
// Stages 2-4 are skipped entirely when stage 1 finds no candidates;
// stages 5-9 always run.

use crate::config::ClassifierConfig;
use crate::rolling::{centered_range, nan_mean, nan_std, trailing_variance};
use crate::types::{EnrichedSample, Label};
use tracing::debug;

/// Event counts for one chunk.
///
/// `swerving_events` is the stage-4 mask count and
/// `potential_swerving_events` the stage-5 transition count; they are
/// deliberately disjoint. `harsh_braking_events` counts entries into the
/// braking state, not braking samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub detected_events: usize,
    pub harsh_braking_events: usize,
    pub harsh_acceleration_events: usize,
    pub swerving_events: usize,
    pub potential_swerving_events: usize,
    pub over_speed_events: usize,
}

/// Working per-sample mark. `Event` is the internal candidate pre-label;
/// it never survives past stage 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Normal,
    Event,
    HarshBraking,
    HarshAcceleration,
    Swerving,
    OverSpeed,
}

impl Mark {
    /// Residual overrides only reclassify samples no earlier rule claimed.
    fn is_overridable(self) -> bool {
        matches!(self, Mark::Normal | Mark::Event)
    }

    fn finalize(self) -> Label {
        match self {
            Mark::Normal | Mark::Event => Label::Normal,
            Mark::HarshBraking => Label::HarshBraking,
            Mark::HarshAcceleration => Label::HarshAcceleration,
            Mark::Swerving => Label::Swerving,
            Mark::OverSpeed => Label::OverSpeed,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum AxSign {
    Negative,
    Positive,
}

/// Classify one chunk, returning a label per sample plus the counts.
/// An empty chunk short-circuits to an all-zero result.
pub fn classify_chunk(
    samples: &[EnrichedSample],
    config: &ClassifierConfig,
) -> (Vec<Label>, EventCounts) {
    let mut counts = EventCounts::default();
    if samples.is_empty() {
        return (Vec::new(), counts);
    }

    let mut marks = vec![Mark::Normal; samples.len()];

    // Stage 1: candidate events.
    counts.detected_events = mark_candidates(samples, config, &mut marks);

    if counts.detected_events > 0 {
        // Stages 2-3: variance masks over the signed Ax restrictions.
        let braking = axial_variance_mask(samples, config, AxSign::Negative);
        let acceleration = axial_variance_mask(samples, config, AxSign::Positive);

        // Stage 4: swerving mask and the sustained-turn reset, recorded
        // before any of the three labels land.
        let (swerving, reset) = swerving_masks(samples, config);
        counts.swerving_events = swerving.iter().filter(|&&hit| hit).count();

        apply_mask(&mut marks, &acceleration, Mark::HarshAcceleration);
        apply_mask(&mut marks, &swerving, Mark::Swerving);
        apply_mask(&mut marks, &braking, Mark::HarshBraking);
        apply_mask(&mut marks, &reset, Mark::Normal);
    }

    // Stage 5: residual extreme-value overrides, braking first.
    for (mark, sample) in marks.iter_mut().zip(samples) {
        if mark.is_overridable() && sample.ax < config.harsh_braking_ax {
            *mark = Mark::HarshBraking;
        }
    }
    for (mark, sample) in marks.iter_mut().zip(samples) {
        if mark.is_overridable() && sample.ay.abs() > config.swerving_ay {
            *mark = Mark::Swerving;
            counts.potential_swerving_events += 1;
        }
    }

    // Stage 6: over-speed overwrites any prior label.
    for (mark, sample) in marks.iter_mut().zip(samples) {
        if sample.speed > config.over_speed_kmh {
            *mark = Mark::OverSpeed;
        }
    }

    // Stage 7: surviving candidates revert to Normal.
    for mark in marks.iter_mut() {
        if *mark == Mark::Event {
            *mark = Mark::Normal;
        }
    }

    // Stage 8: swerving is not attributable at near-stationary speeds.
    for (mark, sample) in marks.iter_mut().zip(samples) {
        if *mark == Mark::Swerving && sample.speed < config.min_swerving_speed_kmh {
            *mark = Mark::Normal;
        }
    }

    let labels: Vec<Label> = marks.into_iter().map(Mark::finalize).collect();

    // Stage 9: braking incidents (state entries), plus final-label counts.
    counts.harsh_braking_events = braking_entries(&labels);
    counts.harsh_acceleration_events = labels
        .iter()
        .filter(|&&l| l == Label::HarshAcceleration)
        .count();
    counts.over_speed_events = labels.iter().filter(|&&l| l == Label::OverSpeed).count();

    debug!(
        samples = labels.len(),
        detected = counts.detected_events,
        braking = counts.harsh_braking_events,
        acceleration = counts.harsh_acceleration_events,
        swerving = counts.swerving_events,
        potential_swerving = counts.potential_swerving_events,
        over_speed = counts.over_speed_events,
        "chunk classified"
    );

    (labels, counts)
}

/// Stage 1: mark samples whose short-window magnitude variance exceeds
/// the chunk-wide mean magnitude. Returns the candidate count.
fn mark_candidates(
    samples: &[EnrichedSample],
    config: &ClassifierConfig,
    marks: &mut [Mark],
) -> usize {
    let magnitudes: Vec<f64> = samples.iter().map(|s| s.acceleration_magnitude).collect();
    let variance = trailing_variance(&magnitudes, config.magnitude_variance_window);
    let mean_magnitude = nan_mean(&magnitudes);

    let mut detected = 0;
    for (mark, &v) in marks.iter_mut().zip(&variance) {
        if v > mean_magnitude {
            *mark = Mark::Event;
            detected += 1;
        }
    }
    detected
}

/// Stages 2-3: variance of Ax restricted to one sign. Out-of-sign values
/// are absent from the window's sample set, not zeroed. A sample
/// qualifies when its windowed variance exceeds mean + k·std of the
/// variance series and its raw Ax is beyond the extreme threshold.
fn axial_variance_mask(
    samples: &[EnrichedSample],
    config: &ClassifierConfig,
    sign: AxSign,
) -> Vec<bool> {
    let restricted: Vec<f64> = samples
        .iter()
        .map(|s| match sign {
            AxSign::Negative if s.ax < 0.0 => s.ax,
            AxSign::Positive if s.ax > 0.0 => s.ax,
            _ => f64::NAN,
        })
        .collect();

    let variance = trailing_variance(&restricted, config.axial_variance_window);
    let mean = nan_mean(&variance);
    let std = nan_std(&variance);
    // A degenerate spread (zero, or NaN from too few observations) gets a
    // unit fallback so the threshold stays usable.
    let std = if std.is_finite() && std > 0.0 { std } else { 1.0 };
    let threshold = mean + config.sigma_multiplier * std;

    samples
        .iter()
        .zip(&variance)
        .map(|(s, &v)| {
            let extreme = match sign {
                AxSign::Negative => s.ax < config.harsh_braking_ax,
                AxSign::Positive => s.ax > config.harsh_acceleration_ax,
            };
            v > threshold && extreme
        })
        .collect()
}

/// Stage 4 masks: swerving (narrow yaw range inside the band, plus a
/// lateral-acceleration kick) and the sustained-turn reset (wide yaw
/// range beyond the reset limit, a genuine turn rather than an oscillation).
fn swerving_masks(samples: &[EnrichedSample], config: &ClassifierConfig) -> (Vec<bool>, Vec<bool>) {
    let yaw: Vec<f64> = samples.iter().map(|s| s.yaw).collect();
    let narrow = centered_range(&yaw, config.swerve_yaw_window);
    let wide = centered_range(&yaw, config.yaw_reset_window);

    let swerving = samples
        .iter()
        .zip(&narrow)
        .map(|(s, &range)| {
            range >= config.swerve_yaw_min
                && range <= config.swerve_yaw_max
                && s.ay.abs() > config.swerving_ay
        })
        .collect();

    let reset = wide.iter().map(|&range| range > config.yaw_reset_range).collect();

    (swerving, reset)
}

fn apply_mask(marks: &mut [Mark], mask: &[bool], mark: Mark) {
    for (m, &hit) in marks.iter_mut().zip(mask) {
        if hit {
            *m = mark;
        }
    }
}

/// Stage 9: count transitions into `HarshBraking`. The chunk's first
/// sample is compared against an implicit `Normal` predecessor, so a
/// chunk that opens mid-braking still counts one incident.
fn braking_entries(labels: &[Label]) -> usize {
    let mut count = 0;
    let mut prev = Label::Normal;
    for &label in labels {
        if label == Label::HarshBraking && prev != Label::HarshBraking {
            count += 1;
        }
        prev = label;
    }
    count
}
