// src/pipeline.rs
//
// End-to-end orchestration: cleanse -> enrich -> segment -> classify ->
// score. Each chunk is classified in isolation; no rolling state crosses
// a chunk boundary.

use crate::classifier::classify_chunk;
use crate::cleanser::cleanse;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::features::enrich;
use crate::scorer::{score_chunk, ScoreWeights};
use crate::segmenter::segment;
use crate::types::{ChunkResult, LabeledSample, RawSample};
use tracing::{debug, info};

/// Full output of one analysis run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnalysisReport {
    /// Every surviving sample, labeled, in chunk order.
    pub samples: Vec<LabeledSample>,
    pub chunks: Vec<ChunkResult>,
    /// Mean of the chunk scores; 0.0 when no chunk was produced.
    pub overall_score: f64,
}

/// Analyze a raw sample buffer. `weights` falls back to the defaults when
/// not supplied.
pub fn analyze(
    buffer: &[RawSample],
    config: &AnalysisConfig,
    weights: Option<&ScoreWeights>,
) -> Result<AnalysisReport> {
    let default_weights = ScoreWeights::default();
    let weights = weights.unwrap_or(&default_weights);
    weights.validate()?;

    let cleaned = cleanse(buffer)?;
    if cleaned.is_empty() {
        info!("no samples survived cleansing");
        return Ok(AnalysisReport {
            samples: Vec::new(),
            chunks: Vec::new(),
            overall_score: 0.0,
        });
    }

    let enriched = enrich(&cleaned, config.median_window);
    let total_distance: f64 = enriched.iter().map(|s| s.distance_km).sum();
    debug!(
        samples = enriched.len(),
        distance_km = total_distance,
        "enriched sample sequence"
    );

    let ranges = segment(&enriched, config.chunk_distance_km);

    let mut samples = Vec::with_capacity(enriched.len());
    let mut chunks = Vec::with_capacity(ranges.len());

    for range in ranges {
        let chunk = &enriched[range];
        let (labels, counts) = classify_chunk(chunk, &config.classifier);
        let score = score_chunk(&counts, weights);

        // classify_chunk yields one label per sample.
        debug_assert_eq!(labels.len(), chunk.len());

        chunks.push(ChunkResult {
            start_index: chunk[0].index,
            end_index: chunk[chunk.len() - 1].index,
            distance_km: chunk.iter().map(|s| s.distance_km).sum(),
            detected_events: counts.detected_events,
            harsh_braking_events: counts.harsh_braking_events,
            harsh_acceleration_events: counts.harsh_acceleration_events,
            swerving_events: counts.swerving_events,
            potential_swerving_events: counts.potential_swerving_events,
            over_speed_events: counts.over_speed_events,
            score,
        });

        samples.extend(
            chunk
                .iter()
                .zip(labels)
                .map(|(sample, label)| LabeledSample {
                    sample: sample.clone(),
                    label,
                }),
        );
    }

    let overall_score = if chunks.is_empty() {
        0.0
    } else {
        chunks.iter().map(|c| c.score).sum::<f64>() / chunks.len() as f64
    };

    info!(
        chunks = chunks.len(),
        distance_km = total_distance,
        overall_score,
        "analysis complete"
    );

    Ok(AnalysisReport {
        samples,
        chunks,
        overall_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::types::Label;

    // 0.0005 degrees of latitude per sample, roughly 0.0556 km, so the
    // default 0.1 km chunk closes every two moving samples.
    fn moving_buffer(n: usize) -> Vec<RawSample> {
        (0..n)
            .map(|i| RawSample {
                counter: None,
                timestamp: format!("12:{:02}:{:02}", i / 60, i % 60),
                latitude: 21.5 + i as f64 * 0.0005,
                longitude: 39.2,
                speed: 50.0,
                ax: Some(0.0),
                ay: Some(0.0),
                az: Some(0.0),
                yaw: Some(0.0),
            })
            .collect()
    }

    #[test]
    fn test_quiet_drive_scores_perfect() {
        let report = analyze(&moving_buffer(20), &AnalysisConfig::default(), None).unwrap();

        assert_eq!(report.samples.len(), 20);
        assert!(report.samples.iter().all(|s| s.label == Label::Normal));
        assert!(report.chunks.len() > 1);
        assert!(report.chunks.iter().all(|c| c.score == 100.0));
        assert_eq!(report.overall_score, 100.0);
    }

    #[test]
    fn test_empty_buffer_yields_empty_report() {
        let report = analyze(&[], &AnalysisConfig::default(), None).unwrap();
        assert!(report.samples.is_empty());
        assert!(report.chunks.is_empty());
        assert_eq!(report.overall_score, 0.0);
    }

    #[test]
    fn test_chunks_tile_the_run_with_sample_counters() {
        let report = analyze(&moving_buffer(21), &AnalysisConfig::default(), None).unwrap();

        assert_eq!(report.chunks.first().unwrap().start_index, 1);
        assert_eq!(report.chunks.last().unwrap().end_index, 21);
        for pair in report.chunks.windows(2) {
            assert_eq!(pair[1].start_index, pair[0].end_index + 1);
        }
    }

    #[test]
    fn test_event_is_confined_to_its_chunk() {
        let baseline = analyze(&moving_buffer(20), &AnalysisConfig::default(), None).unwrap();

        // Raw Ax is positive in the feed; the cleanser's calibration flip
        // turns it into the deceleration the braking rules look for.
        let mut buffer = moving_buffer(20);
        buffer[10].ax = Some(2500.0);
        let report = analyze(&buffer, &AnalysisConfig::default(), None).unwrap();

        assert_eq!(report.samples[10].label, Label::HarshBraking);

        let total_braking: usize = report.chunks.iter().map(|c| c.harsh_braking_events).sum();
        assert_eq!(total_braking, 1);

        // Exactly one chunk paid the penalty; every other chunk's counts
        // and score are untouched by the perturbation.
        let penalized: Vec<&ChunkResult> =
            report.chunks.iter().filter(|c| c.score < 100.0).collect();
        assert_eq!(penalized.len(), 1);
        assert_eq!(penalized[0].score, 80.0);
        assert!(
            penalized[0].start_index <= 11 && 11 <= penalized[0].end_index,
            "the penalized chunk must contain the braking sample"
        );
        for (before, after) in baseline.chunks.iter().zip(&report.chunks) {
            if !(after.start_index <= 11 && 11 <= after.end_index) {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn test_overall_score_is_mean_of_chunk_scores() {
        let mut buffer = moving_buffer(20);
        buffer[4].speed = 150.0;

        let report = analyze(&buffer, &AnalysisConfig::default(), None).unwrap();
        let mean: f64 =
            report.chunks.iter().map(|c| c.score).sum::<f64>() / report.chunks.len() as f64;
        assert!((report.overall_score - mean).abs() < 1e-12);
        assert!(report.overall_score < 100.0);
    }

    #[test]
    fn test_braking_entries_never_exceed_braking_samples() {
        let mut buffer = moving_buffer(30);
        for i in [5, 6, 7, 15].iter() {
            buffer[*i].ax = Some(2500.0);
        }

        let report = analyze(&buffer, &AnalysisConfig::default(), None).unwrap();
        let braking_samples = report
            .samples
            .iter()
            .filter(|s| s.label == Label::HarshBraking)
            .count();
        let entries: usize = report.chunks.iter().map(|c| c.harsh_braking_events).sum();
        assert!(entries <= braking_samples);
        assert!(entries >= 1);
    }

    #[test]
    fn test_invalid_weights_abort_before_any_work() {
        let weights = ScoreWeights {
            over_speed: f64::INFINITY,
            ..ScoreWeights::default()
        };
        match analyze(&moving_buffer(5), &AnalysisConfig::default(), Some(&weights)) {
            Err(AnalysisError::InvalidWeight(name)) => assert_eq!(name, "over_speed"),
            other => panic!("expected InvalidWeight, got {other:?}"),
        }
    }

    #[test]
    fn test_report_serializes() {
        let report = analyze(&moving_buffer(5), &AnalysisConfig::default(), None).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert!(value["overall_score"].is_number());
        assert_eq!(value["samples"][0]["label"], "Normal");
    }
}
