// src/segmenter.rs
//
// Distance-bounded chunking. Chunks, not fixed sample counts, are the
// unit the classifier's rolling windows run over, so event rates are
// normalized by distance traveled rather than by sampling rate.

use crate::types::EnrichedSample;
use std::ops::Range;

/// Split the enriched sequence into consecutive chunks, each closed once
/// its accumulated `distance_km` reaches `chunk_distance_km`. Leftover
/// samples form a final, possibly-short chunk; an empty remainder
/// produces no chunk.
pub fn segment(samples: &[EnrichedSample], chunk_distance_km: f64) -> Vec<Range<usize>> {
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut accumulated = 0.0;

    for (i, sample) in samples.iter().enumerate() {
        accumulated += sample.distance_km;
        if accumulated >= chunk_distance_km {
            chunks.push(start..i + 1);
            start = i + 1;
            accumulated = 0.0;
        }
    }

    if start < samples.len() {
        chunks.push(start..samples.len());
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn sample_with_distance(index: u32, distance_km: f64) -> EnrichedSample {
        EnrichedSample {
            index,
            time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            latitude: 21.5,
            longitude: 39.2,
            speed: 50.0,
            ax: 0.0,
            ay: 0.0,
            az: 0.0,
            yaw: 0.0,
            acceleration_magnitude: 0.0,
            distance_km,
        }
    }

    #[test]
    fn test_chunks_close_at_threshold() {
        // First sample always contributes 0 km.
        let mut samples = vec![sample_with_distance(1, 0.0)];
        samples.extend((2..=9).map(|i| sample_with_distance(i, 0.0556)));

        let chunks = segment(&samples, 0.1);
        // 0 + 0.0556 + 0.0556 closes the first chunk at three samples,
        // then every following pair closes one; one sample remains.
        assert_eq!(chunks, vec![0..3, 3..5, 5..7, 7..9]);
    }

    #[test]
    fn test_trailing_partial_chunk_is_kept() {
        let samples = vec![
            sample_with_distance(1, 0.0),
            sample_with_distance(2, 0.12),
            sample_with_distance(3, 0.01),
        ];
        let chunks = segment(&samples, 0.1);
        assert_eq!(chunks, vec![0..2, 2..3]);
    }

    #[test]
    fn test_under_threshold_run_is_one_chunk() {
        let samples: Vec<EnrichedSample> =
            (1..=5).map(|i| sample_with_distance(i, 0.001)).collect();
        let chunks = segment(&samples, 0.1);
        assert_eq!(chunks, vec![0..5]);
    }

    #[test]
    fn test_empty_input_has_no_chunks() {
        assert!(segment(&[], 0.1).is_empty());
    }

    #[test]
    fn test_chunk_distances_cover_the_run() {
        let samples: Vec<EnrichedSample> =
            (1..=10).map(|i| sample_with_distance(i, 0.03)).collect();
        let chunks = segment(&samples, 0.1);

        let total: f64 = samples.iter().map(|s| s.distance_km).sum();
        let chunked: f64 = chunks
            .iter()
            .map(|r| samples[r.clone()].iter().map(|s| s.distance_km).sum::<f64>())
            .sum();
        assert!((total - chunked).abs() < 1e-12);

        // Every sample belongs to exactly one chunk, in order.
        let covered: usize = chunks.iter().map(|r| r.len()).sum();
        assert_eq!(covered, samples.len());
        assert_eq!(chunks.first().unwrap().start, 0);
        assert_eq!(chunks.last().unwrap().end, samples.len());
    }
}
