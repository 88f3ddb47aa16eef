// src/features.rs
//
// Feature engineering over the cleansed sequence. Pure functions of the
// input; no state crosses between samples beyond the defined windows.

use crate::rolling::centered_median;
use crate::types::{CleanSample, EnrichedSample};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two fixes via the Haversine formula, km.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Derive `acceleration_magnitude` and `distance_km` for each sample.
///
/// Each axis is median-smoothed over a centered window before combining,
/// so single-sample sensor spikes never reach the magnitude. Distances
/// that come out NaN or infinite (degenerate coincident fixes) are
/// replaced with 0.
pub fn enrich(samples: &[CleanSample], median_window: usize) -> Vec<EnrichedSample> {
    let ax: Vec<f64> = samples.iter().map(|s| s.ax).collect();
    let ay: Vec<f64> = samples.iter().map(|s| s.ay).collect();
    let az: Vec<f64> = samples.iter().map(|s| s.az).collect();

    let ax_smooth = centered_median(&ax, median_window);
    let ay_smooth = centered_median(&ay, median_window);
    let az_smooth = centered_median(&az, median_window);

    samples
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let magnitude =
                (ax_smooth[i].powi(2) + ay_smooth[i].powi(2) + az_smooth[i].powi(2)).sqrt();

            let distance = if i == 0 {
                0.0
            } else {
                let prev = &samples[i - 1];
                let d = haversine_km(prev.latitude, prev.longitude, s.latitude, s.longitude);
                if d.is_finite() {
                    d
                } else {
                    0.0
                }
            };

            EnrichedSample {
                index: s.index,
                time: s.time,
                latitude: s.latitude,
                longitude: s.longitude,
                speed: s.speed,
                ax: s.ax,
                ay: s.ay,
                az: s.az,
                yaw: s.yaw,
                acceleration_magnitude: magnitude,
                distance_km: distance,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn clean(index: u32, latitude: f64, longitude: f64, ax: f64) -> CleanSample {
        CleanSample {
            index,
            time: NaiveTime::from_hms_opt(12, 0, index % 60).unwrap(),
            latitude,
            longitude,
            speed: 50.0,
            ax,
            ay: 0.0,
            az: 0.0,
            yaw: 0.0,
        }
    }

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        // pi * 6371 / 180
        assert!((d - 111.195).abs() < 0.01);
    }

    #[test]
    fn test_haversine_coincident_points() {
        assert_eq!(haversine_km(21.5, 39.2, 21.5, 39.2), 0.0);
    }

    #[test]
    fn test_first_sample_distance_is_zero() {
        let samples = vec![clean(1, 21.5, 39.2, 0.0), clean(2, 21.5001, 39.2, 0.0)];
        let enriched = enrich(&samples, 5);
        assert_eq!(enriched[0].distance_km, 0.0);
        assert!(enriched[1].distance_km > 0.0);
    }

    #[test]
    fn test_median_smoothing_suppresses_spike() {
        let samples: Vec<CleanSample> = (0..7)
            .map(|i| clean(i + 1, 21.5, 39.2, if i == 3 { -2500.0 } else { 0.0 }))
            .collect();
        let enriched = enrich(&samples, 5);
        // The lone Ax spike disappears under the 5-sample median, so the
        // magnitude stays flat; the raw Ax is preserved for the classifier.
        assert!(enriched.iter().all(|s| s.acceleration_magnitude == 0.0));
        assert_eq!(enriched[3].ax, -2500.0);
    }

    #[test]
    fn test_magnitude_of_steady_acceleration() {
        let samples: Vec<CleanSample> = (0..5)
            .map(|i| {
                let mut s = clean(i + 1, 21.5, 39.2, 300.0);
                s.ay = 400.0;
                s
            })
            .collect();
        let enriched = enrich(&samples, 5);
        assert!((enriched[2].acceleration_magnitude - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_distances_sum_matches_total_path() {
        let samples: Vec<CleanSample> = (0..4)
            .map(|i| clean(i + 1, 21.5 + f64::from(i) * 0.001, 39.2, 0.0))
            .collect();
        let enriched = enrich(&samples, 5);
        let total: f64 = enriched.iter().map(|s| s.distance_km).sum();
        let direct = haversine_km(21.5, 39.2, 21.503, 39.2);
        assert!((total - direct).abs() < 1e-9);
    }
}
