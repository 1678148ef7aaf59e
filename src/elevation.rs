//! Elevation metrics collaborator (§6): a pure function over a route's
//! coordinate list plus an elevation sample per point. The core never
//! fetches elevation data itself — the caller supplies it alongside the
//! route, per spec.md §1 ("elevation lookup ... treated as a pure function
//! of a coordinate list"). Ported from
//! `original_source/app/gps_art/elevation_metrics.py`.

use serde::Serialize;

use crate::transform::haversine_m;

const MAX_GRADE_PERCENT: f64 = 99.99;
const MIN_SEGMENT_DISTANCE_M: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElevationMetrics {
    pub max_elevation_diff: i64,
    pub total_ascent: f64,
    pub total_descent: f64,
    pub total_elevation_change: f64,
    pub average_grade: f64,
    pub max_grade: f64,
}

impl Default for ElevationMetrics {
    fn default() -> Self {
        ElevationMetrics {
            max_elevation_diff: 0,
            total_ascent: 0.0,
            total_descent: 0.0,
            total_elevation_change: 0.0,
            average_grade: 0.0,
            max_grade: 0.0,
        }
    }
}

/// `coords` are `(lon, lat, elevation_m)` triples along the route, in
/// order. Grades are percent, capped at 99.99.
pub fn compute_route_elevation_metrics(coords: &[(f64, f64, f64)]) -> ElevationMetrics {
    if coords.len() < 2 {
        return ElevationMetrics::default();
    }

    let mut total_ascent = 0.0;
    let mut total_descent = 0.0;
    let mut total_elevation_change = 0.0;
    let mut grades: Vec<f64> = Vec::with_capacity(coords.len() - 1);

    for w in coords.windows(2) {
        let (lon_u, lat_u, elev_u) = w[0];
        let (lon_v, lat_v, elev_v) = w[1];
        let diff = elev_v - elev_u;
        let mut dist = haversine_m((lon_u, lat_u), (lon_v, lat_v));
        if dist < MIN_SEGMENT_DISTANCE_M {
            dist = MIN_SEGMENT_DISTANCE_M;
        }

        total_elevation_change += diff.abs();
        if diff > 0.0 {
            total_ascent += diff;
        } else {
            total_descent += diff.abs();
        }
        grades.push((diff / dist).abs() * 100.0);
    }

    let elevations: Vec<f64> = coords.iter().map(|&(_, _, e)| e).collect();
    let max_elev_diff = elevations.iter().cloned().fold(f64::MIN, f64::max)
        - elevations.iter().cloned().fold(f64::MAX, f64::min);
    let avg_grade = grades.iter().sum::<f64>() / grades.len() as f64;
    let max_grade = grades.iter().cloned().fold(f64::MIN, f64::max);

    ElevationMetrics {
        max_elevation_diff: max_elev_diff.round() as i64,
        total_ascent: round2(total_ascent),
        total_descent: round2(total_descent),
        total_elevation_change: round2(total_elevation_change),
        average_grade: round2(avg_grade.min(MAX_GRADE_PERCENT)),
        max_grade: round2(max_grade.min(MAX_GRADE_PERCENT)),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_route_has_no_grade() {
        let coords = vec![(0.0, 0.0, 10.0), (0.0, 0.001, 10.0), (0.0, 0.002, 10.0)];
        let m = compute_route_elevation_metrics(&coords);
        assert_eq!(m.total_ascent, 0.0);
        assert_eq!(m.total_descent, 0.0);
        assert_eq!(m.max_grade, 0.0);
    }

    #[test]
    fn ascent_and_descent_accumulate() {
        let coords = vec![(0.0, 0.0, 0.0), (0.0, 0.001, 10.0), (0.0, 0.002, 5.0)];
        let m = compute_route_elevation_metrics(&coords);
        assert!((m.total_ascent - 10.0).abs() < 1e-9);
        assert!((m.total_descent - 5.0).abs() < 1e-9);
        assert_eq!(m.max_elevation_diff, 10);
    }

    #[test]
    fn single_point_returns_zeroed_metrics() {
        let m = compute_route_elevation_metrics(&[(0.0, 0.0, 5.0)]);
        assert_eq!(m, ElevationMetrics::default());
    }

    #[test]
    fn grade_is_capped() {
        // Near-zero horizontal distance, large vertical -> enormous raw
        // grade, must be capped at 99.99.
        let coords = vec![(0.0, 0.0, 0.0), (0.0, 0.0, 1000.0)];
        let m = compute_route_elevation_metrics(&coords);
        assert_eq!(m.max_grade, 99.99);
        assert_eq!(m.average_grade, 99.99);
    }
}
