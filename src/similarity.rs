//! Shape similarity metric: average, over figure segments, of the minimum
//! haversine distance from sampled segment points to any route vertex
//! (§4.8). Lower is better.

use crate::transform::haversine_m;

pub const DEFAULT_N_SAMPLES: usize = 50;

/// Computes similarity between `original_figure` and `route_coords`
/// (both `(lon, lat)` sequences), in meters.
///
/// Iterates segments `i = 0..N-2` (the original figure's *last* segment is
/// excluded) — this mirrors an ambiguity in the source implementation that
/// the spec says to preserve rather than silently resolve (§9 Open
/// Questions).
pub fn similarity(original_figure: &[(f64, f64)], route_coords: &[(f64, f64)]) -> f64 {
    similarity_with_samples(original_figure, route_coords, DEFAULT_N_SAMPLES)
}

pub fn similarity_with_samples(
    original_figure: &[(f64, f64)],
    route_coords: &[(f64, f64)],
    n_samples: usize,
) -> f64 {
    if original_figure.is_empty() || route_coords.is_empty() {
        return f64::INFINITY;
    }
    if original_figure.len() < 2 {
        return f64::INFINITY;
    }

    let n_segments_total = original_figure.len() - 1;
    if n_segments_total < 2 {
        // With only one segment there is no "all but the last" remainder.
        return f64::INFINITY;
    }

    let mut total_distance = 0.0;
    let mut segment_count = 0usize;

    for i in 0..n_segments_total - 1 {
        let s = original_figure[i];
        let e = original_figure[i + 1];
        let mut min_distance = f64::INFINITY;

        for k in 0..=n_samples {
            let t = k as f64 / n_samples as f64;
            let lon = s.0 + t * (e.0 - s.0);
            let lat = s.1 + t * (e.1 - s.1);
            let orig_point = (lon, lat);

            let mut min_point_dist = f64::INFINITY;
            for &route_point in route_coords {
                let d = haversine_m(orig_point, route_point);
                if d < min_point_dist {
                    min_point_dist = d;
                }
            }

            if min_point_dist < min_distance {
                min_distance = min_point_dist;
            }
        }

        total_distance += min_distance;
        segment_count += 1;
    }

    if segment_count == 0 {
        f64::INFINITY
    } else {
        total_distance / segment_count as f64
    }
}
