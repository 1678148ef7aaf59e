//! Pure geometric transforms on `(lon, lat)` point sequences: translate,
//! rotate about a geographic center, and scale to a target length (§4.5).

const EARTH_RADIUS_M: f64 = 6_371_000.0;
const KM_PER_DEG_LAT: f64 = 111.0;

/// Great-circle distance in meters between two `(lon, lat)` points.
pub fn haversine_m(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lon1, lat1) = a;
    let (lon2, lat2) = b;
    let (lon1, lat1, lon2, lat2) = (
        lon1.to_radians(),
        lat1.to_radians(),
        lon2.to_radians(),
        lat2.to_radians(),
    );
    let dlon = lon2 - lon1;
    let dlat = lat2 - lat1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_M * c
}

/// Sum of pairwise haversine distances along a polyline, in meters.
pub fn polyline_length_m(points: &[(f64, f64)]) -> f64 {
    points.windows(2).map(|w| haversine_m(w[0], w[1])).sum()
}

/// Translates every point by `(dx, dy)` in degrees.
pub fn translate(points: &[(f64, f64)], delta: (f64, f64)) -> Vec<(f64, f64)> {
    let (dx, dy) = delta;
    points.iter().map(|&(lon, lat)| (lon + dx, lat + dy)).collect()
}

/// Rotates points by `angle_degrees` (counter-clockwise positive) about a
/// geographic `center`, via a local km-projection to avoid anisotropic
/// stretching near the poles (§4.5).
pub fn rotate(points: &[(f64, f64)], center: (f64, f64), angle_degrees: f64) -> Vec<(f64, f64)> {
    if points.is_empty() {
        return Vec::new();
    }

    let angle_rad = angle_degrees.to_radians();
    let (cos_a, sin_a) = (angle_rad.cos(), angle_rad.sin());
    let (center_lon, center_lat) = center;

    let lat_scale = KM_PER_DEG_LAT;
    let lon_scale = KM_PER_DEG_LAT * center_lat.to_radians().cos();

    points
        .iter()
        .map(|&(lon, lat)| {
            let dx = (lon - center_lon) * lon_scale;
            let dy = (lat - center_lat) * lat_scale;

            let dx_rot = dx * cos_a - dy * sin_a;
            let dy_rot = dx * sin_a + dy * cos_a;

            let new_lon = if lon_scale.abs() > 1e-12 {
                center_lon + dx_rot / lon_scale
            } else {
                center_lon
            };
            let new_lat = center_lat + dy_rot / lat_scale;

            (new_lon, new_lat)
        })
        .collect()
}

/// Scales the polyline's offsets from `start_point` so its haversine length
/// matches `target_distance_m`. A no-op when the current length is below
/// `1e-6` m (§4.5).
pub fn scale(points: &[(f64, f64)], start_point: (f64, f64), target_distance_m: f64) -> Vec<(f64, f64)> {
    let current = polyline_length_m(points);
    if current < 1e-6 {
        return points.to_vec();
    }
    let ratio = target_distance_m / current;
    let (start_lon, start_lat) = start_point;

    points
        .iter()
        .map(|&(lon, lat)| {
            (
                start_lon + (lon - start_lon) * ratio,
                start_lat + (lat - start_lat) * ratio,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq_points(a: &[(f64, f64)], b: &[(f64, f64)], eps: f64) {
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(b) {
            assert!((p.0 - q.0).abs() < eps, "{:?} vs {:?}", p, q);
            assert!((p.1 - q.1).abs() < eps, "{:?} vs {:?}", p, q);
        }
    }

    #[test]
    fn translate_round_trip() {
        let pts = vec![(127.0, 37.5), (127.01, 37.51)];
        let delta = (0.01, -0.003);
        let forward = translate(&pts, delta);
        let back = translate(&forward, (-delta.0, -delta.1));
        approx_eq_points(&pts, &back, 1e-12);
    }

    #[test]
    fn rotate_round_trip() {
        let pts = vec![(127.0, 37.5), (127.02, 37.52), (126.99, 37.49)];
        let center = (127.0, 37.5);
        let forward = rotate(&pts, center, 37.0);
        let back = rotate(&forward, center, -37.0);
        approx_eq_points(&pts, &back, 1e-9);
    }

    #[test]
    fn rotate_guards_against_pole_cosine() {
        let pts = vec![(0.0, 89.999), (0.001, 89.9991)];
        let rotated = rotate(&pts, (0.0, 90.0), 45.0);
        for (lon, lat) in rotated {
            assert!(lon.is_finite());
            assert!(lat.is_finite());
        }
    }

    #[test]
    fn scale_is_idempotent_at_target_length() {
        let pts = vec![(127.0, 37.5), (127.01, 37.51), (127.02, 37.49)];
        let start = pts[0];
        let current = polyline_length_m(&pts);
        let scaled = scale(&pts, start, current);
        approx_eq_points(&pts, &scaled, 1e-6);
    }

    #[test]
    fn scale_leaves_degenerate_polyline_unchanged() {
        let pts = vec![(127.0, 37.5), (127.0, 37.5)];
        let scaled = scale(&pts, pts[0], 5000.0);
        assert_eq!(scaled, pts);
    }
}
