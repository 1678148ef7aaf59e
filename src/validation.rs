//! Distance validation collaborator (§4.10): checks whether a target
//! distance is sufficient to draw the figure at all.

use serde::Serialize;

const DEFAULT_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct DistanceValidation {
    pub is_valid: bool,
    pub minimum_distance_m: f64,
    pub minimum_distance_km: f64,
    pub target_distance_m: f64,
    pub target_distance_km: f64,
    pub shortage_m: Option<f64>,
    pub shortage_km: Option<f64>,
    pub message: String,
    pub options: Vec<String>,
}

/// `is_valid = target >= minimum * (1 - tolerance)`; when invalid, surfaces
/// a shortage plus a fixed set of advisory options, per §4.10.
pub fn validate_target_distance(minimum_distance_m: f64, target_distance_m: f64) -> DistanceValidation {
    validate_target_distance_with_tolerance(minimum_distance_m, target_distance_m, DEFAULT_TOLERANCE)
}

pub fn validate_target_distance_with_tolerance(
    minimum_distance_m: f64,
    target_distance_m: f64,
    tolerance: f64,
) -> DistanceValidation {
    let minimum_distance_km = minimum_distance_m / 1000.0;
    let target_distance_km = target_distance_m / 1000.0;

    let threshold = minimum_distance_m * (1.0 - tolerance);
    let is_valid = target_distance_m >= threshold;

    if is_valid {
        DistanceValidation {
            is_valid,
            minimum_distance_m,
            minimum_distance_km,
            target_distance_m,
            target_distance_km,
            shortage_m: None,
            shortage_km: None,
            message: format!(
                "target distance {target_distance_km:.2}km is sufficient (minimum: {minimum_distance_km:.2}km)"
            ),
            options: Vec::new(),
        }
    } else {
        let shortage_m = minimum_distance_m - target_distance_m;
        let shortage_km = shortage_m / 1000.0;
        DistanceValidation {
            is_valid,
            minimum_distance_m,
            minimum_distance_km,
            target_distance_m,
            target_distance_km,
            shortage_m: Some(shortage_m),
            shortage_km: Some(shortage_km),
            message: format!(
                "target distance {target_distance_km:.2}km is insufficient; drawing this figure needs at least {minimum_distance_km:.2}km (shortage: {shortage_km:.2}km)"
            ),
            options: vec![
                format!("increase target distance to at least {minimum_distance_km:.2}km"),
                "simplify the figure".to_string(),
                "add a loop to the route (shape may change slightly)".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_when_target_within_tolerance() {
        let v = validate_target_distance(1000.0, 600.0);
        assert!(v.is_valid);
        assert!(v.shortage_m.is_none());
    }

    #[test]
    fn invalid_below_tolerance_reports_three_options() {
        let v = validate_target_distance(1000.0, 50.0);
        assert!(!v.is_valid);
        assert_eq!(v.options.len(), 3);
        assert!((v.shortage_km.unwrap() - 0.95).abs() < 1e-9);
    }

    #[test]
    fn zero_minimum_distance_is_always_valid() {
        let v = validate_target_distance(0.0, 0.0);
        assert!(v.is_valid);
    }
}
