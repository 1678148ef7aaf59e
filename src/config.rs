//! Tunables for a single `generate_routes` call, bundled so defaults live
//! in one place instead of scattered through the pipeline (§9 ambient
//! stack: configuration).

#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Side length of a spatial grid cell, in degrees (§4.3).
    pub grid_cell_side_deg: f64,
    /// Number of evenly spaced samples taken along the figure before
    /// waypoint selection (§4.6).
    pub n_waypoint_samples: usize,
    /// Weight blending direction-alignment penalty into the segment
    /// distance score during waypoint selection (§4.6).
    pub direction_weight: f64,
    /// Fraction of the user's requested target distance actually aimed
    /// for, since routes following road geometry tend to overshoot a
    /// straight-line scale target (§4.9).
    pub undershoot_factor: f64,
    /// Number of cyclic-start placements (`k` in the `k x theta` search)
    /// tried per rotation angle (§4.9).
    pub n_placements: usize,
    /// Rotation angles swept during candidate evaluation, in degrees.
    /// Defaults to `[-180, -170, ..., 170]`, matching the original's
    /// `range(-180, 180, 10)` (`generate_routes.py`).
    pub rotation_angles_deg: Vec<f64>,
    /// Sample count used by the similarity metric (§4.8).
    pub similarity_samples: usize,
    /// Upper bound on concurrent candidate-evaluation workers.
    pub max_workers: usize,
    /// Number of top candidates returned to the caller (§4.9/§6).
    pub top_n: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            grid_cell_side_deg: crate::spatial::DEFAULT_CELL_SIDE_DEG,
            n_waypoint_samples: 30,
            direction_weight: 0.4,
            undershoot_factor: 0.80,
            n_placements: 30,
            rotation_angles_deg: (-180..180).step_by(10).map(|a| a as f64).collect(),
            similarity_samples: crate::similarity::DEFAULT_N_SAMPLES,
            max_workers: 8,
            top_n: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = GenerateConfig::default();
        assert_eq!(cfg.n_placements, 30);
        assert!((cfg.undershoot_factor - 0.80).abs() < 1e-9);
        assert_eq!(cfg.top_n, 3);
        assert_eq!(cfg.rotation_angles_deg.len(), 36);
        assert_eq!(cfg.rotation_angles_deg.first(), Some(&-180.0));
        assert_eq!(cfg.rotation_angles_deg.last(), Some(&170.0));
    }
}
