//! Parallel `(placement, rotation)` candidate search and ranking (§4.9).
//!
//! Mirrors the teacher's `routing_batch`: a `rayon` fan-out over an
//! independent task per work item, each closing over immutable shared state
//! (`&Graph`, `&SpatialGrid`, the figure, the config) with no `Mutex` —
//! nothing here mutates a shared cache the way the teacher's FFI-level
//! router global does.

use rayon::prelude::*;

use crate::astar::{build_full_path, compute_segment_paths};
use crate::config::GenerateConfig;
use crate::graph::{Graph, NodeId};
use crate::progress::{ProgressSink, ThresholdProgress};
use crate::similarity::similarity_with_samples;
use crate::spatial::SpatialGrid;
use crate::transform::{rotate, scale, translate};
use crate::waypoints::{sample_polyline_evenly, select_waypoints, WaypointConfig};

/// A single evaluated `(placement, rotation)` attempt: the stitched route
/// through the road graph that best matched the scaled, rotated figure
/// placed at sample `placement_k`, over every cyclic ring start.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: usize,
    pub placement_k: usize,
    pub rotation_theta_deg: f64,
    pub start_index: usize,
    pub path: Vec<NodeId>,
    pub route_coords: Vec<(f64, f64)>,
    pub scaled_figure: Vec<(f64, f64)>,
    pub length_m: f64,
    pub similarity_m: f64,
}

/// Evaluates the full `(k, theta)` grid of candidates against a fixed road
/// graph and starting point (§4.9).
pub struct CandidateEvaluator<'a> {
    graph: &'a Graph,
    grid: Option<&'a SpatialGrid>,
    start_point: (f64, f64),
    config: &'a GenerateConfig,
}

impl<'a> CandidateEvaluator<'a> {
    pub fn new(
        graph: &'a Graph,
        grid: Option<&'a SpatialGrid>,
        start_point: (f64, f64),
        config: &'a GenerateConfig,
    ) -> Self {
        CandidateEvaluator {
            graph,
            grid,
            start_point,
            config,
        }
    }

    /// Runs every `(placement, rotation)` pair, each placing `figure` so one
    /// of `n_placements` evenly spaced figure samples lands on `start_point`,
    /// rotating by each configured angle, and scaling to
    /// `target_distance_km * undershoot_factor`. Failed placements (no
    /// waypoints found, an unreachable segment) are silently dropped — the
    /// caller sees this as a shorter-than-expected candidate list rather than
    /// a hard error (§7).
    pub fn evaluate(
        &self,
        figure: &[(f64, f64)],
        target_distance_km: f64,
        mut progress: Option<&mut dyn ProgressSink>,
    ) -> Vec<Candidate> {
        if figure.len() < 2 {
            return Vec::new();
        }

        let placement_samples = sample_polyline_evenly(figure, self.config.n_placements);
        let target_m = target_distance_km * 1000.0 * self.config.undershoot_factor;

        let tasks: Vec<(usize, f64)> = (0..placement_samples.len())
            .flat_map(|k| {
                self.config
                    .rotation_angles_deg
                    .iter()
                    .map(move |&theta| (k, theta))
            })
            .collect();
        let total = tasks.len();

        let results: Vec<Option<Candidate>> = tasks
            .into_par_iter()
            .map(|(k, theta)| self.evaluate_one(figure, &placement_samples, k, theta, target_m))
            .collect();

        let mut thresholded = progress.as_deref_mut().map(ThresholdProgress::new);

        let mut completed = 0usize;
        let mut candidates = Vec::new();
        for result in results {
            completed += 1;
            if let Some(t) = thresholded.as_mut() {
                let percent = (5 + (completed * 90) / total.max(1)).min(95) as u8;
                t.report(percent, &format!("evaluated candidate {completed}/{total}"));
            }
            if let Some(c) = result {
                candidates.push(c);
            }
        }

        candidates
    }

    fn evaluate_one(
        &self,
        figure: &[(f64, f64)],
        placement_samples: &[(f64, f64)],
        k: usize,
        theta: f64,
        target_m: f64,
    ) -> Option<Candidate> {
        let anchor = placement_samples[k];
        let delta = (self.start_point.0 - anchor.0, self.start_point.1 - anchor.1);
        let translated = translate(figure, delta);
        let rotated = rotate(&translated, self.start_point, theta);
        let scaled = scale(&rotated, self.start_point, target_m);

        let waypoint_config = WaypointConfig {
            n_samples: self.config.n_waypoint_samples,
            use_segment_nearest: true,
            use_direction: true,
            direction_weight: self.config.direction_weight,
        };
        let waypoints = select_waypoints(self.graph, self.grid, self.start_point, &scaled, &waypoint_config)?;
        if waypoints.len() < 2 {
            return None;
        }

        let segment_paths = compute_segment_paths(self.graph, &waypoints)?;
        let n = waypoints.len();

        let mut best: Option<(usize, Vec<NodeId>, f64, f64)> = None;
        for s in 0..n {
            let path = build_full_path(&waypoints, &segment_paths, s)?;
            let route_coords: Vec<(f64, f64)> = path.iter().map(|&id| self.graph.pos(id)).collect();
            let length_m: f64 = path
                .windows(2)
                .filter_map(|w| self.graph.edge_length(w[0], w[1]))
                .sum();
            let sim = similarity_with_samples(&scaled, &route_coords, self.config.similarity_samples);

            let is_better = match &best {
                Some((_, _, _, best_sim)) => sim < *best_sim,
                None => true,
            };
            if is_better {
                best = Some((s, path, length_m, sim));
            }
        }

        let (start_index, path, length_m, similarity_m) = best?;
        let route_coords: Vec<(f64, f64)> = path.iter().map(|&id| self.graph.pos(id)).collect();

        Some(Candidate {
            id: 0,
            placement_k: k,
            rotation_theta_deg: theta,
            start_index,
            path,
            route_coords,
            scaled_figure: scaled,
            length_m,
            similarity_m,
        })
    }
}

/// Selects the top-scoring candidates by ascending similarity (lower is
/// better) and assigns them stable 1-based ids (§4.9, §6).
pub struct Ranker;

impl Ranker {
    pub fn rank(mut candidates: Vec<Candidate>, top_n: usize) -> Vec<Candidate> {
        candidates.sort_by(|a, b| a.similarity_m.partial_cmp(&b.similarity_m).unwrap());
        candidates.truncate(top_n);
        for (i, c) in candidates.iter_mut().enumerate() {
            c.id = i + 1;
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphPreprocessor, RawGraph};

    fn grid_graph() -> Graph {
        let mut raw = RawGraph::new();
        let mut id = 1;
        let step = 0.001;
        for i in 0..6 {
            for j in 0..6 {
                raw.add_node(id, Some((j as f64 * step, i as f64 * step)));
                id += 1;
            }
        }
        let idx = |i: i64, j: i64| -> i64 { i * 6 + j + 1 };
        for i in 0..6i64 {
            for j in 0..6i64 {
                if j + 1 < 6 {
                    raw.add_edge(idx(i, j), idx(i, j + 1), 111.0);
                }
                if i + 1 < 6 {
                    raw.add_edge(idx(i, j), idx(i + 1, j), 111.0);
                }
            }
        }
        GraphPreprocessor::normalize(&raw)
    }

    #[test]
    fn evaluates_a_small_square_figure_end_to_end() {
        let g = grid_graph();
        let grid = SpatialGrid::build(&g, crate::spatial::DEFAULT_CELL_SIDE_DEG);
        let figure = vec![
            (0.0, 0.0),
            (0.003, 0.0),
            (0.003, 0.003),
            (0.0, 0.003),
            (0.0, 0.0),
        ];
        let config = GenerateConfig {
            n_placements: 2,
            rotation_angles_deg: vec![0.0, 90.0],
            n_waypoint_samples: 8,
            ..Default::default()
        };

        let evaluator = CandidateEvaluator::new(&g, Some(&grid), (0.0, 0.0), &config);
        let candidates = evaluator.evaluate(&figure, 1.2, None);

        assert!(!candidates.is_empty());
        for c in &candidates {
            assert!(c.path.len() >= 2);
            assert!(c.length_m > 0.0);
        }

        let ranked = Ranker::rank(candidates, 3);
        assert!(ranked.len() <= 3);
        for w in ranked.windows(2) {
            assert!(w[0].similarity_m <= w[1].similarity_m);
        }
        if !ranked.is_empty() {
            assert_eq!(ranked[0].id, 1);
        }
    }

    #[test]
    fn degenerate_figure_yields_no_candidates() {
        let g = grid_graph();
        let config = GenerateConfig::default();
        let evaluator = CandidateEvaluator::new(&g, None, (0.0, 0.0), &config);
        let candidates = evaluator.evaluate(&[(0.0, 0.0)], 1.0, None);
        assert!(candidates.is_empty());
    }
}
