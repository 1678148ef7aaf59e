//! Direction-aware waypoint selection: resamples a figure, then picks one
//! graph node per sample by blending perpendicular distance to the local
//! figure segment with alignment to its tangent direction (§4.6).

use crate::graph::{Graph, NodeId};
use crate::spatial::{full_scan_nearest, SpatialGrid};
use crate::transform::haversine_m;

const SEGMENT_SEARCH_RADIUS_M: f64 = 100.0;
const DIRECTION_PENALTY_SCALE: f64 = 50.0;
const START_NODE_SEARCH_RADIUS_M: f64 = 500.0;

pub struct WaypointConfig {
    pub n_samples: usize,
    pub use_segment_nearest: bool,
    pub use_direction: bool,
    pub direction_weight: f64,
}

impl Default for WaypointConfig {
    fn default() -> Self {
        WaypointConfig {
            n_samples: 30,
            use_segment_nearest: true,
            use_direction: true,
            direction_weight: 0.4,
        }
    }
}

/// Resamples `points` into `n_samples` evenly spaced-by-cumulative-length
/// points. `n_samples <= 1` returns the endpoints (§4.6 step 1).
pub fn sample_polyline_evenly(points: &[(f64, f64)], n_samples: usize) -> Vec<(f64, f64)> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let seg_lengths: Vec<f64> = points.windows(2).map(|w| haversine_m(w[0], w[1])).collect();
    let total_len: f64 = seg_lengths.iter().sum();
    if total_len <= 0.0 {
        return points.to_vec();
    }

    let mut cum = vec![0.0];
    for &l in &seg_lengths {
        cum.push(cum.last().unwrap() + l);
    }

    let targets: Vec<f64> = if n_samples <= 1 {
        vec![0.0, total_len]
    } else {
        let step = total_len / (n_samples - 1) as f64;
        (0..n_samples).map(|i| step * i as f64).collect()
    };

    let mut sampled = Vec::with_capacity(targets.len());
    let mut seg_idx = 0usize;
    for &t in &targets {
        while seg_idx < seg_lengths.len() - 1 && cum[seg_idx + 1] < t {
            seg_idx += 1;
        }
        let seg_start = cum[seg_idx];
        let seg_len = seg_lengths[seg_idx];
        let ratio = if seg_len <= 0.0 {
            0.0
        } else {
            ((t - seg_start) / seg_len).min(1.0)
        };

        let (lon0, lat0) = points[seg_idx];
        let (lon1, lat1) = points[seg_idx + 1];
        sampled.push((lon0 + ratio * (lon1 - lon0), lat0 + ratio * (lat1 - lat0)));
    }

    sampled
}

/// Unit tangent of the polyline at sample `i`: central difference when both
/// neighbors exist, one-sided at the ends (§4.6 step 4).
fn direction_at(sampled: &[(f64, f64)], i: usize) -> (f64, f64) {
    if sampled.len() < 2 {
        return (1.0, 0.0);
    }
    let d = if i == 0 {
        sub(sampled[1], sampled[0])
    } else if i >= sampled.len() - 1 {
        sub(sampled[sampled.len() - 1], sampled[sampled.len() - 2])
    } else {
        sub(sampled[i + 1], sampled[i - 1])
    };
    let n = (d.0 * d.0 + d.1 * d.1).sqrt();
    if n < 1e-9 {
        (1.0, 0.0)
    } else {
        (d.0 / n, d.1 / n)
    }
}

fn sub(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    (a.0 - b.0, a.1 - b.1)
}

/// Perpendicular distance (meters) from `point` to the segment
/// `[seg_start, seg_end]`, clamped to the segment (§4.6 step 4).
fn distance_point_to_segment(point: (f64, f64), seg_start: (f64, f64), seg_end: (f64, f64)) -> f64 {
    let ab = sub(seg_end, seg_start);
    let ap = sub(point, seg_start);
    let seg_len_sq = ab.0 * ab.0 + ab.1 * ab.1;
    if seg_len_sq < 1e-18 {
        return haversine_m(point, seg_start);
    }
    let t = ((ap.0 * ab.0 + ap.1 * ab.1) / seg_len_sq).clamp(0.0, 1.0);
    let closest = (seg_start.0 + t * ab.0, seg_start.1 + t * ab.1);
    haversine_m(point, closest)
}

/// Selects one graph node per resampled figure point, favoring nodes close
/// to the local figure segment and aligned with its tangent direction, then
/// anchors the sample nearest the literal start point to the node nearest
/// `start_point` (§4.6).
pub fn select_waypoints(
    graph: &Graph,
    grid: Option<&SpatialGrid>,
    start_point: (f64, f64),
    figure: &[(f64, f64)],
    config: &WaypointConfig,
) -> Option<Vec<NodeId>> {
    if figure.len() < 2 {
        return None;
    }

    let start_node = nearest_node(graph, grid, start_point, START_NODE_SEARCH_RADIUS_M)?;
    let sampled = sample_polyline_evenly(figure, config.n_samples);

    let mut waypoints: Vec<NodeId> = Vec::new();
    let mut last_node: Option<NodeId> = None;
    let mut prev_pos: Option<(f64, f64)> = None;

    for (i, &pt) in sampled.iter().enumerate() {
        if !config.use_segment_nearest {
            let node = nearest_node(graph, grid, pt, START_NODE_SEARCH_RADIUS_M)?;
            if last_node != Some(node) {
                waypoints.push(node);
                last_node = Some(node);
            }
            continue;
        }

        let (seg_start, seg_end) = if i < sampled.len() - 1 {
            (pt, sampled[i + 1])
        } else {
            (sampled[i - 1], pt)
        };

        let prev = prev_pos.unwrap_or_else(|| graph.pos(start_node));
        let direction_vec = if config.use_direction {
            Some(direction_at(&sampled, i))
        } else {
            None
        };

        let candidates: Vec<(NodeId, f64)> = match grid {
            Some(g) => g.query_radius(graph, pt, SEGMENT_SEARCH_RADIUS_M),
            None => graph.node_ids().map(|id| (id, 0.0)).collect(),
        };

        let mut best: Option<(NodeId, f64)> = None;
        for (node_id, _) in candidates {
            if Some(node_id) == last_node {
                continue;
            }
            let pos = graph.pos(node_id);
            let d = distance_point_to_segment(pos, seg_start, seg_end);

            let score = if let Some((dx_t, dy_t)) = direction_vec {
                let to_node = sub(pos, prev);
                let norm = (to_node.0 * to_node.0 + to_node.1 * to_node.1).sqrt();
                let align = if norm < 1e-9 {
                    1.0
                } else {
                    ((to_node.0 / norm) * dx_t + (to_node.1 / norm) * dy_t).clamp(-1.0, 1.0)
                };
                let penalty = DIRECTION_PENALTY_SCALE * (1.0 - align);
                d + config.direction_weight * penalty
            } else {
                d
            };

            if best.map(|(_, best_score)| score < best_score).unwrap_or(true) {
                best = Some((node_id, score));
            }
        }

        match best {
            Some((node, _)) => {
                waypoints.push(node);
                last_node = Some(node);
                prev_pos = Some(graph.pos(node));
            }
            None => {
                let node = nearest_node(graph, grid, pt, START_NODE_SEARCH_RADIUS_M)?;
                if last_node != Some(node) {
                    waypoints.push(node);
                    last_node = Some(node);
                    prev_pos = Some(graph.pos(node));
                }
            }
        }
    }

    if waypoints.is_empty() {
        return None;
    }

    // Anchor: overwrite the waypoint nearest (by planar squared distance) to
    // the literal start point with the node nearest the start point.
    let node_departure = nearest_node(graph, grid, start_point, START_NODE_SEARCH_RADIUS_M)?;
    let i_closest = (0..sampled.len())
        .min_by(|&a, &b| dist_sq(sampled[a], start_point).partial_cmp(&dist_sq(sampled[b], start_point)).unwrap())
        .unwrap_or(0);

    if i_closest < waypoints.len() {
        waypoints[i_closest] = node_departure;
    } else {
        waypoints.push(node_departure);
    }

    Some(waypoints)
}

fn dist_sq(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}

fn nearest_node(graph: &Graph, grid: Option<&SpatialGrid>, point: (f64, f64), radius_m: f64) -> Option<NodeId> {
    match grid {
        Some(g) => g.nearest(graph, point, radius_m),
        None => full_scan_nearest(graph, point),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphPreprocessor, RawGraph};

    fn grid_graph() -> Graph {
        // A coarse 5x5 grid of nodes spanning roughly 400m x 400m.
        let mut raw = RawGraph::new();
        let mut id = 1;
        let step = 0.001; // ~111m
        for i in 0..5 {
            for j in 0..5 {
                raw.add_node(id, Some((j as f64 * step, i as f64 * step)));
                id += 1;
            }
        }
        let idx = |i: i64, j: i64| -> i64 { i * 5 + j + 1 };
        for i in 0..5i64 {
            for j in 0..5i64 {
                if j + 1 < 5 {
                    raw.add_edge(idx(i, j), idx(i, j + 1), 111.0);
                }
                if i + 1 < 5 {
                    raw.add_edge(idx(i, j), idx(i + 1, j), 111.0);
                }
            }
        }
        GraphPreprocessor::normalize(&raw)
    }

    #[test]
    fn sample_single_returns_endpoints() {
        let pts = vec![(0.0, 0.0), (0.001, 0.001)];
        let sampled = sample_polyline_evenly(&pts, 1);
        assert_eq!(sampled.len(), 2);
    }

    #[test]
    fn selects_waypoints_along_a_square() {
        let g = grid_graph();
        let grid = SpatialGrid::build(&g, crate::spatial::DEFAULT_CELL_SIDE_DEG);
        let figure = vec![
            (0.0, 0.0),
            (0.003, 0.0),
            (0.003, 0.003),
            (0.0, 0.003),
            (0.0, 0.0),
        ];
        let cfg = WaypointConfig {
            n_samples: 8,
            ..Default::default()
        };
        let waypoints = select_waypoints(&g, Some(&grid), (0.0, 0.0), &figure, &cfg);
        assert!(waypoints.is_some());
        assert!(!waypoints.unwrap().is_empty());
    }
}
