//! A* stitching between graph nodes, and assembly of a full loop path from
//! an ordered waypoint ring (§4.7).

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::graph::{Graph, NodeId};
use crate::transform::haversine_m;

#[derive(Clone, Copy, PartialEq)]
struct Frontier {
    f: f64,
    node: NodeId,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse to get the lowest f first.
        other.f.partial_cmp(&self.f).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path from `start` to `goal` by edge `length` (meters), using a
/// haversine-meters heuristic to stay admissible with that cost metric —
/// the spec leaves the g/h metric choice open (§9) and recommends exactly
/// this pairing. Returns `Some([start])` when `start == goal`, `None` when
/// unreachable.
pub fn astar(graph: &Graph, start: NodeId, goal: NodeId) -> Option<Vec<NodeId>> {
    if start == goal {
        return Some(vec![start]);
    }

    let goal_pos = graph.pos(goal);

    let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();
    let mut cost_so_far: HashMap<NodeId, f64> = HashMap::new();
    let mut frontier = BinaryHeap::new();

    cost_so_far.insert(start, 0.0);
    frontier.push(Frontier { f: 0.0, node: start });

    while let Some(Frontier { node: current, .. }) = frontier.pop() {
        if current == goal {
            return Some(reconstruct(&came_from, start, goal));
        }

        let current_cost = cost_so_far[&current];
        for &(neighbor, edge_len) in graph.neighbors(current) {
            let new_cost = current_cost + edge_len;
            let better = match cost_so_far.get(&neighbor) {
                Some(&existing) => new_cost < existing,
                None => true,
            };
            if better {
                cost_so_far.insert(neighbor, new_cost);
                let h = haversine_m(graph.pos(neighbor), goal_pos);
                frontier.push(Frontier {
                    f: new_cost + h,
                    node: neighbor,
                });
                came_from.insert(neighbor, current);
            }
        }
    }

    None
}

fn reconstruct(came_from: &HashMap<NodeId, NodeId>, start: NodeId, goal: NodeId) -> Vec<NodeId> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = came_from[&current];
        path.push(current);
    }
    path.reverse();
    path
}

/// Precomputes the A* path between each consecutive pair of `waypoints`
/// (not yet cyclically shifted). One A* call per segment; `build_full_path`
/// reuses these regardless of which `start_index` is requested.
pub fn compute_segment_paths(graph: &Graph, waypoints: &[NodeId]) -> Option<Vec<Vec<NodeId>>> {
    if waypoints.len() < 2 {
        return None;
    }
    let mut segments = Vec::with_capacity(waypoints.len());
    for w in waypoints.windows(2) {
        segments.push(astar(graph, w[0], w[1])?);
    }
    // Closing segment back to the first waypoint, so any cyclic start works.
    segments.push(astar(graph, waypoints[waypoints.len() - 1], waypoints[0])?);
    Some(segments)
}

/// Cyclically shifts `waypoints` so `start_index mod n` is first, then
/// stitches the precomputed segment paths for that ring order, suppressing
/// the duplicated join node between consecutive segments (§4.7).
///
/// `segment_paths[i]` is the A* path `waypoints[i] -> waypoints[(i+1) % n]`;
/// since that invariant holds for every `i` regardless of where the ring is
/// opened, walking `n` segments starting at `start_index` always produces a
/// connected path — no per-start-index A* recomputation is needed.
pub fn build_full_path(
    waypoints: &[NodeId],
    segment_paths: &[Vec<NodeId>],
    start_index: usize,
) -> Option<Vec<NodeId>> {
    let n = waypoints.len();
    if n == 0 || segment_paths.len() != n {
        return None;
    }
    let start_index = start_index % n;

    let mut full_path: Vec<NodeId> = Vec::new();
    for offset in 0..n {
        let seg_idx = (start_index + offset) % n;
        let sub_path = &segment_paths[seg_idx];
        if full_path.last() == sub_path.first() {
            full_path.extend(sub_path.iter().skip(1));
        } else {
            full_path.extend(sub_path.iter().copied());
        }
    }

    Some(full_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphPreprocessor, RawGraph};

    fn line_graph() -> Graph {
        let mut raw = RawGraph::new();
        raw.add_node(1, Some((0.0, 0.0)));
        raw.add_node(2, Some((0.0, 0.001)));
        raw.add_node(3, Some((0.0, 0.002)));
        raw.add_edge(1, 2, 100.0);
        raw.add_edge(2, 3, 100.0);
        // Prevent degree-2 compression of node 2 by adding a branch off it.
        raw.add_node(4, Some((0.001, 0.001)));
        raw.add_edge(2, 4, 50.0);
        GraphPreprocessor::normalize(&raw)
    }

    #[test]
    fn start_equals_goal_returns_single_node() {
        let g = line_graph();
        let start = g.node_ids().next().unwrap();
        assert_eq!(astar(&g, start, start), Some(vec![start]));
    }

    #[test]
    fn finds_reachable_path() {
        let g = line_graph();
        let ids: Vec<_> = g.node_ids().collect();
        let path = astar(&g, ids[0], ids[ids.len() - 1]);
        assert!(path.is_some());
        let path = path.unwrap();
        assert_eq!(*path.first().unwrap(), ids[0]);
    }

    #[test]
    fn unreachable_goal_returns_none() {
        let mut raw = RawGraph::new();
        raw.add_node(1, Some((0.0, 0.0)));
        raw.add_node(2, Some((10.0, 10.0)));
        // No edges at all -> both nodes are isolates and get dropped, so
        // build a second disconnected component instead.
        raw.add_node(3, Some((0.0, 0.001)));
        raw.add_edge(1, 3, 50.0);
        raw.add_node(4, Some((10.0, 10.001)));
        raw.add_edge(2, 4, 50.0);
        let g = GraphPreprocessor::normalize(&raw);
        let ids: Vec<_> = g.node_ids().collect();
        // node for id=1 (component A) vs node for id=2 (component B)
        let a = ids.iter().find(|&&id| g.pos(id) == (0.0, 0.0)).copied().unwrap();
        let b = ids.iter().find(|&&id| g.pos(id) == (10.0, 10.0)).copied().unwrap();
        assert_eq!(astar(&g, a, b), None);
    }

    fn square_cycle_graph() -> Graph {
        let mut raw = RawGraph::new();
        raw.add_node(1, Some((0.0, 0.0)));
        raw.add_node(2, Some((0.001, 0.0)));
        raw.add_node(3, Some((0.001, 0.001)));
        raw.add_node(4, Some((0.0, 0.001)));
        raw.add_edge(1, 2, 100.0);
        raw.add_edge(2, 3, 100.0);
        raw.add_edge(3, 4, 100.0);
        raw.add_edge(4, 1, 100.0);
        GraphPreprocessor::normalize(&raw)
    }

    #[test]
    fn build_full_path_stitches_ring_regardless_of_start_index() {
        let g = square_cycle_graph();
        let waypoints: Vec<NodeId> = g.node_ids().collect();
        let segments = compute_segment_paths(&g, &waypoints).unwrap();
        assert_eq!(segments.len(), waypoints.len());

        for start in 0..waypoints.len() {
            let full = build_full_path(&waypoints, &segments, start).unwrap();
            // consecutive nodes in the stitched path must be real edges
            for w in full.windows(2) {
                assert!(g.has_edge(w[0], w[1]));
            }
        }
    }
}
