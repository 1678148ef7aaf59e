//! Road-network graph: arena-indexed nodes + adjacency, undirected simple
//! graph, and the preprocessing sweep that collapses a raw ingest into it.

use std::collections::HashMap;

/// Stable index into a [`Graph`]'s node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Undirected simple graph: node positions plus a symmetric adjacency list.
///
/// Nodes are stored in an arena (`Vec`) and referenced by [`NodeId`], per the
/// spec's note that cyclic references never arise here (§9) and that integer
/// indices over an adjacency array are strictly preferable for cache
/// locality, matching the teacher's `node_positions: Vec<(f64, f64)>` +
/// `AdjList = Vec<Vec<(usize, u32)>>` shape (generalized from milliseconds to
/// meters since no travel-time is modeled here).
#[derive(Debug, Clone)]
pub struct Graph {
    positions: Vec<(f64, f64)>,
    adjacency: Vec<Vec<(NodeId, f64)>>,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn pos(&self, id: NodeId) -> (f64, f64) {
        self.positions[id.idx()]
    }

    pub fn neighbors(&self, id: NodeId) -> &[(NodeId, f64)] {
        &self.adjacency[id.idx()]
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.adjacency[id.idx()].len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.positions.len() as u32).map(NodeId)
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency[a.idx()].iter().any(|&(n, _)| n == b)
    }

    /// Length of the direct edge `a`-`b`, if one exists.
    pub fn edge_length(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.adjacency[a.idx()]
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, len)| len)
    }
}

/// Raw ingest: positions keyed by an external (e.g. OSM) node id, and a
/// directed edge list with per-edge lengths in meters. Edges may repeat an
/// unordered pair multiple times (parallel directed edges, round-trip
/// `oneway=no` duplication) — [`GraphPreprocessor::normalize`] collapses
/// these into a simple undirected graph.
#[derive(Debug, Default)]
pub struct RawGraph {
    /// `None` marks a node seen in edges but missing one of x/y — dropped
    /// during normalization per spec §4.2 step 2.
    pub nodes: HashMap<i64, Option<(f64, f64)>>,
    pub edges: Vec<(i64, i64, f64)>,
}

impl RawGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: i64, pos: Option<(f64, f64)>) {
        self.nodes.entry(id).or_insert(pos);
    }

    pub fn add_edge(&mut self, from: i64, to: i64, length_m: f64) {
        self.edges.push((from, to, length_m));
    }
}

/// Normalizes a raw ingest into the undirected, degree-2-compressed [`Graph`]
/// the rest of the pipeline operates on.
pub struct GraphPreprocessor;

impl GraphPreprocessor {
    /// §4.2: collapse the directed multigraph, drop nodes without a
    /// position, remove isolates, then compress degree-2 chains to a fixed
    /// point.
    pub fn normalize(raw: &RawGraph) -> Graph {
        // Step 1: collapse directed multigraph into unordered-pair -> shortest length.
        let mut simple: HashMap<(i64, i64), f64> = HashMap::new();
        for &(from, to, length) in &raw.edges {
            if from == to {
                continue;
            }
            let has_from_pos = matches!(raw.nodes.get(&from), Some(Some(_)));
            let has_to_pos = matches!(raw.nodes.get(&to), Some(Some(_)));
            if !has_from_pos || !has_to_pos {
                continue;
            }
            let key = if from < to { (from, to) } else { (to, from) };
            simple
                .entry(key)
                .and_modify(|existing| {
                    if length < *existing {
                        *existing = length;
                    }
                })
                .or_insert(length);
        }

        // Working adjacency keyed by external id, for chain compression.
        let mut adj: HashMap<i64, Vec<(i64, f64)>> = HashMap::new();
        for (&(a, b), &len) in &simple {
            adj.entry(a).or_default().push((b, len));
            adj.entry(b).or_default().push((a, len));
        }

        // Step 3: isolates never entered `adj` at all (no surviving edge).

        // Step 4: chain compression to a fixed point.
        compress_degree_2_chains(&mut adj);

        // Compact into a contiguous arena.
        let mut ids: Vec<i64> = adj.keys().copied().collect();
        ids.sort_unstable();
        let mut index_of: HashMap<i64, NodeId> = HashMap::with_capacity(ids.len());
        for (i, &ext_id) in ids.iter().enumerate() {
            index_of.insert(ext_id, NodeId(i as u32));
        }

        let mut positions = Vec::with_capacity(ids.len());
        let mut adjacency = Vec::with_capacity(ids.len());
        for &ext_id in &ids {
            let pos = raw
                .nodes
                .get(&ext_id)
                .and_then(|p| *p)
                .expect("node present in adjacency must have a position");
            positions.push(pos);
            let neighbors = adj
                .get(&ext_id)
                .map(|ns| {
                    ns.iter()
                        .map(|&(n, len)| (index_of[&n], len))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            adjacency.push(neighbors);
        }

        Graph {
            positions,
            adjacency,
        }
    }
}

/// Iteratively replaces degree-2 node runs with a single merged edge,
/// skipping a node whenever its two neighbors are already directly
/// connected (would create a duplicate edge). Reaches a fixed point when a
/// full sweep removes zero nodes.
fn compress_degree_2_chains(adj: &mut HashMap<i64, Vec<(i64, f64)>>) {
    loop {
        let mut removed_any = false;
        let candidates: Vec<i64> = adj.keys().copied().collect();

        for node in candidates {
            let neighbors = match adj.get(&node) {
                Some(ns) if ns.len() == 2 => ns.clone(),
                _ => continue,
            };
            let (u, len_u) = neighbors[0];
            let (v, len_v) = neighbors[1];
            if u == v {
                continue;
            }
            let u_v_exists = adj.get(&u).map(|ns| ns.iter().any(|&(n, _)| n == v));
            if u_v_exists == Some(true) {
                continue;
            }

            let new_length = len_u + len_v;

            remove_directed(adj, u, node);
            remove_directed(adj, v, node);
            adj.remove(&node);

            adj.entry(u).or_default().push((v, new_length));
            adj.entry(v).or_default().push((u, new_length));

            removed_any = true;
        }

        if !removed_any {
            break;
        }
    }
}

fn remove_directed(adj: &mut HashMap<i64, Vec<(i64, f64)>>, from: i64, to: i64) {
    if let Some(list) = adj.get_mut(&from) {
        list.retain(|&(n, _)| n != to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_nodes_without_position() {
        let mut raw = RawGraph::new();
        raw.add_node(1, Some((0.0, 0.0)));
        raw.add_node(2, None);
        raw.add_edge(1, 2, 10.0);

        let g = GraphPreprocessor::normalize(&raw);
        assert_eq!(g.node_count(), 0);
    }

    #[test]
    fn removes_isolates() {
        let mut raw = RawGraph::new();
        raw.add_node(1, Some((0.0, 0.0)));
        raw.add_node(2, Some((0.0, 0.0001)));
        raw.add_node(3, Some((0.0, 0.0002))); // isolated, no edges
        raw.add_edge(1, 2, 10.0);

        let g = GraphPreprocessor::normalize(&raw);
        assert_eq!(g.node_count(), 2);
        for id in g.node_ids() {
            assert!(g.degree(id) >= 1);
        }
    }

    #[test]
    fn keeps_shortest_parallel_edge() {
        let mut raw = RawGraph::new();
        raw.add_node(1, Some((0.0, 0.0)));
        raw.add_node(2, Some((0.0, 0.0001)));
        raw.add_edge(1, 2, 50.0);
        raw.add_edge(2, 1, 5.0);

        let g = GraphPreprocessor::normalize(&raw);
        assert_eq!(g.node_count(), 2);
        let a = NodeId(0);
        let b = NodeId(1);
        assert_eq!(g.edge_length(a, b), Some(5.0));
    }

    /// Seed scenario 6: A-B-C-D-E of degree-2 interior nodes compresses to a
    /// single A-E edge summing the chain lengths.
    #[test]
    fn chain_compression_basic() {
        let mut raw = RawGraph::new();
        for (id, lat) in [(1, 0.0), (2, 0.001), (3, 0.002), (4, 0.003), (5, 0.004)] {
            raw.add_node(id, Some((0.0, lat)));
        }
        raw.add_edge(1, 2, 10.0);
        raw.add_edge(2, 3, 20.0);
        raw.add_edge(3, 4, 30.0);
        raw.add_edge(4, 5, 40.0);

        let g = GraphPreprocessor::normalize(&raw);
        assert_eq!(g.node_count(), 2);
        let a = NodeId(0);
        let e = NodeId(1);
        assert_eq!(g.edge_length(a, e), Some(100.0));
        assert_eq!(g.degree(a), 1);
        assert_eq!(g.degree(e), 1);
    }

    /// If A-E already exists, compression must not merge; the original
    /// chain survives.
    #[test]
    fn chain_compression_skips_when_shortcut_exists() {
        let mut raw = RawGraph::new();
        for (id, lat) in [(1, 0.0), (2, 0.001), (3, 0.002)] {
            raw.add_node(id, Some((0.0, lat)));
        }
        raw.add_edge(1, 2, 10.0);
        raw.add_edge(2, 3, 20.0);
        raw.add_edge(1, 3, 5.0);

        let g = GraphPreprocessor::normalize(&raw);
        assert_eq!(g.node_count(), 3);
        for id in g.node_ids() {
            assert!(g.degree(id) >= 1);
        }
    }
}
