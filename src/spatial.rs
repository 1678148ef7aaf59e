//! Uniform latitude/longitude grid over graph nodes, for O(1)-expected
//! radius queries (§4.3). This stands in for the teacher's `rstar::RTree`
//! (see DESIGN.md): the spec mandates exact grid-cell and fallback-scan
//! semantics an R-tree can't reproduce bit-for-bit, so a plain hash grid
//! is the faithful implementation here.

use std::collections::HashMap;

use crate::graph::{Graph, NodeId};

const METERS_PER_DEGREE_LAT: f64 = 111_000.0;

/// Default cell side in degrees, ≈ 50 m, per §3's invariant.
pub const DEFAULT_CELL_SIDE_DEG: f64 = 0.0005;

type Cell = (i64, i64);

#[derive(Debug)]
pub struct SpatialGrid {
    cell_side: f64,
    cells: HashMap<Cell, Vec<NodeId>>,
}

fn cell_of(lat: f64, lon: f64, cell_side: f64) -> Cell {
    ((lat / cell_side).floor() as i64, (lon / cell_side).floor() as i64)
}

impl SpatialGrid {
    /// Builds a grid over every node in `graph`. Read-only once built.
    pub fn build(graph: &Graph, cell_side_deg: f64) -> Self {
        let mut cells: HashMap<Cell, Vec<NodeId>> = HashMap::new();
        for id in graph.node_ids() {
            let (lon, lat) = graph.pos(id);
            cells.entry(cell_of(lat, lon, cell_side_deg)).or_default().push(id);
        }
        SpatialGrid {
            cell_side: cell_side_deg,
            cells,
        }
    }

    /// Nodes within `radius_m` of `point` (lon, lat), with exact haversine
    /// distance in meters. Inspects the inclusive cell window the radius
    /// covers, per §4.3.
    pub fn query_radius(
        &self,
        graph: &Graph,
        point: (f64, f64),
        radius_m: f64,
    ) -> Vec<(NodeId, f64)> {
        let (lon, lat) = point;
        let r_deg = radius_m / METERS_PER_DEGREE_LAT;

        let ci_min = ((lat - r_deg) / self.cell_side).floor() as i64;
        let ci_max = ((lat + r_deg) / self.cell_side).floor() as i64;
        let cj_min = ((lon - r_deg) / self.cell_side).floor() as i64;
        let cj_max = ((lon + r_deg) / self.cell_side).floor() as i64;

        let mut out = Vec::new();
        for ci in ci_min..=ci_max {
            for cj in cj_min..=cj_max {
                let Some(ids) = self.cells.get(&(ci, cj)) else {
                    continue;
                };
                for &id in ids {
                    let n_pos = graph.pos(id);
                    let d = crate::transform::haversine_m(point, n_pos);
                    if d <= radius_m {
                        out.push((id, d));
                    }
                }
            }
        }
        out
    }

    /// Nearest node to `point`, searching the cell window implied by
    /// `search_radius_m` first and falling back to a full scan if the grid
    /// yields no candidates, per §4.3.
    pub fn nearest(&self, graph: &Graph, point: (f64, f64), search_radius_m: f64) -> Option<NodeId> {
        let candidates = self.query_radius(graph, point, search_radius_m);
        if let Some((id, _)) = candidates
            .into_iter()
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        {
            return Some(id);
        }
        full_scan_nearest(graph, point)
    }
}

/// Full scan fallback used when the grid is absent or a cell window yields
/// no candidates.
pub fn full_scan_nearest(graph: &Graph, point: (f64, f64)) -> Option<NodeId> {
    let (px, py) = point;
    graph
        .node_ids()
        .min_by(|&a, &b| {
            let da = dist_sq(graph.pos(a), (px, py));
            let db = dist_sq(graph.pos(b), (px, py));
            da.partial_cmp(&db).unwrap()
        })
}

fn dist_sq(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}
