//! Acquisition of the pedestrian road graph (§4.1). Grounded in the
//! teacher's `build_graph_for_mode`: an `osmpbfreader` two-pass read over a
//! local `.osm.pbf` extract, filtered to tagged highway ways. Unlike the
//! teacher, edges here carry plain meters (no travel-time weighting) since
//! GPS-art routing scores shape, not speed.

use std::fs::File;
use std::path::Path;

use geo::prelude::*;
use geo::Point;
use osmpbfreader::{OsmObj, OsmPbfReader};

use crate::error::CoreError;
use crate::graph::{GraphPreprocessor, RawGraph};

/// `walk`, `bike`, `drive`, or `all` (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkType {
    Walk,
    Bike,
    Drive,
    All,
}

impl NetworkType {
    fn admits(self, highway: &str) -> bool {
        if self == NetworkType::All {
            return true;
        }
        let table: &[&str] = match self {
            NetworkType::Walk => &[
                "footway", "path", "pedestrian", "steps", "track", "bridleway",
                "residential", "living_street", "service", "cycleway",
                "tertiary", "tertiary_link", "secondary", "secondary_link",
                "primary", "primary_link", "unclassified", "trunk", "trunk_link",
            ],
            NetworkType::Bike => &[
                "cycleway", "path", "track", "bridleway", "residential",
                "living_street", "service", "tertiary", "tertiary_link",
                "secondary", "secondary_link", "primary", "primary_link",
                "unclassified", "trunk", "trunk_link", "motorway", "motorway_link",
                "footway", "pedestrian", "steps",
            ],
            NetworkType::Drive => &[
                "motorway", "motorway_link", "trunk", "trunk_link", "primary",
                "primary_link", "secondary", "secondary_link", "tertiary",
                "tertiary_link", "residential", "living_street", "service",
                "unclassified",
            ],
            NetworkType::All => unreachable!(),
        };
        table.contains(&highway)
    }
}

/// A geographic bounding box: `[south, west, north, east]`.
#[derive(Debug, Clone, Copy)]
pub struct BBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BBox {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.south < self.north) {
            return Err(CoreError::Validation(format!(
                "bbox south ({}) must be < north ({})",
                self.south, self.north
            )));
        }
        if !(self.west < self.east) {
            return Err(CoreError::Validation(format!(
                "bbox west ({}) must be < east ({})",
                self.west, self.east
            )));
        }
        if !(-90.0..=90.0).contains(&self.south) || !(-90.0..=90.0).contains(&self.north) {
            return Err(CoreError::Validation("bbox latitude out of range".into()));
        }
        if !(-180.0..=180.0).contains(&self.west) || !(-180.0..=180.0).contains(&self.east) {
            return Err(CoreError::Validation("bbox longitude out of range".into()));
        }
        Ok(())
    }
}

pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), CoreError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CoreError::Validation(format!(
            "invalid latitude: {lat}. Must be between -90 and 90"
        )));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(CoreError::Validation(format!(
            "invalid longitude: {lon}. Must be between -180 and 180"
        )));
    }
    Ok(())
}

/// Acquires a pedestrian road graph from an external map source (§4.1).
/// Implementations must surface an error rather than silently returning an
/// empty graph.
pub trait NetworkFetcher {
    fn fetch_from_point(
        &self,
        center: (f64, f64),
        radius_m: f64,
        network_type: NetworkType,
    ) -> Result<crate::graph::Graph, CoreError>;

    fn fetch_from_bbox(
        &self,
        bbox: BBox,
        network_type: NetworkType,
    ) -> Result<crate::graph::Graph, CoreError>;
}

/// Fetches from a local `.osm.pbf` extract via `osmpbfreader`, grounded
/// directly in the teacher's `build_graph_for_mode`.
pub struct PbfNetworkFetcher {
    pbf_path: std::path::PathBuf,
}

impl PbfNetworkFetcher {
    pub fn new(pbf_path: impl AsRef<Path>) -> Self {
        PbfNetworkFetcher {
            pbf_path: pbf_path.as_ref().to_path_buf(),
        }
    }

    fn read_raw(&self, in_area: impl Fn(f64, f64) -> bool, network_type: NetworkType) -> anyhow::Result<RawGraph> {
        use std::collections::HashMap;

        let file = File::open(&self.pbf_path)?;
        let mut pbf = OsmPbfReader::new(file);

        let objs = pbf.get_objs_and_deps(|obj| {
            obj.is_node() || (obj.is_way() && obj.tags().contains_key("highway"))
        })?;

        let mut osm_nodes: HashMap<i64, (f64, f64)> = HashMap::new();
        for obj in objs.values() {
            if let OsmObj::Node(n) = obj {
                let (lon, lat) = (n.lon(), n.lat());
                if in_area(lat, lon) {
                    osm_nodes.insert(n.id.0, (lon, lat));
                }
            }
        }

        let mut raw = RawGraph::new();
        for obj in objs.values() {
            if let OsmObj::Way(w) = obj {
                let highway = w.tags.get("highway").map(|s| s.as_str()).unwrap_or("");
                if !network_type.admits(highway) {
                    continue;
                }
                let oneway = w.tags.get("oneway").map(|s| s.as_str()) == Some("yes");

                for window in w.nodes.windows(2) {
                    let from_id = window[0].0;
                    let to_id = window[1].0;

                    if let (Some(&(lon1, lat1)), Some(&(lon2, lat2))) =
                        (osm_nodes.get(&from_id), osm_nodes.get(&to_id))
                    {
                        let p1 = Point::new(lon1, lat1);
                        let p2 = Point::new(lon2, lat2);
                        let dist_m = p1.haversine_distance(&p2);
                        if dist_m <= 0.0 {
                            continue;
                        }

                        raw.add_node(from_id, Some((lon1, lat1)));
                        raw.add_node(to_id, Some((lon2, lat2)));
                        raw.add_edge(from_id, to_id, dist_m);
                        if !oneway {
                            raw.add_edge(to_id, from_id, dist_m);
                        }
                    }
                }
            }
        }

        Ok(raw)
    }
}

impl NetworkFetcher for PbfNetworkFetcher {
    fn fetch_from_point(
        &self,
        center: (f64, f64),
        radius_m: f64,
        network_type: NetworkType,
    ) -> Result<crate::graph::Graph, CoreError> {
        let (lat, lon) = center;
        validate_coordinates(lat, lon)?;

        let center_point = Point::new(lon, lat);
        let in_area = move |n_lat: f64, n_lon: f64| {
            Point::new(n_lon, n_lat).haversine_distance(&center_point) <= radius_m
        };

        let raw = self
            .read_raw(in_area, network_type)
            .map_err(CoreError::Upstream)?;
        Ok(GraphPreprocessor::normalize(&raw))
    }

    fn fetch_from_bbox(
        &self,
        bbox: BBox,
        network_type: NetworkType,
    ) -> Result<crate::graph::Graph, CoreError> {
        bbox.validate()?;
        let in_area =
            move |lat: f64, lon: f64| lat >= bbox.south && lat <= bbox.north && lon >= bbox.west && lon <= bbox.east;

        let raw = self
            .read_raw(in_area, network_type)
            .map_err(CoreError::Upstream)?;
        Ok(GraphPreprocessor::normalize(&raw))
    }
}
