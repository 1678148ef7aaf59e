//! GPS-art route generator core: given a start point, a target walking
//! distance and a hand-drawn figure, searches a pedestrian road graph for up
//! to three routes that best trace the figure's shape (§1, §2, §6).

pub mod astar;
pub mod candidate;
pub mod config;
pub mod elevation;
pub mod error;
pub mod ffi;
pub mod figure;
pub mod graph;
pub mod network;
pub mod progress;
pub mod similarity;
pub mod spatial;
pub mod transform;
pub mod validation;
pub mod waypoints;

use serde::Serialize;

pub use config::GenerateConfig;
pub use error::{CoreError, CoreResult};

use candidate::{CandidateEvaluator, Ranker};
use graph::GraphPreprocessor;
use network::NetworkFetcher;
use progress::ProgressSink;
use spatial::SpatialGrid;
use validation::{validate_target_distance, DistanceValidation};

/// `custom` (svg_path supplied directly) or `shape` (svg_path pre-resolved
/// by the caller from a shape registry, per spec.md §1) — carried through
/// only as metadata, since both modes hand the core an already-resolved
/// path (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    Custom,
    Shape,
}

/// A request to generate GPS-art routes (§6).
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub start_lat: f64,
    pub start_lon: f64,
    pub svg_path: String,
    pub target_distance_km: f64,
    pub mode: RouteMode,
    pub shape_id: Option<String>,
    pub enable_rotation: bool,
    pub rotation_angles: Option<Vec<f64>>,
    pub return_node_paths: bool,
    pub config: GenerateConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedRoute {
    pub id: usize,
    pub coordinates: Vec<(f64, f64)>,
    pub node_path: Option<Vec<u32>>,
    pub length_m: f64,
    pub length_km: f64,
    pub similarity_score: f64,
    pub placement_index: usize,
    pub rotation_degrees: f64,
    pub ring_start_index: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteResponse {
    pub routes: Vec<GeneratedRoute>,
    pub scaled_drawing: Vec<(f64, f64)>,
    pub best_angle: Option<f64>,
    pub validation: DistanceValidation,
}

/// Runs the full pipeline: fetch the road network, preprocess it, parse and
/// project the figure, search `(placement, rotation)` candidates, and rank
/// the top matches (§6).
pub fn generate_routes(
    request: GenerateRequest,
    fetcher: &dyn NetworkFetcher,
    mut progress: Option<&mut dyn ProgressSink>,
) -> CoreResult<RouteResponse> {
    network::validate_coordinates(request.start_lat, request.start_lon)?;
    if request.target_distance_km <= 0.0 {
        return Err(CoreError::Validation(format!(
            "target_distance_km must be positive, got {}",
            request.target_distance_km
        )));
    }

    log::info!(
        "generating routes: start=({}, {}) target={}km mode={:?}",
        request.start_lat,
        request.start_lon,
        request.target_distance_km,
        request.mode
    );

    let canvas_points = figure::parse_svg_path(&request.svg_path);
    let figure_geo = figure::canvas_to_geo_default(&canvas_points, request.start_lat, request.start_lon);

    if figure_geo.len() < 2 {
        log::warn!("figure has fewer than two points after parsing, returning empty result");
        let validation = validate_target_distance(0.0, request.target_distance_km * 1000.0);
        return Ok(RouteResponse {
            routes: Vec::new(),
            scaled_drawing: figure_geo,
            best_angle: None,
            validation,
        });
    }

    if let Some(sink) = progress.as_deref_mut() {
        sink.on_progress(5, "fetched figure, fetching road network");
    }

    // Search radius generous enough to cover the target distance scaled up
    // from the figure's straight-line span, plus headroom for detours.
    let radius_m = (request.target_distance_km * 1000.0).max(500.0) * 0.75;
    let graph = fetcher.fetch_from_point(
        (request.start_lat, request.start_lon),
        radius_m,
        network::NetworkType::Walk,
    )?;

    if let Some(sink) = progress.as_deref_mut() {
        sink.on_progress(15, "preprocessed road graph, indexing");
    }

    let grid = SpatialGrid::build(&graph, request.config.grid_cell_side_deg);

    let minimum_distance_m = transform::polyline_length_m(&figure_geo);
    let validation = validate_target_distance(minimum_distance_m, request.target_distance_km * 1000.0);

    let mut config = request.config.clone();
    if !request.enable_rotation {
        config.rotation_angles_deg = vec![0.0];
    } else if let Some(angles) = &request.rotation_angles {
        config.rotation_angles_deg = angles.clone();
    }

    let evaluator = CandidateEvaluator::new(&graph, Some(&grid), (request.start_lon, request.start_lat), &config);
    let candidates = evaluator.evaluate(&figure_geo, request.target_distance_km, progress.as_deref_mut());

    if candidates.is_empty() {
        log::warn!("no viable candidates found for requested figure and distance");
    }

    let ranked = Ranker::rank(candidates, config.top_n);

    let best_angle = ranked.first().map(|c| c.rotation_theta_deg);
    let scaled_drawing = ranked
        .first()
        .map(|c| c.scaled_figure.clone())
        .unwrap_or_else(|| figure_geo.clone());

    let routes = ranked
        .into_iter()
        .map(|c| GeneratedRoute {
            id: c.id,
            node_path: if request.return_node_paths {
                Some(c.path.iter().map(|n| n.0).collect())
            } else {
                None
            },
            coordinates: c.route_coords,
            length_m: c.length_m,
            length_km: c.length_m / 1000.0,
            similarity_score: c.similarity_m,
            placement_index: c.placement_k,
            rotation_degrees: c.rotation_theta_deg,
            ring_start_index: c.start_index,
        })
        .collect();

    if let Some(sink) = progress {
        sink.on_progress(100, "done");
    }

    Ok(RouteResponse {
        routes,
        scaled_drawing,
        best_angle,
        validation,
    })
}
