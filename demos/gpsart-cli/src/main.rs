//! Demo harness for `gpsart-core`: reads a local `.osm.pbf` extract, a start
//! coordinate and an SVG path from argv, runs `generate_routes`, and prints
//! the resulting routes as JSON.

use clap::Parser;

use gpsart_core::network::{NetworkFetcher, PbfNetworkFetcher};
use gpsart_core::progress::ProgressSink;
use gpsart_core::{generate_routes, GenerateConfig, GenerateRequest, RouteMode};

/// Generate GPS-art walking routes over a local OSM extract.
#[derive(Parser, Debug)]
#[command(name = "gpsart-cli", version, about)]
struct Args {
    /// Path to a local .osm.pbf extract covering the requested area.
    pbf_path: String,

    /// Starting latitude.
    #[arg(long)]
    lat: f64,

    /// Starting longitude.
    #[arg(long)]
    lon: f64,

    /// SVG path (M/L commands only) describing the figure to draw.
    #[arg(long)]
    svg_path: String,

    /// Target walking distance, in kilometers.
    #[arg(long)]
    target_km: f64,

    /// Disable the rotation sweep and only try the figure at its drawn
    /// orientation.
    #[arg(long)]
    no_rotation: bool,

    /// Include the raw node-id path for each route in the output.
    #[arg(long)]
    with_node_paths: bool,
}

struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn on_progress(&mut self, percent: u8, message: &str) {
        log::info!("[{percent:>3}%] {message}");
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"));
    let args = Args::parse();

    let request = GenerateRequest {
        start_lat: args.lat,
        start_lon: args.lon,
        svg_path: args.svg_path,
        target_distance_km: args.target_km,
        mode: RouteMode::Custom,
        shape_id: None,
        enable_rotation: !args.no_rotation,
        rotation_angles: None,
        return_node_paths: args.with_node_paths,
        config: GenerateConfig::default(),
    };

    let fetcher = PbfNetworkFetcher::new(&args.pbf_path);
    let mut progress = StderrProgress;
    let response = generate_routes(request, &fetcher as &dyn NetworkFetcher, Some(&mut progress))?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
