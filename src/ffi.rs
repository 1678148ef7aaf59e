//! C-ABI surface, mirroring the teacher routing crate's `extern "C"`
//! functions. Unlike the teacher, which returns flat `#[repr(C)]` structs
//! for a handful of scalar fields, a `generate_routes` call produces a
//! variable number of routes each with a variable-length coordinate list —
//! a shape that maps far more naturally onto a JSON string than a C struct
//! array, so this layer serializes the whole `RouteResponse` instead.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::network::{NetworkFetcher, PbfNetworkFetcher};
use crate::{generate_routes, GenerateConfig, GenerateRequest, RouteMode};

/// Generates routes for a JSON-encoded request and returns a JSON-encoded
/// `RouteResponse` (or `{"error": "..."}` on failure) as an owned,
/// caller-freed C string. `pbf_path` names the local `.osm.pbf` extract the
/// road network is read from.
///
/// # Safety
/// `request_json` and `pbf_path` must be valid, NUL-terminated UTF-8 C
/// strings. The returned pointer must be freed with
/// [`gpsart_free_string`] and nowhere else.
#[no_mangle]
pub unsafe extern "C" fn gpsart_generate_routes(
    request_json: *const c_char,
    pbf_path: *const c_char,
) -> *mut c_char {
    let result = generate_routes_json(request_json, pbf_path);
    let body = match result {
        Ok(json) => json,
        Err(message) => serde_json::json!({ "error": message }).to_string(),
    };
    CString::new(body)
        .unwrap_or_else(|_| CString::new("{\"error\":\"response contained a NUL byte\"}").unwrap())
        .into_raw()
}

unsafe fn generate_routes_json(
    request_json: *const c_char,
    pbf_path: *const c_char,
) -> Result<String, String> {
    if request_json.is_null() || pbf_path.is_null() {
        return Err("null pointer passed to gpsart_generate_routes".to_string());
    }

    let request_json = CStr::from_ptr(request_json)
        .to_str()
        .map_err(|e| format!("request_json is not valid UTF-8: {e}"))?;
    let pbf_path = CStr::from_ptr(pbf_path)
        .to_str()
        .map_err(|e| format!("pbf_path is not valid UTF-8: {e}"))?;

    let wire: WireRequest =
        serde_json::from_str(request_json).map_err(|e| format!("invalid request JSON: {e}"))?;
    let request = wire.into_request();

    let fetcher = PbfNetworkFetcher::new(pbf_path);
    let response = generate_routes(request, &fetcher as &dyn NetworkFetcher, None)
        .map_err(|e| e.to_string())?;

    serde_json::to_string(&response).map_err(|e| format!("failed to serialize response: {e}"))
}

/// Frees a string previously returned by [`gpsart_generate_routes`].
///
/// # Safety
/// `s` must be a pointer previously returned by [`gpsart_generate_routes`]
/// and not already freed.
#[no_mangle]
pub unsafe extern "C" fn gpsart_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    drop(CString::from_raw(s));
}

/// JSON wire shape for [`GenerateRequest`]; separate from the public Rust
/// type so request JSON can use plain strings for `mode` and omit
/// `config`/rotation fields to fall back to defaults.
#[derive(serde::Deserialize)]
struct WireRequest {
    start_lat: f64,
    start_lon: f64,
    svg_path: String,
    target_distance_km: f64,
    #[serde(default)]
    mode: WireMode,
    #[serde(default)]
    shape_id: Option<String>,
    #[serde(default = "default_true")]
    enable_rotation: bool,
    #[serde(default)]
    rotation_angles: Option<Vec<f64>>,
    #[serde(default)]
    return_node_paths: bool,
}

fn default_true() -> bool {
    true
}

#[derive(serde::Deserialize, Default)]
#[serde(rename_all = "lowercase")]
enum WireMode {
    #[default]
    Custom,
    Shape,
}

impl WireRequest {
    fn into_request(self) -> GenerateRequest {
        GenerateRequest {
            start_lat: self.start_lat,
            start_lon: self.start_lon,
            svg_path: self.svg_path,
            target_distance_km: self.target_distance_km,
            mode: match self.mode {
                WireMode::Custom => RouteMode::Custom,
                WireMode::Shape => RouteMode::Shape,
            },
            shape_id: self.shape_id,
            enable_rotation: self.enable_rotation,
            rotation_angles: self.rotation_angles,
            return_node_paths: self.return_node_paths,
            config: GenerateConfig::default(),
        }
    }
}

// Re-exported for the rare FFI caller that wants to hand-build a request
// instead of going through JSON (e.g. a test harness in another language).
pub use crate::network::NetworkType as FfiNetworkType;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_request_defaults_to_custom_mode_and_rotation_enabled() {
        let json = r#"{
            "start_lat": 37.5,
            "start_lon": 127.0,
            "svg_path": "M 0 0 L 10 10",
            "target_distance_km": 2.0
        }"#;
        let wire: WireRequest = serde_json::from_str(json).unwrap();
        let request = wire.into_request();
        assert_eq!(request.mode, RouteMode::Custom);
        assert!(request.enable_rotation);
        assert!(!request.return_node_paths);
    }

    #[test]
    fn null_pointers_are_rejected() {
        let result = unsafe { generate_routes_json(std::ptr::null(), std::ptr::null()) };
        assert!(result.is_err());
    }
}
