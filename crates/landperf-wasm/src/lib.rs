use js_sys::Int32Array;
use landperf_core::{Grid, IndicatorConfig, IndicatorEngine, IndicatorResult};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

/// Grids as nested row lists, the layout the map front end hands over.
#[derive(Deserialize)]
struct Request {
    index_stack: Vec<Vec<Vec<f64>>>,
    zone_grid: Vec<Vec<i32>>,
}

fn engine_for(config_json: Option<&str>) -> Result<IndicatorEngine, String> {
    let config = match config_json {
        Some(s) => IndicatorConfig::from_json_str(s).map_err(|e| e.to_string())?,
        None => IndicatorConfig::default(),
    };
    IndicatorEngine::new(config).map_err(|e| e.to_string())
}

fn run_request(request_json: &str, config_json: Option<&str>) -> Result<IndicatorResult, String> {
    run_with(&engine_for(config_json)?, request_json)
}

fn run_with(engine: &IndicatorEngine, request_json: &str) -> Result<IndicatorResult, String> {
    let request: Request =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid request: {e}"))?;

    let stack = request
        .index_stack
        .into_iter()
        .map(Grid::from_rows)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("Invalid index stack: {e}"))?;
    let zones = Grid::from_rows(request.zone_grid).map_err(|e| format!("Invalid zone grid: {e}"))?;

    engine.compute(&stack, &zones).map_err(|e| e.to_string())
}

fn run_change(baseline_json: &str, reporting_json: &str, config_json: Option<&str>) -> Result<Vec<i32>, String> {
    let engine = engine_for(config_json)?;
    let baseline = run_with(&engine, baseline_json)?;
    let reporting = run_with(&engine, reporting_json)?;
    engine.change(&baseline, &reporting).map(|g| g.data).map_err(|e| e.to_string())
}

/// Compute the indicator for a JSON request, optionally with a JSON config.
/// Returns the full result bundle as a JS object.
#[wasm_bindgen]
pub fn compute_indicator(request_json: &str, config_json: Option<String>) -> Result<JsValue, JsValue> {
    let result = run_request(request_json, config_json.as_deref()).map_err(|e| JsValue::from_str(&e))?;
    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Classification codes only, row-major, for direct rendering.
#[wasm_bindgen]
pub fn classification_codes(request_json: &str, config_json: Option<String>) -> Result<Int32Array, JsValue> {
    let result = run_request(request_json, config_json.as_deref()).map_err(|e| JsValue::from_str(&e))?;
    Ok(Int32Array::from(result.classification.data.as_slice()))
}

/// Baseline → reporting change codes, row-major. Both requests must cover
/// the same grid.
#[wasm_bindgen]
pub fn performance_change(
    baseline_json: &str,
    reporting_json: &str,
    config_json: Option<String>,
) -> Result<Int32Array, JsValue> {
    let codes = run_change(baseline_json, reporting_json, config_json.as_deref()).map_err(|e| JsValue::from_str(&e))?;
    Ok(Int32Array::from(codes.as_slice()))
}

/// Default configuration as JSON, as a starting point for editing.
#[wasm_bindgen]
pub fn default_config() -> String {
    serde_json::to_string(&IndicatorConfig::default()).unwrap_or_default()
}
