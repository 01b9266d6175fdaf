//! Recovers hike telemetry from loosely formatted logs, derives distance and
//! speed, and hands the result to a map renderer as GeoJSON.

pub mod colormap;
pub mod converter;
pub mod error;
pub mod metrics;
pub mod options;
pub mod parser;
pub mod record;

use serde::Serialize;
use tracing::info;
use wasm_bindgen::prelude::*;

use crate::error::{HikeLogError, SkippedFragment};
use crate::options::ConvertOptions;
use crate::record::HikeTrack;

/// A derived track together with the fragments dropped while parsing it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HikeReport {
    #[serde(flatten)]
    pub track: HikeTrack,
    pub skipped: Vec<SkippedFragment>,
}

/// Parse a raw log and derive per-sample metrics.
///
/// Fails only with [`HikeLogError::NoValidData`] when nothing survives
/// parsing; individual bad records are dropped along the way.
pub fn process_hike_log(text: &str) -> Result<HikeReport, HikeLogError> {
    let parsed = parser::parse_hike_log(text);
    if parsed.records.is_empty() {
        return Err(HikeLogError::NoValidData);
    }

    let track = metrics::derive_metrics(&parsed.records);
    info!(
        points = track.summary.point_count,
        skipped = parsed.skipped.len(),
        distance_km = track.summary.total_distance_km,
        "derived hike metrics"
    );
    Ok(HikeReport {
        track,
        skipped: parsed.skipped,
    })
}

/// Convert a hike log to GeoJSON, returned as a JS object.
#[wasm_bindgen(js_name = hikeLogToGeoJson)]
pub fn hike_log_to_geojson(text: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let report = process_hike_log(text)?;
    let fc = converter::to_feature_collection(&report.track, &opts);
    serde_wasm_bindgen::to_value(&fc).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Convert a hike log to GeoJSON, returned as a JSON string.
#[wasm_bindgen(js_name = hikeLogToGeoJsonString)]
pub fn hike_log_to_geojson_string(text: &str, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let report = process_hike_log(text)?;
    let fc = converter::to_feature_collection(&report.track, &opts);
    serde_json::to_string(&fc).map_err(|e| HikeLogError::from(e).into())
}

/// Enriched samples, altitude bounds, summary and parse diagnostics.
#[wasm_bindgen(js_name = analyzeHikeLog)]
pub fn analyze_hike_log(text: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let report = process_hike_log(text)?;
    serde_wasm_bindgen::to_value(&report).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_options(options: JsValue) -> Result<ConvertOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(ConvertOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_hike_log() {
        let text = r#"{"lat":45.0,"lng":7.0,"altitude":1000,"timestamp":"00:00:00"},{"lat":45.001,"lng":7.001,"altitude":1010,"timestamp":"00:01:00"}"#;
        let report = process_hike_log(text).unwrap();
        assert_eq!(report.track.points.len(), 2);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_no_valid_data() {
        let text = r#"{"lat":0,"lng":0},{"lat":0.0,"lng":0.0},"#;
        let err = process_hike_log(text).unwrap_err();
        assert!(matches!(err, HikeLogError::NoValidData));
        assert_eq!(err.to_string(), "no valid data points found");
    }

    #[test]
    fn test_report_serializes_flat() {
        let report = process_hike_log(r#"{"lat":45.0,"lng":7.0},{"lat":,}"#).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["points"].as_array().unwrap().len(), 1);
        assert_eq!(json["summary"]["pointCount"], 1);
        assert_eq!(json["altitudeBounds"]["min"], 0.0);
        assert_eq!(json["skipped"].as_array().unwrap().len(), 1);
    }
}
