use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Number, Value as JsonValue};

use crate::colormap::elevation_color;
use crate::options::ConvertOptions;
use crate::record::{EnrichedRecord, HikeTrack};

/// Convert an enriched track to a GeoJSON FeatureCollection.
///
/// The path comes first, then the start/finish markers, then per-sample
/// points when requested.
pub fn to_feature_collection(track: &HikeTrack, opts: &ConvertOptions) -> FeatureCollection {
    let mut features = Vec::new();

    if let Some(path) = path_feature(track, opts) {
        features.push(path);
    }

    if opts.include_markers {
        if let (Some(first), Some(last)) = (track.first(), track.last()) {
            features.push(marker_feature(first, "start", opts));
            features.push(marker_feature(last, "finish", opts));
        }
    }

    if opts.include_samples {
        features.extend(
            track
                .points
                .iter()
                .enumerate()
                .map(|(i, pt)| sample_feature(i, pt, track, opts)),
        );
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn path_feature(track: &HikeTrack, opts: &ConvertOptions) -> Option<Feature> {
    let geometry = match track.points.as_slice() {
        [] => return None,
        // Single sample → Point Feature
        [only] => Geometry::new(Value::Point(point_coords(only, opts.include_elevation))),
        points => Geometry::new(Value::LineString(
            points
                .iter()
                .map(|pt| point_coords(pt, opts.include_elevation))
                .collect(),
        )),
    };

    let summary = &track.summary;
    let bounds = &track.altitude_bounds;
    let mut props = Map::new();
    props.insert("kind".to_string(), JsonValue::String("path".to_string()));
    props.insert("pointCount".to_string(), JsonValue::from(summary.point_count));
    props.insert(
        "totalDistanceKm".to_string(),
        number(summary.total_distance_km),
    );
    props.insert(
        "elapsedSeconds".to_string(),
        JsonValue::from(summary.elapsed_seconds),
    );
    props.insert("maxSpeedKmh".to_string(), number(summary.max_speed_kmh));
    props.insert(
        "averageSpeedKmh".to_string(),
        number(summary.average_speed_kmh),
    );
    props.insert("minAltitude".to_string(), number(bounds.min));
    props.insert("maxAltitude".to_string(), number(bounds.max));

    let mut coord_props = Map::new();
    if opts.include_time {
        coord_props.insert(
            "times".to_string(),
            JsonValue::Array(track.points.iter().map(timestamp_value).collect()),
        );
    }
    coord_props.insert(
        "distancesKm".to_string(),
        JsonValue::Array(
            track
                .points
                .iter()
                .map(|pt| number(pt.cumulative_distance_km))
                .collect(),
        ),
    );
    coord_props.insert(
        "speedsKmh".to_string(),
        JsonValue::Array(track.points.iter().map(|pt| number(pt.speed_kmh)).collect()),
    );
    if opts.include_colors {
        coord_props.insert(
            "colors".to_string(),
            JsonValue::Array(
                track
                    .points
                    .iter()
                    .map(|pt| JsonValue::String(elevation_color(bounds, pt.record.altitude)))
                    .collect(),
            ),
        );
    }
    if opts.include_sensors {
        insert_sensor_series(&mut coord_props, track);
    }
    props.insert(
        "coordinateProperties".to_string(),
        JsonValue::Object(coord_props),
    );

    Some(Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(props),
        foreign_members: None,
    })
}

fn marker_feature(pt: &EnrichedRecord, kind: &str, opts: &ConvertOptions) -> Feature {
    let geometry = Geometry::new(Value::Point(point_coords(pt, opts.include_elevation)));

    let mut props = Map::new();
    props.insert("kind".to_string(), JsonValue::String(kind.to_string()));
    props.insert("timestamp".to_string(), timestamp_value(pt));
    props.insert("altitude".to_string(), number(pt.record.altitude));

    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

fn sample_feature(
    index: usize,
    pt: &EnrichedRecord,
    track: &HikeTrack,
    opts: &ConvertOptions,
) -> Feature {
    let geometry = Geometry::new(Value::Point(point_coords(pt, opts.include_elevation)));

    let mut props = Map::new();
    props.insert("kind".to_string(), JsonValue::String("sample".to_string()));
    props.insert("index".to_string(), JsonValue::from(index));
    props.insert("timestamp".to_string(), timestamp_value(pt));
    props.insert("altitude".to_string(), number(pt.record.altitude));
    props.insert("distanceKm".to_string(), number(pt.cumulative_distance_km));
    props.insert("speedKmh".to_string(), number(pt.speed_kmh));
    if opts.include_colors {
        props.insert(
            "color".to_string(),
            JsonValue::String(elevation_color(&track.altitude_bounds, pt.record.altitude)),
        );
    }
    if opts.include_sensors && !pt.record.extra_sensors.is_empty() {
        let sensors: Map<String, JsonValue> = pt
            .record
            .extra_sensors
            .iter()
            .map(|(name, reading)| (name.clone(), number(*reading)))
            .collect();
        props.insert("sensors".to_string(), JsonValue::Object(sensors));
    }

    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

/// Build [lng, lat] or [lng, lat, altitude] coordinate array.
fn point_coords(pt: &EnrichedRecord, include_elevation: bool) -> Vec<f64> {
    let rec = &pt.record;
    if include_elevation {
        vec![rec.lng, rec.lat, rec.altitude]
    } else {
        vec![rec.lng, rec.lat]
    }
}

fn timestamp_value(pt: &EnrichedRecord) -> JsonValue {
    match pt.record.timestamp.as_str() {
        "" => JsonValue::Null,
        ts => JsonValue::String(ts.to_string()),
    }
}

fn number(v: f64) -> JsonValue {
    Number::from_f64(v).map_or(JsonValue::Null, JsonValue::Number)
}

/// One array per sensor name, aligned with the path vertices. Samples that
/// did not record a sensor contribute 0.
fn insert_sensor_series(coord_props: &mut Map<String, JsonValue>, track: &HikeTrack) {
    let names = track.sensor_names();
    if names.is_empty() {
        return;
    }

    let series: Map<String, JsonValue> = names
        .into_iter()
        .map(|name| {
            let readings = track
                .points
                .iter()
                .map(|pt| number(pt.record.sensor(name)))
                .collect();
            (name.to_string(), JsonValue::Array(readings))
        })
        .collect();
    coord_props.insert("sensors".to_string(), JsonValue::Object(series));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::derive_metrics;
    use crate::parser::parse_hike_log;

    fn track_from(text: &str) -> HikeTrack {
        derive_metrics(&parse_hike_log(text).records)
    }

    const TWO_POINTS: &str = r#"{"lat":45.0,"lng":7.0,"altitude":1000,"timestamp":"00:00:00","dht_temp":12.5},{"lat":45.001,"lng":7.001,"altitude":1010,"timestamp":"00:01:00","dht_humidity":70}"#;

    #[test]
    fn test_path_and_markers() {
        let fc = to_feature_collection(&track_from(TWO_POINTS), &ConvertOptions::default());
        assert_eq!(fc.features.len(), 3);

        let path = &fc.features[0];
        let geom = path.geometry.as_ref().unwrap();
        if let Value::LineString(coords) = &geom.value {
            assert_eq!(coords.len(), 2);
            // Check [lng, lat, altitude] order
            assert_eq!(coords[0], vec![7.0, 45.0, 1000.0]);
        } else {
            panic!("Expected LineString geometry");
        }

        let props = path.properties.as_ref().unwrap();
        assert_eq!(props["kind"], "path");
        assert_eq!(props["pointCount"], 2);
        assert_eq!(props["minAltitude"], 1000.0);
        assert_eq!(props["maxAltitude"], 1010.0);

        let coord_props = props["coordinateProperties"].as_object().unwrap();
        assert_eq!(coord_props["times"][1], "00:01:00");
        assert_eq!(coord_props["distancesKm"][0], 0.0);
        assert_eq!(coord_props["colors"][0], "#0000ff");
        assert_eq!(coord_props["colors"][1], "#ff0000");

        let kinds: Vec<&str> = fc
            .features
            .iter()
            .map(|f| f.properties.as_ref().unwrap()["kind"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, vec!["path", "start", "finish"]);
    }

    #[test]
    fn test_sensor_series_default_to_zero() {
        let fc = to_feature_collection(&track_from(TWO_POINTS), &ConvertOptions::default());
        let props = fc.features[0].properties.as_ref().unwrap();
        let sensors = props["coordinateProperties"]["sensors"].as_object().unwrap();
        assert_eq!(sensors.len(), 2);
        assert_eq!(sensors["dht_temp"], serde_json::json!([12.5, 0.0]));
        assert_eq!(sensors["dht_humidity"], serde_json::json!([0.0, 70.0]));
    }

    #[test]
    fn test_single_sample_is_point() {
        let track = track_from(r#"{"lat":45.0,"lng":7.0,"altitude":500,"timestamp":"08:00:00"}"#);
        let fc = to_feature_collection(&track, &ConvertOptions::default());

        let geom = fc.features[0].geometry.as_ref().unwrap();
        match &geom.value {
            Value::Point(coords) => assert_eq!(coords, &vec![7.0, 45.0, 500.0]),
            _ => panic!("Expected Point geometry for single-sample track"),
        }
        let coord_props = fc.features[0].properties.as_ref().unwrap()["coordinateProperties"]
            .as_object()
            .unwrap();
        assert_eq!(coord_props["colors"][0], "#80c000");
        assert!(coord_props.get("sensors").is_none());
    }

    #[test]
    fn test_empty_track() {
        let fc = to_feature_collection(&HikeTrack::default(), &ConvertOptions::default());
        assert!(fc.features.is_empty());
    }

    #[test]
    fn test_samples() {
        let opts = ConvertOptions {
            include_samples: true,
            include_markers: false,
            ..Default::default()
        };
        let fc = to_feature_collection(&track_from(TWO_POINTS), &opts);
        assert_eq!(fc.features.len(), 3);

        let props = fc.features[2].properties.as_ref().unwrap();
        assert_eq!(props["kind"], "sample");
        assert_eq!(props["index"], 1);
        assert_eq!(props["timestamp"], "00:01:00");
        assert_eq!(props["color"], "#ff0000");
        assert_eq!(props["sensors"]["dht_humidity"], 70.0);
        assert!(props["speedKmh"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_no_elevation_no_extras() {
        let opts = ConvertOptions {
            include_elevation: false,
            include_time: false,
            include_colors: false,
            include_sensors: false,
            include_markers: false,
            ..Default::default()
        };
        let fc = to_feature_collection(&track_from(TWO_POINTS), &opts);
        assert_eq!(fc.features.len(), 1);

        let geom = fc.features[0].geometry.as_ref().unwrap();
        if let Value::LineString(coords) = &geom.value {
            assert_eq!(coords[1].len(), 2); // No altitude
        }
        let coord_props = fc.features[0].properties.as_ref().unwrap()["coordinateProperties"]
            .as_object()
            .unwrap();
        assert!(coord_props.get("times").is_none());
        assert!(coord_props.get("colors").is_none());
        assert!(coord_props.get("sensors").is_none());
        assert!(coord_props.get("speedsKmh").is_some());
    }

    #[test]
    fn test_missing_timestamp_is_null() {
        let track = track_from(r#"{"lat":45.0,"lng":7.0}"#);
        let fc = to_feature_collection(&track, &ConvertOptions::default());
        let start = fc.features[1].properties.as_ref().unwrap();
        assert_eq!(start["kind"], "start");
        assert!(start["timestamp"].is_null());
    }
}
