use std::collections::BTreeMap;

use serde::Serialize;

/// A single validated telemetry sample, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub lat: f64,
    pub lng: f64,
    /// Meters. 0.0 when the sample carried no altitude.
    pub altitude: f64,
    /// `HH:MM:SS` or `MM:SS`; empty when the sample had none.
    pub timestamp: String,
    /// Any other numeric fields (temperature, humidity, ...).
    pub extra_sensors: BTreeMap<String, f64>,
}

impl Record {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            altitude: 0.0,
            timestamp: String::new(),
            extra_sensors: BTreeMap::new(),
        }
    }

    /// Reading for `name`, or 0.0 when this sample did not record it.
    pub fn sensor(&self, name: &str) -> f64 {
        self.extra_sensors.get(name).copied().unwrap_or(0.0)
    }
}

/// A record plus the metrics derived from its predecessor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: Record,
    pub cumulative_distance_km: f64,
    pub speed_kmh: f64,
}

/// Altitude range of a whole track, used for color normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AltitudeBounds {
    pub min: f64,
    pub max: f64,
}

impl AltitudeBounds {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// True when min and max are equal, up to `f64::EPSILON` in absolute
    /// terms. Every altitude of a flat track gets the same color.
    pub fn is_flat(&self) -> bool {
        self.span() <= f64::EPSILON
    }

    /// Position of `altitude` within the range, clamped to `[0, 1]`.
    /// A flat range has no meaningful position and maps to the midpoint.
    pub fn normalize(&self, altitude: f64) -> f64 {
        if self.is_flat() {
            return 0.5;
        }
        ((altitude - self.min) / self.span()).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    pub point_count: usize,
    pub total_distance_km: f64,
    pub elapsed_seconds: i64,
    pub max_speed_kmh: f64,
    pub average_speed_kmh: f64,
}

/// Output of the metrics engine, handed read-only to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HikeTrack {
    pub points: Vec<EnrichedRecord>,
    pub altitude_bounds: AltitudeBounds,
    pub summary: TrackSummary,
}

impl HikeTrack {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&EnrichedRecord> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&EnrichedRecord> {
        self.points.last()
    }

    /// Union of sensor names across all samples, sorted.
    pub fn sensor_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .points
            .iter()
            .flat_map(|p| p.record.extra_sensors.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
