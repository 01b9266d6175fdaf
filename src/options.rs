use serde::Deserialize;

/// Options for hike log to GeoJSON conversion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    /// Include altitude as the 3rd coordinate value (default: true)
    #[serde(default = "default_true")]
    pub include_elevation: bool,

    /// Include timestamps in coordinateProperties.times (default: true)
    #[serde(default = "default_true")]
    pub include_time: bool,

    /// Add start and finish marker features (default: true)
    #[serde(default = "default_true")]
    pub include_markers: bool,

    /// Include per-vertex elevation colors (default: true)
    #[serde(default = "default_true")]
    pub include_colors: bool,

    /// Include sensor readings in coordinateProperties.sensors (default: true)
    #[serde(default = "default_true")]
    pub include_sensors: bool,

    /// Emit one Point feature per sample (default: false)
    #[serde(default)]
    pub include_samples: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            include_elevation: true,
            include_time: true,
            include_markers: true,
            include_colors: true,
            include_sensors: true,
            include_samples: false,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_options_keep_defaults() {
        let opts: ConvertOptions =
            serde_json::from_str(r#"{"includeSamples": true, "includeColors": false}"#).unwrap();
        assert!(opts.include_samples);
        assert!(!opts.include_colors);
        assert!(opts.include_elevation);
        assert!(opts.include_markers);
    }
}
