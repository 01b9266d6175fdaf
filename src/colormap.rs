use crate::record::AltitudeBounds;

/// Low to high: blue, green, yellow, red.
const STOPS: [[u8; 3]; 4] = [[0, 0, 255], [0, 128, 0], [255, 255, 0], [255, 0, 0]];

/// `#rrggbb` color for a normalized position in `[0, 1]`.
pub fn ramp_color(t: f64) -> String {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let scaled = t * (STOPS.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(STOPS.len() - 2);
    let frac = scaled - idx as f64;

    let (lo, hi) = (STOPS[idx], STOPS[idx + 1]);
    let channel = |c: usize| {
        let v = lo[c] as f64 + (hi[c] as f64 - lo[c] as f64) * frac;
        v.round() as u8
    };
    format!("#{:02x}{:02x}{:02x}", channel(0), channel(1), channel(2))
}

/// Color of `altitude` on the track's elevation scale. A flat track gets
/// one constant color.
pub fn elevation_color(bounds: &AltitudeBounds, altitude: f64) -> String {
    ramp_color(bounds.normalize(altitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(ramp_color(0.0), "#0000ff");
        assert_eq!(ramp_color(1.0), "#ff0000");
    }

    #[test]
    fn test_ramp_stops() {
        assert_eq!(ramp_color(1.0 / 3.0), "#008000");
        assert_eq!(ramp_color(2.0 / 3.0), "#ffff00");
    }

    #[test]
    fn test_ramp_midpoint() {
        assert_eq!(ramp_color(0.5), "#80c000");
    }

    #[test]
    fn test_ramp_clamps() {
        assert_eq!(ramp_color(-3.0), "#0000ff");
        assert_eq!(ramp_color(7.0), "#ff0000");
        assert_eq!(ramp_color(f64::NAN), "#80c000");
    }

    #[test]
    fn test_flat_track_constant_color() {
        let bounds = AltitudeBounds {
            min: 320.0,
            max: 320.0,
        };
        assert_eq!(elevation_color(&bounds, 320.0), elevation_color(&bounds, 9999.0));
    }

    #[test]
    fn test_elevation_color_uses_bounds() {
        let bounds = AltitudeBounds {
            min: 1000.0,
            max: 2000.0,
        };
        assert_eq!(elevation_color(&bounds, 1000.0), "#0000ff");
        assert_eq!(elevation_color(&bounds, 2000.0), "#ff0000");
    }
}
