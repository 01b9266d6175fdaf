use crate::record::{AltitudeBounds, EnrichedRecord, HikeTrack, Record, TrackSummary};

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Elapsed time between samples is never taken as less than this.
const MIN_STEP_SECONDS: i64 = 1;

/// Great-circle distance in kilometers between two `(lat, lng)` pairs.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = from;
    let (lat2, lon2) = to;
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Seconds since midnight for an `HH:MM:SS` or `MM:SS` clock string.
///
/// Two components are always minutes and seconds. Anything else, including
/// a component that is not an integer or a total that overflows, counts as
/// `00:00:00`.
pub fn timestamp_seconds(timestamp: &str) -> i64 {
    let parts: Result<Vec<i64>, _> = timestamp
        .trim()
        .split(':')
        .map(|p| p.trim().parse::<i64>())
        .collect();
    let total = match parts.as_deref() {
        Ok([m, s]) => clock_seconds(0, *m, *s),
        Ok([h, m, s]) => clock_seconds(*h, *m, *s),
        _ => None,
    };
    total.unwrap_or(0)
}

fn clock_seconds(h: i64, m: i64, s: i64) -> Option<i64> {
    h.checked_mul(3600)?
        .checked_add(m.checked_mul(60)?)?
        .checked_add(s)
}

/// Seconds from `prev` to `curr`, saturating at the `i64` range.
fn elapsed_seconds(prev: &str, curr: &str) -> i64 {
    timestamp_seconds(curr).saturating_sub(timestamp_seconds(prev))
}

fn position(record: &Record) -> (f64, f64) {
    (record.lat, record.lng)
}

/// Cumulative distance and per-step speed for every record, plus the
/// altitude range of the track.
///
/// Never fails: a repeated or backwards timestamp gives a one-second step, a
/// single record gives zero distance and speed.
pub fn derive_metrics(records: &[Record]) -> HikeTrack {
    let mut points = Vec::with_capacity(records.len());
    let mut cumulative = 0.0;

    for (i, record) in records.iter().enumerate() {
        let speed = match i.checked_sub(1).map(|p| &records[p]) {
            None => 0.0,
            Some(prev) => {
                let step_km = haversine_km(position(prev), position(record));
                cumulative += step_km;
                let dt = elapsed_seconds(&prev.timestamp, &record.timestamp)
                    .max(MIN_STEP_SECONDS);
                step_km / dt as f64 * 3600.0
            }
        };
        points.push(EnrichedRecord {
            record: record.clone(),
            cumulative_distance_km: cumulative,
            speed_kmh: speed,
        });
    }

    let altitude_bounds = altitude_bounds(records);
    let summary = summarize(&points);
    HikeTrack {
        points,
        altitude_bounds,
        summary,
    }
}

pub fn altitude_bounds(records: &[Record]) -> AltitudeBounds {
    let mut altitudes = records.iter().map(|r| r.altitude);
    let Some(first) = altitudes.next() else {
        return AltitudeBounds::default();
    };
    altitudes.fold(
        AltitudeBounds {
            min: first,
            max: first,
        },
        |b, alt| AltitudeBounds {
            min: b.min.min(alt),
            max: b.max.max(alt),
        },
    )
}

fn summarize(points: &[EnrichedRecord]) -> TrackSummary {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return TrackSummary::default();
    };
    let total_distance_km = last.cumulative_distance_km;
    let elapsed = elapsed_seconds(&first.record.timestamp, &last.record.timestamp).max(0);
    let max_speed_kmh = points.iter().map(|p| p.speed_kmh).fold(0.0, f64::max);

    TrackSummary {
        point_count: points.len(),
        total_distance_km,
        elapsed_seconds: elapsed,
        max_speed_kmh,
        average_speed_kmh: total_distance_km / elapsed.max(MIN_STEP_SECONDS) as f64
            * 3600.0,
    }
}
