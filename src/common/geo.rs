//! Geodesic helpers. Haversine is the single distance primitive used for orbit
//! maintenance, collision checks and waypoint arrival; short-range offsets use
//! the equirectangular approximation.

use super::Position;
use chrono::{DateTime, Utc};
use std::f64::consts::PI;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
/// Meters per degree used for short-range offsets.
pub const METERS_PER_DEGREE: f64 = 111_000.0;
/// Period of one protective orbit revolution in seconds.
pub const ORBIT_PERIOD_S: f64 = 60.0;

/// Great-circle distance between two positions in meters. Altitude is ignored.
pub fn haversine_distance(a: &Position, b: &Position) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    EARTH_RADIUS_M * c
}

/// Initial bearing from `from` to `to` in degrees, normalized to 0..360.
pub fn bearing_deg(from: &Position, to: &Position) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Shifts `origin` by the given north/east displacement in meters.
pub fn offset(origin: &Position, north_m: f64, east_m: f64) -> Position {
    Position {
        latitude: origin.latitude + north_m / METERS_PER_DEGREE,
        longitude: origin.longitude + east_m / METERS_PER_DEGREE,
        altitude: origin.altitude,
    }
}

/// Orbit phase angle in radians at time `t`, one full revolution per [`ORBIT_PERIOD_S`].
#[allow(clippy::cast_precision_loss)]
pub fn orbit_angle(t: DateTime<Utc>) -> f64 {
    let secs = t.timestamp_millis() as f64 / 1000.0;
    (secs.rem_euclid(ORBIT_PERIOD_S)) * (2.0 * PI / ORBIT_PERIOD_S)
}

/// Continuously rotating guard position on a circle of `radius_m` around `center`.
pub fn orbit_position(center: &Position, radius_m: f64, t: DateTime<Utc>) -> Position {
    let angle = orbit_angle(t);
    offset(center, radius_m * angle.cos(), radius_m * angle.sin())
}
