use super::geo::{bearing_deg, haversine_distance, orbit_position, ORBIT_PERIOD_S};
use super::{MissionMode, Position, ThreatLevel};
use chrono::{TimeDelta, Utc};
use itertools::Itertools;
use rand::Rng;
use strum::IntoEnumIterator;

const EPS: f64 = 1e-6;

fn get_rand_pos() -> Position {
    let mut rng = rand::rng();
    Position::new(
        rng.random_range(-80.0..80.0),
        rng.random_range(-179.0..179.0),
        rng.random_range(0.0..120.0),
    )
}

#[test]
fn test_haversine_symmetric() {
    for _ in 0..200 {
        let a = get_rand_pos();
        let b = get_rand_pos();
        let d_ab = haversine_distance(&a, &b);
        let d_ba = haversine_distance(&b, &a);
        assert!((d_ab - d_ba).abs() < EPS, "d(A,B)={d_ab} d(B,A)={d_ba}");
    }
}

#[test]
fn test_haversine_zero_iff_equal() {
    for _ in 0..200 {
        let a = get_rand_pos();
        assert!(haversine_distance(&a, &a).abs() < EPS);
        let b = Position::new(a.latitude + 0.0001, a.longitude, a.altitude);
        assert!(haversine_distance(&a, &b) > 1.0);
    }
    let a = Position::new(40.7128, -74.0060, 0.0);
    assert!(haversine_distance(&a, &a.with_altitude(90.0)).abs() < EPS);
}

#[test]
fn test_haversine_one_degree_latitude() {
    let d = haversine_distance(&Position::new(35.0, 139.0, 0.0), &Position::new(36.0, 139.0, 0.0));
    assert!((d - 111_195.0).abs() < 100.0, "one degree of latitude was {d}m");
}

#[test]
fn test_bearing_cardinal_directions() {
    let origin = Position::new(35.0, 139.0, 0.0);
    let north = bearing_deg(&origin, &Position::new(36.0, 139.0, 0.0));
    let east = bearing_deg(&origin, &Position::new(35.0, 140.0, 0.0));
    let south = bearing_deg(&origin, &Position::new(34.0, 139.0, 0.0));
    let west = bearing_deg(&origin, &Position::new(35.0, 138.0, 0.0));
    assert!(north < 1.0 || north > 359.0);
    assert!((east - 90.0).abs() < 1.0);
    assert!((south - 180.0).abs() < 1.0);
    assert!((west - 270.0).abs() < 1.0);
}

#[test]
fn test_orbit_stays_on_radius_and_rotates() {
    let center = Position::new(40.7128, -74.0060, 20.0);
    let radius = 12.0;
    let now = Utc::now();
    let lat_scale = center.latitude.to_radians().cos();
    for step in 0..12 {
        let t = now + TimeDelta::seconds(step * 5);
        let p = orbit_position(&center, radius, t);
        let d = haversine_distance(&center, &p);
        // 111 000 m per degree undershoots the haversine degree by ~0.2 %.
        assert!(d <= radius * 1.01, "orbit point {p} at {d}m exceeds {radius}m");
        assert!(d >= radius * lat_scale - 0.01, "orbit point {p} at {d}m collapsed");
    }
    let first = orbit_position(&center, radius, now);
    let quarter = orbit_position(&center, radius, now + TimeDelta::seconds(15));
    #[allow(clippy::cast_possible_truncation)]
    let full = orbit_position(&center, radius, now + TimeDelta::seconds(ORBIT_PERIOD_S as i64));
    assert!(haversine_distance(&first, &quarter) > 1.0);
    assert!(haversine_distance(&first, &full) < 0.01);
}

#[test]
fn test_threat_level_to_mission_mode() {
    let expected = [
        (ThreatLevel::Green, MissionMode::Patrol),
        (ThreatLevel::Yellow, MissionMode::EnhancedWatch),
        (ThreatLevel::Orange, MissionMode::Defensive),
        (ThreatLevel::Red, MissionMode::ActiveProtection),
        (ThreatLevel::Omega, MissionMode::OmegaProtocol),
    ];
    for (level, mode) in expected {
        assert_eq!(MissionMode::from(level), mode);
    }
}

#[test]
fn test_threat_profiles_monotonic() {
    for (lower, higher) in ThreatLevel::iter().tuple_windows() {
        assert!(lower < higher);
        let (p_low, p_high) = (lower.profile(), higher.profile());
        assert!(p_high.orbit_radius_m <= p_low.orbit_radius_m, "{lower} -> {higher} radius grew");
        assert!(p_high.max_speed_mps >= p_low.max_speed_mps, "{lower} -> {higher} speed fell");
        assert!(p_high.guard_altitude_m >= p_low.guard_altitude_m);
    }
    let omega = ThreatLevel::Omega.profile();
    assert!((omega.orbit_radius_m - 3.0).abs() < EPS);
    assert!((omega.max_speed_mps - 25.0).abs() < EPS);
    assert!((ThreatLevel::Green.profile().guard_altitude_m - 10.0).abs() < EPS);
}

#[test]
fn test_threat_level_parse_and_names() {
    assert_eq!(ThreatLevel::parse("omega"), Some(ThreatLevel::Omega));
    assert_eq!(ThreatLevel::parse(" 3 "), Some(ThreatLevel::Red));
    assert_eq!(ThreatLevel::parse("YELLOW"), Some(ThreatLevel::Yellow));
    assert_eq!(ThreatLevel::parse("purple"), None);
    assert_eq!(ThreatLevel::Orange.to_string(), "ORANGE");
    assert_eq!(MissionMode::OmegaProtocol.to_string(), "OMEGA_PROTOCOL");
}
