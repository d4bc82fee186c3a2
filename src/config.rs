use crate::common::Position;
use serde::{Deserialize, Serialize};
use std::{env, time::Duration};

/// Periods of the four control loops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopRates {
    pub flight_control: Duration,
    pub navigation: Duration,
    pub safety: Duration,
    pub telemetry: Duration,
}

impl Default for LoopRates {
    fn default() -> Self {
        Self {
            flight_control: Duration::from_millis(10),
            navigation: Duration::from_millis(33),
            safety: Duration::from_millis(100),
            telemetry: Duration::from_millis(1000),
        }
    }
}

/// Envelope limits evaluated by the safety monitor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyThresholds {
    /// Battery percentage below which the battery is flagged unhealthy.
    pub battery_warning: f64,
    /// Maximum age of the last successful sensor read.
    pub communication_timeout: Duration,
    pub max_flight_time: Duration,
    /// Maximum altitude above ground in meters.
    pub max_altitude: f64,
    /// Minimum commanded altitude above ground while airborne.
    pub min_altitude: f64,
    pub min_satellites: u8,
    /// Consecutive failed command executions before the motors are flagged.
    pub fault_tolerance: u32,
    /// Board processor load in percent considered an overload.
    pub board_load_limit: f64,
}

impl Default for SafetyThresholds {
    fn default() -> Self {
        Self {
            battery_warning: 20.0,
            communication_timeout: Duration::from_secs(2),
            max_flight_time: Duration::from_secs(30 * 60),
            max_altitude: 120.0,
            min_altitude: 2.0,
            min_satellites: 6,
            fault_tolerance: 3,
            board_load_limit: 90.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatrolConfig {
    pub center: Position,
    /// Patrol circle radius in meters.
    pub radius: f64,
    pub altitude: f64,
    /// Patrol speed in m/s.
    pub speed: f64,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self { center: Position::new(40.7128, -74.0060, 100.0), radius: 100.0, altitude: 100.0, speed: 10.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Obstacles closer than this distance in meters constitute a collision risk.
    pub collision_radius_m: f64,
    /// Horizontal displacement of an avoidance maneuver in meters.
    pub avoidance_distance_m: f64,
    /// Distance in meters at which a waypoint counts as reached.
    pub arrival_radius_m: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self { collision_radius_m: 5.0, avoidance_distance_m: 10.0, arrival_radius_m: 2.0 }
    }
}

/// Complete configuration of the control core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    pub rates: LoopRates,
    pub safety: SafetyThresholds,
    pub patrol: PatrolConfig,
    pub navigation: NavigationConfig,
    pub command_queue_depth: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            rates: LoopRates::default(),
            safety: SafetyThresholds::default(),
            patrol: PatrolConfig::default(),
            navigation: NavigationConfig::default(),
            command_queue_depth: 32,
        }
    }
}

impl CoreConfig {
    /// Builds the default configuration and overlays the `PHOENIX_*` environment variables
    /// that are set and parse cleanly.
    pub fn from_env() -> Self { Self::from_lookup(|key| env::var(key).ok()) }

    /// Same as [`CoreConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str| {
            lookup(key).and_then(|v| v.trim().parse::<f64>().ok()).filter(|v| v.is_finite())
        };
        let secs = |key: &str, per_sec: f64| {
            parse(key).and_then(|v| Duration::try_from_secs_f64(v / per_sec).ok())
        };
        let mut config = Self::default();
        if let Some(v) = parse("PHOENIX_BATTERY_WARNING") {
            config.safety.battery_warning = v;
        }
        if let Some(v) = parse("PHOENIX_MAX_ALTITUDE") {
            config.safety.max_altitude = v;
        }
        if let Some(v) = secs("PHOENIX_MAX_FLIGHT_TIME_S", 1.0) {
            config.safety.max_flight_time = v;
        }
        if let Some(v) = parse("PHOENIX_PATROL_ALTITUDE") {
            config.patrol.altitude = v;
        }
        if let Some(v) = secs("PHOENIX_TELEMETRY_MS", 1000.0) {
            config.rates.telemetry = v;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::CoreConfig;
    use std::collections::HashMap;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.rates.flight_control, Duration::from_millis(10));
        assert_eq!(config.rates.navigation, Duration::from_millis(33));
        assert_eq!(config.rates.safety, Duration::from_millis(100));
        assert_eq!(config.rates.telemetry, Duration::from_secs(1));
        assert!((config.safety.battery_warning - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.safety.min_satellites, 6);
        assert!(config.command_queue_depth > 0);
    }

    #[test]
    fn test_lookup_overlays_valid_values_only() {
        let vars = HashMap::from([
            ("PHOENIX_BATTERY_WARNING", " 25 "),
            ("PHOENIX_MAX_ALTITUDE", "not a number"),
            ("PHOENIX_MAX_FLIGHT_TIME_S", "600"),
            ("PHOENIX_TELEMETRY_MS", "250"),
            ("PHOENIX_PATROL_ALTITUDE", "-1e999"),
        ]);
        let config = CoreConfig::from_lookup(|key| vars.get(key).map(ToString::to_string));
        let defaults = CoreConfig::default();
        assert!((config.safety.battery_warning - 25.0).abs() < f64::EPSILON);
        assert!((config.safety.max_altitude - defaults.safety.max_altitude).abs() < f64::EPSILON);
        assert_eq!(config.safety.max_flight_time, Duration::from_secs(600));
        assert_eq!(config.rates.telemetry, Duration::from_millis(250));
        assert!((config.patrol.altitude - defaults.patrol.altitude).abs() < f64::EPSILON);
        assert_eq!(config.rates.flight_control, defaults.rates.flight_control);
    }
}
