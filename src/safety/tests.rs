use super::{SafetyMonitor, SafetyVerdict};
use crate::common::{FlightStatus, Position, SensorData};
use crate::config::SafetyThresholds;
use crate::status_store::VehicleState;
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use std::time::Duration;

fn sensors(battery: f64, now: DateTime<Utc>) -> SensorData {
    SensorData {
        accel: [0.0, 0.0, -9.81],
        gyro: [0.0; 3],
        mag: [0.22, 0.0, 0.42],
        gps_position: Position::new(40.7128, -74.0060, 30.0),
        gps_fix: true,
        satellites: 12,
        gps_accuracy: 1.5,
        pressure: 101_000.0,
        temperature: 19.8,
        voltage: 12.0,
        current: 18.0,
        remaining: battery,
        board_load: 30.0,
        board_memory: 40.0,
        timestamp: now,
    }
}

fn airborne_state(battery: f64, now: DateTime<Utc>) -> VehicleState {
    VehicleState {
        flight: FlightStatus {
            armed: true,
            in_flight: true,
            position: Position::new(40.7128, -74.0060, 30.0),
            ..FlightStatus::default()
        },
        sensors: Some(sensors(battery, now)),
        last_sensor_read: Some(now),
        ..VehicleState::default()
    }
}

#[test]
fn test_nominal_health() {
    let mut monitor = SafetyMonitor::new(SafetyThresholds::default());
    let now = Utc::now();
    let assessment = monitor.assess(&airborne_state(80.0, now), now);
    assert!(!assessment.health.critical_failure);
    assert!(!assessment.health.degraded_performance);
    assert_eq!(assessment.health.status_message, "All systems nominal");
    assert!(assessment.verdict.is_clear());
    assert!(monitor.is_safe_to_fly());
    assert!(!monitor.requires_immediate_landing());
}

#[test]
fn test_battery_tiers() {
    let mut monitor = SafetyMonitor::new(SafetyThresholds::default());
    let now = Utc::now();

    let warn = monitor.check_system_health(&airborne_state(18.0, now), now);
    assert!(!warn.battery_healthy && warn.degraded_performance && !warn.critical_failure);
    assert!(!monitor.requires_immediate_landing());

    let critical = monitor.check_system_health(&airborne_state(14.0, now), now);
    assert!(critical.critical_failure);
    assert!(critical.status_message.starts_with("CRITICAL"));
    assert!(!monitor.is_safe_to_fly());
    assert!(monitor.requires_immediate_landing());
}

#[test]
fn test_landing_below_ten_percent_ignores_warning_threshold() {
    let mut rng = rand::rng();
    let mut monitor = SafetyMonitor::new(SafetyThresholds::default());
    monitor.set_battery_warning_threshold(5.0);
    let now = Utc::now();
    for _ in 0..50 {
        let battery = rng.random_range(0.0..10.0);
        let assessment = monitor.assess(&airborne_state(battery, now), now);
        assert!(assessment.verdict.requires_immediate_landing, "battery {battery}");
    }
}

#[test]
fn test_gps_loss_demands_altitude_hold() {
    let mut monitor = SafetyMonitor::new(SafetyThresholds::default());
    let now = Utc::now();
    let mut state = airborne_state(80.0, now);
    if let Some(s) = state.sensors.as_mut() {
        s.satellites = 5;
    }
    let assessment = monitor.assess(&state, now);
    assert!(!assessment.health.gps_healthy);
    assert!(assessment.verdict.altitude_hold);
    assert!(!assessment.verdict.requires_immediate_landing);

    state.flight.in_flight = false;
    assert!(!monitor.assess(&state, now).verdict.altitude_hold);
}

#[test]
fn test_stale_sensor_link_degrades() {
    let mut monitor = SafetyMonitor::new(SafetyThresholds::default());
    monitor.set_communication_timeout(Duration::from_millis(500));
    let now = Utc::now();
    let state = airborne_state(80.0, now);
    assert!(monitor.check_system_health(&state, now).communication_healthy);
    let later = now + TimeDelta::seconds(1);
    let health = monitor.check_system_health(&state, later);
    assert!(!health.communication_healthy && health.degraded_performance);
}

#[test]
fn test_no_sensor_sample_within_grace_period() {
    let mut monitor = SafetyMonitor::new(SafetyThresholds::default());
    let now = Utc::now();
    let state = VehicleState::default();
    assert!(!monitor.check_system_health(&state, now).degraded_performance);
    let health = monitor.check_system_health(&state, now + TimeDelta::seconds(3));
    assert!(!health.communication_healthy);
}

#[test]
fn test_repeated_execute_failures_are_critical() {
    let mut monitor = SafetyMonitor::new(SafetyThresholds::default());
    let now = Utc::now();
    let mut state = airborne_state(80.0, now);
    state.execute_faults = 2;
    assert!(monitor.check_system_health(&state, now).motors_healthy);
    state.execute_faults = 3;
    let health = monitor.check_system_health(&state, now);
    assert!(!health.motors_healthy && health.critical_failure);
}

#[test]
fn test_board_overload_and_imu_garbage_degrade() {
    let mut monitor = SafetyMonitor::new(SafetyThresholds::default());
    let now = Utc::now();
    let mut state = airborne_state(80.0, now);
    if let Some(s) = state.sensors.as_mut() {
        s.board_load = 95.0;
    }
    let health = monitor.check_system_health(&state, now);
    assert!(health.degraded_performance && !health.critical_failure);
    assert!((health.cpu_load - 95.0).abs() < 1e-9);

    let mut state = airborne_state(80.0, now);
    if let Some(s) = state.sensors.as_mut() {
        s.gyro[1] = f64::NAN;
    }
    assert!(!monitor.check_system_health(&state, now).imu_healthy);
}

#[test]
fn test_ceiling_breach_descends_below_max() {
    let mut monitor = SafetyMonitor::new(SafetyThresholds::default());
    let now = Utc::now();
    let mut state = airborne_state(80.0, now);
    state.flight.position.altitude = 130.0;
    let verdict = monitor.assess(&state, now).verdict;
    assert_eq!(verdict, SafetyVerdict { descend_to: Some(110.0), ..SafetyVerdict::default() });
}

#[test]
fn test_max_flight_time_returns_to_launch() {
    let mut monitor = SafetyMonitor::new(SafetyThresholds::default());
    monitor.set_max_flight_time(Duration::from_secs(60));
    let now = Utc::now();
    let state = airborne_state(80.0, now);
    assert!(!monitor.assess(&state, now).verdict.return_to_launch);

    let later = now + TimeDelta::seconds(61);
    let mut fresh = airborne_state(80.0, later);
    assert!(monitor.assess(&fresh, later).verdict.return_to_launch);

    fresh.flight.in_flight = false;
    assert!(!monitor.assess(&fresh, later).verdict.return_to_launch);
}

#[test]
fn test_degraded_onset_fires_once() {
    let mut monitor = SafetyMonitor::new(SafetyThresholds::default());
    let now = Utc::now();
    let low = airborne_state(18.0, now);
    let onsets = (0..5).filter(|_| monitor.assess(&low, now).degraded_onset).count();
    assert_eq!(onsets, 1);

    assert!(!monitor.assess(&airborne_state(80.0, now), now).degraded_onset);
    assert!(monitor.assess(&low, now).degraded_onset);
}
