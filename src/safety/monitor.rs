use crate::common::{SensorData, SystemHealth};
use crate::config::SafetyThresholds;
use crate::status_store::VehicleState;
use crate::{alert, log, warn};
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Interventions demanded by the latest safety evaluation, in descending priority.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct SafetyVerdict {
    pub requires_immediate_landing: bool,
    /// Ceiling breach: descend to this altitude before anything else.
    pub descend_to: Option<f64>,
    /// GPS quality too poor for horizontal navigation.
    pub altitude_hold: bool,
    /// Maximum flight time exceeded.
    pub return_to_launch: bool,
}

impl SafetyVerdict {
    pub fn is_clear(&self) -> bool { *self == Self::default() }
}

/// Outcome of one safety tick.
#[derive(Debug, Clone)]
pub struct SafetyAssessment {
    pub health: SystemHealth,
    pub verdict: SafetyVerdict,
    /// `true` only on the tick where degraded performance first appears.
    pub degraded_onset: bool,
}

/// Evaluates vehicle health against the configured [`SafetyThresholds`].
#[derive(Debug)]
pub struct SafetyMonitor {
    thresholds: SafetyThresholds,
    last_health: SystemHealth,
    monitoring_since: Option<DateTime<Utc>>,
    airborne_since: Option<DateTime<Utc>>,
}

impl SafetyMonitor {
    /// Battery percentage below which an emergency landing begins.
    const CRITICAL_BATTERY: f64 = 15.0;
    /// Battery percentage below which landing is mandatory regardless of any other flag.
    const LANDING_BATTERY: f64 = 10.0;
    /// Distance below the ceiling a breaching vehicle descends to, in meters.
    const CEILING_MARGIN: f64 = 10.0;
    /// Acceleration magnitude no airframe should report, 4 g.
    const MAX_PLAUSIBLE_ACCEL: f64 = 4.0 * 9.81;

    pub fn new(thresholds: SafetyThresholds) -> Self {
        Self {
            thresholds,
            last_health: SystemHealth::default(),
            monitoring_since: None,
            airborne_since: None,
        }
    }

    pub fn thresholds(&self) -> &SafetyThresholds { &self.thresholds }

    pub fn last_health(&self) -> &SystemHealth { &self.last_health }

    pub fn set_battery_warning_threshold(&mut self, percent: f64) {
        self.thresholds.battery_warning = percent;
    }

    pub fn set_communication_timeout(&mut self, timeout: Duration) {
        self.thresholds.communication_timeout = timeout;
    }

    pub fn set_max_flight_time(&mut self, max_flight_time: Duration) {
        self.thresholds.max_flight_time = max_flight_time;
    }

    /// Evaluates all subsystems and stores the result as the latest health.
    ///
    /// # Arguments
    /// - `state`: Snapshot of the shared vehicle state.
    /// - `now`: Evaluation time, used for the communication freshness check.
    ///
    /// # Returns
    /// The freshly computed [`SystemHealth`].
    pub fn check_system_health(&mut self, state: &VehicleState, now: DateTime<Utc>) -> SystemHealth {
        let since = *self.monitoring_since.get_or_insert(now);
        let t = &self.thresholds;
        let mut issues = Vec::new();

        let last_contact = state.last_sensor_read.unwrap_or(since);
        let communication_healthy = now.signed_duration_since(last_contact)
            <= TimeDelta::from_std(t.communication_timeout).unwrap_or(TimeDelta::MAX);
        if !communication_healthy {
            issues.push(String::from("sensor link timed out"));
        }

        let (gps_healthy, imu_healthy, battery_percentage, cpu_load, memory_usage) =
            match &state.sensors {
                Some(s) => (
                    s.gps_fix && s.satellites >= t.min_satellites,
                    Self::imu_plausible(s),
                    s.remaining,
                    s.board_load,
                    s.board_memory,
                ),
                None => (true, true, self.last_health.battery_percentage, 0.0, 0.0),
            };
        if !gps_healthy {
            issues.push(String::from("GPS fix lost or too few satellites"));
        }
        if !imu_healthy {
            issues.push(String::from("implausible IMU readings"));
        }

        let battery_healthy = battery_percentage >= t.battery_warning;
        if !battery_healthy {
            issues.push(format!("battery low ({battery_percentage:.1}%)"));
        }
        let motors_healthy = state.execute_faults < t.fault_tolerance;
        if !motors_healthy {
            issues.push(format!("{} consecutive command failures", state.execute_faults));
        }
        let overloaded = cpu_load > t.board_load_limit;
        if overloaded {
            issues.push(format!("board overloaded ({cpu_load:.0}%)"));
        }

        let critical_failure = battery_percentage < Self::CRITICAL_BATTERY || !motors_healthy;
        let degraded_performance = !gps_healthy
            || !imu_healthy
            || !communication_healthy
            || !battery_healthy
            || overloaded;

        let status_message = if issues.is_empty() {
            String::from("All systems nominal")
        } else if critical_failure {
            format!("CRITICAL: {}", issues.join("; "))
        } else {
            issues.join("; ")
        };

        self.last_health = SystemHealth {
            gps_healthy,
            imu_healthy,
            battery_healthy,
            communication_healthy,
            motors_healthy,
            battery_percentage,
            cpu_load,
            memory_usage,
            critical_failure,
            degraded_performance,
            status_message,
        };
        self.last_health.clone()
    }

    pub fn is_safe_to_fly(&self) -> bool { !self.last_health.critical_failure }

    pub fn requires_immediate_landing(&self) -> bool {
        self.last_health.critical_failure
            || self.last_health.battery_percentage < Self::LANDING_BATTERY
    }

    /// Runs one safety tick: health evaluation followed by the envelope checks.
    pub fn assess(&mut self, state: &VehicleState, now: DateTime<Utc>) -> SafetyAssessment {
        let was_critical = self.last_health.critical_failure;
        let was_degraded = self.last_health.degraded_performance;
        let health = self.check_system_health(state, now);

        if health.critical_failure && !was_critical {
            alert!("Critical failure: {}", health.status_message);
        }
        let degraded_onset = health.degraded_performance && !was_degraded;
        if degraded_onset {
            warn!("Degraded performance: {}", health.status_message);
        } else if was_degraded && !health.degraded_performance {
            log!("Performance restored, all subsystems healthy.");
        }

        let flight = &state.flight;
        let airborne_for = if flight.in_flight {
            let since = *self.airborne_since.get_or_insert(now);
            now.signed_duration_since(since)
        } else {
            self.airborne_since = None;
            TimeDelta::zero()
        };
        let max_flight_time =
            TimeDelta::from_std(self.thresholds.max_flight_time).unwrap_or(TimeDelta::MAX);

        let verdict = SafetyVerdict {
            requires_immediate_landing: self.requires_immediate_landing(),
            descend_to: (flight.in_flight && flight.position.altitude > self.thresholds.max_altitude)
                .then(|| self.thresholds.max_altitude - Self::CEILING_MARGIN),
            altitude_hold: flight.in_flight && !health.gps_healthy,
            return_to_launch: airborne_for > max_flight_time,
        };
        SafetyAssessment { health, verdict, degraded_onset }
    }

    fn imu_plausible(sensors: &SensorData) -> bool {
        let finite =
            sensors.accel.iter().chain(&sensors.gyro).chain(&sensors.mag).all(|v| v.is_finite());
        let magnitude = sensors.accel.iter().map(|a| a * a).sum::<f64>().sqrt();
        finite && magnitude <= Self::MAX_PLAUSIBLE_ACCEL
    }
}
