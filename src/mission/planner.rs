use crate::common::{
    geo::{bearing_deg, orbit_position, METERS_PER_DEGREE},
    ControlMode, FlightCommand, MissionMode, Position, ThreatLevel, Velocity,
};
use crate::config::PatrolConfig;
use crate::navigation::{Guidance, NavigationEngine};
use crate::{alert, info, log};
use chrono::{DateTime, Utc};

/// Threat-level driven mission state machine.
///
/// The mode is a pure function of the last reported [`ThreatLevel`]; every
/// report is applied immediately without debouncing.
#[derive(Debug, Clone)]
pub struct MissionPlanner {
    patrol: PatrolConfig,
    mode: MissionMode,
    threat_level: ThreatLevel,
    threat_location: Option<Position>,
}

impl MissionPlanner {
    /// Speed of an avoidance displacement in m/s.
    const AVOIDANCE_SPEED: f64 = 5.0;

    pub fn new(patrol: PatrolConfig) -> Self {
        Self {
            patrol,
            mode: MissionMode::Patrol,
            threat_level: ThreatLevel::Green,
            threat_location: None,
        }
    }

    /// Applies a threat report and switches to the mode mapped to `level`.
    ///
    /// # Returns
    /// The new [`MissionMode`].
    pub fn update_mission(&mut self, level: ThreatLevel, location: Position) -> MissionMode {
        let mode = MissionMode::from(level);
        if mode != self.mode {
            if level >= ThreatLevel::Red {
                alert!("Mission mode {} -> {mode} ({}).", self.mode, level.description());
            } else {
                info!("Mission mode {} -> {mode} ({}).", self.mode, level.description());
            }
        }
        self.threat_level = level;
        self.threat_location = Some(location);
        self.mode = mode;
        mode
    }

    pub fn current_mode(&self) -> MissionMode { self.mode }

    pub fn threat_level(&self) -> ThreatLevel { self.threat_level }

    pub fn threat_location(&self) -> Option<Position> { self.threat_location }

    pub fn patrol(&self) -> &PatrolConfig { &self.patrol }

    pub fn set_patrol_area(&mut self, center: Position, radius: f64) {
        log!("Patrol area set to {center} with radius {radius}m.");
        self.patrol.center = center;
        self.patrol.radius = radius;
    }

    pub fn set_patrol_altitude(&mut self, altitude: f64) { self.patrol.altitude = altitude; }

    pub fn set_patrol_speed(&mut self, speed: f64) { self.patrol.speed = speed; }

    /// Derives the command for the current tick.
    ///
    /// An active avoidance displacement wins over pending waypoints, which win
    /// over the guard position of the active mode.
    ///
    /// # Arguments
    /// - `nav`: Navigation engine providing the vehicle position and guard geometry.
    /// - `now`: Time used to phase the rotating orbits.
    pub fn get_current_commands(&self, nav: &NavigationEngine, now: DateTime<Utc>) -> FlightCommand {
        let current = nav.current_position();
        if let Some(escape) = nav.avoidance_target() {
            return Self::steer(current, escape, Self::AVOIDANCE_SPEED, ControlMode::VelocityControl);
        }
        if let Some(waypoint) = nav.active_waypoint() {
            return Self::steer(current, waypoint, self.patrol.speed, ControlMode::AutoMission);
        }
        let threat_location = self.threat_location.unwrap_or(self.patrol.center);
        match nav.guidance_for(self.mode, &threat_location, now) {
            Some(Guidance { position, speed }) => {
                Self::steer(current, position, speed, ControlMode::PositionHold)
            }
            None => {
                let target = orbit_position(&self.patrol.center, self.patrol.radius, now)
                    .with_altitude(self.patrol.altitude);
                Self::steer(current, target, self.patrol.speed, ControlMode::AutoMission)
            }
        }
    }

    fn steer(current: Position, target: Position, speed: f64, mode: ControlMode) -> FlightCommand {
        let north = (target.latitude - current.latitude) * METERS_PER_DEGREE;
        let east = (target.longitude - current.longitude) * METERS_PER_DEGREE;
        let up = target.altitude - current.altitude;
        let norm = (north * north + east * east + up * up).sqrt();
        let target_velocity = if norm > f64::EPSILON {
            let scale = speed / norm;
            Velocity { x: north * scale, y: east * scale, z: up * scale }
        } else {
            Velocity::default()
        };
        FlightCommand {
            target_position: target,
            target_yaw: bearing_deg(&current, &target).to_radians(),
            target_velocity,
            mode,
            emergency_stop: false,
            return_to_launch: false,
        }
    }
}
