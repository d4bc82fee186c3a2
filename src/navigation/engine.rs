use super::proximity::ProximitySensor;
use crate::common::{
    geo::{bearing_deg, haversine_distance, offset, orbit_position, METERS_PER_DEGREE},
    MissionMode, NavigationStatus, Position, ProtectionTarget, ThreatLevel,
};
use crate::config::NavigationConfig;
use crate::{alert, event, info, log, warn};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use strum_macros::Display;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum NavigationError {
    SensorUnavailable,
}

impl std::error::Error for NavigationError {}

/// Target position together with the speed to approach it with.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Guidance {
    pub position: Position,
    /// Approach speed in m/s.
    pub speed: f64,
}

/// Computes guard positions around the protected target, tracks waypoints and
/// reacts to collision risks reported by the injected proximity sensor.
pub struct NavigationEngine {
    config: NavigationConfig,
    proximity: Arc<dyn ProximitySensor>,
    protected: Option<ProtectionTarget>,
    waypoints: VecDeque<Position>,
    avoidance: Option<Position>,
    status: NavigationStatus,
}

impl NavigationEngine {
    /// Half-width of the orbit-maintenance band in meters.
    const ORBIT_BAND_M: f64 = 5.0;
    const APPROACH_FACTOR: f64 = 0.7;
    const BACK_OFF_FACTOR: f64 = 0.5;
    const STATION_FACTOR: f64 = 0.3;
    const AVOIDANCE_CLIMB_M: f64 = 3.0;
    const EVASIVE_CLIMB_M: f64 = 10.0;
    /// Spiral offset of an evasive maneuver in degrees (~11 m).
    const EVASIVE_OFFSET_DEG: f64 = 0.0001;

    pub fn new(config: NavigationConfig, proximity: Arc<dyn ProximitySensor>) -> Self {
        Self {
            config,
            proximity,
            protected: None,
            waypoints: VecDeque::new(),
            avoidance: None,
            status: NavigationStatus::default(),
        }
    }

    pub fn initialize(&mut self) -> Result<(), NavigationError> {
        if !self.proximity.is_available() {
            return Err(NavigationError::SensorUnavailable);
        }
        info!("Navigation engine initialized.");
        Ok(())
    }

    pub fn status(&self) -> NavigationStatus { self.status }

    pub fn current_position(&self) -> Position { self.status.current_position }

    pub fn protected_target(&self) -> Option<&ProtectionTarget> { self.protected.as_ref() }

    pub fn set_protected_target(&mut self, target: Option<ProtectionTarget>) {
        match &target {
            Some(t) => info!(
                "Protection target {} set at {} with radius {}m.",
                t.id, t.position, t.protection_radius
            ),
            None => info!("Protection target cleared."),
        }
        self.protected = target;
    }

    /// Updates the position of a moving protection target. Stationary targets are left in place.
    ///
    /// # Returns
    /// `true` if a moving target was relocated.
    pub fn move_protected_target(&mut self, position: Position) -> bool {
        match self.protected.as_mut() {
            Some(target) if target.is_moving => {
                target.position = position;
                true
            }
            Some(target) => {
                warn!("Protection target {} is stationary, ignoring move to {position}.", target.id);
                false
            }
            None => false,
        }
    }

    /// Guard position for ENHANCED_WATCH.
    pub fn protective_position(&self, threat_location: &Position, now: DateTime<Utc>) -> Guidance {
        self.orbit_guidance(ThreatLevel::Yellow, threat_location, now)
    }

    /// Guard position for DEFENSIVE: interposes on the line from the guard centre to the threat.
    pub fn intercept_position(&self, threat_location: &Position, now: DateTime<Utc>) -> Guidance {
        let profile = ThreatLevel::Orange.profile();
        let center = self.guard_center(threat_location);
        let d_lat = threat_location.latitude - center.latitude;
        let d_lon = threat_location.longitude - center.longitude;
        let norm = d_lat.hypot(d_lon);
        if norm * METERS_PER_DEGREE < f64::EPSILON.sqrt() {
            return self.orbit_guidance(ThreatLevel::Orange, threat_location, now);
        }
        let radius = self.effective_radius(profile.orbit_radius_m);
        let position = offset(&center, radius * d_lat / norm, radius * d_lon / norm)
            .with_altitude(profile.guard_altitude_m);
        Guidance { position, speed: self.band_speed(&center, radius, profile.max_speed_mps) }
    }

    /// Guard position for ACTIVE_PROTECTION.
    pub fn active_protection_position(
        &self,
        threat_location: &Position,
        now: DateTime<Utc>,
    ) -> Guidance {
        self.orbit_guidance(ThreatLevel::Red, threat_location, now)
    }

    /// Guard position for OMEGA_PROTOCOL: tightest orbit at the highest speed ceiling.
    pub fn omega_maneuver(&self, threat_location: &Position, now: DateTime<Utc>) -> Guidance {
        self.orbit_guidance(ThreatLevel::Omega, threat_location, now)
    }

    /// Dispatches to the guard computation of `mode`; `None` for PATROL.
    pub fn guidance_for(
        &self,
        mode: MissionMode,
        threat_location: &Position,
        now: DateTime<Utc>,
    ) -> Option<Guidance> {
        match mode {
            MissionMode::Patrol => None,
            MissionMode::EnhancedWatch => Some(self.protective_position(threat_location, now)),
            MissionMode::Defensive => Some(self.intercept_position(threat_location, now)),
            MissionMode::ActiveProtection => {
                Some(self.active_protection_position(threat_location, now))
            }
            MissionMode::OmegaProtocol => Some(self.omega_maneuver(threat_location, now)),
        }
    }

    pub fn detect_collision_risk(&self) -> bool {
        self.proximity
            .nearest_obstacle()
            .is_some_and(|o| o.distance_m < self.config.collision_radius_m)
    }

    /// Sets a displacement target directly away from the nearest obstacle. The
    /// displacement overrides every other target until it is reached.
    pub fn execute_avoidance_maneuver(&mut self) {
        let current = self.status.current_position;
        let (north, east) = match self.proximity.nearest_obstacle() {
            Some(obstacle) => {
                let away = (obstacle.bearing_deg + 180.0).to_radians();
                let d = self.config.avoidance_distance_m;
                (d * away.cos(), d * away.sin())
            }
            None => (0.0, 0.0),
        };
        let target = offset(&current, north, east)
            .with_altitude(current.altitude + Self::AVOIDANCE_CLIMB_M);
        alert!("Collision risk! Avoidance displacement to {target}.");
        self.avoidance = Some(target);
    }

    pub fn avoidance_target(&self) -> Option<Position> { self.avoidance }

    pub fn set_waypoints(&mut self, waypoints: Vec<Position>) {
        self.waypoints = waypoints.into();
    }

    pub fn add_waypoint(&mut self, waypoint: Position) { self.waypoints.push_back(waypoint); }

    pub fn clear_waypoints(&mut self) { self.waypoints.clear(); }

    pub fn active_waypoint(&self) -> Option<Position> { self.waypoints.front().copied() }

    pub fn waypoint_count(&self) -> usize { self.waypoints.len() }

    /// Climb followed by a four-point spiral around `current`.
    pub fn evasive_waypoints(current: &Position) -> Vec<Position> {
        let climbed = current.with_altitude(current.altitude + Self::EVASIVE_CLIMB_M);
        let mut waypoints = vec![climbed];
        for i in 0..4 {
            let angle = f64::from(i) * std::f64::consts::FRAC_PI_2;
            waypoints.push(Position {
                latitude: current.latitude + Self::EVASIVE_OFFSET_DEG * angle.cos(),
                longitude: current.longitude + Self::EVASIVE_OFFSET_DEG * angle.sin(),
                altitude: climbed.altitude,
            });
        }
        waypoints
    }

    /// Records the vehicle position, retires reached waypoints and avoidance
    /// targets and checks for collision risk.
    ///
    /// # Returns
    /// `true` if a collision risk was detected during this update.
    pub fn update_navigation(&mut self, current: Position) -> bool {
        self.status.current_position = current;
        self.status.waypoint_reached = false;

        if let Some(target) = self.avoidance {
            if haversine_distance(&current, &target) <= self.config.arrival_radius_m {
                log!("Avoidance displacement reached, resuming navigation.");
                self.avoidance = None;
            }
        }
        if let Some(waypoint) = self.waypoints.front() {
            if haversine_distance(&current, waypoint) <= self.config.arrival_radius_m {
                event!("Waypoint {waypoint} reached.");
                self.waypoints.pop_front();
                self.status.waypoint_reached = true;
            }
        }

        let risk = self.detect_collision_risk();
        self.status.collision_risk = risk;
        if risk && self.avoidance.is_none() {
            self.execute_avoidance_maneuver();
        }
        risk
    }

    /// Publishes the target selected for this tick and returns the new status.
    pub fn set_target(&mut self, target: Position) -> NavigationStatus {
        let current = self.status.current_position;
        self.status.target_position = target;
        self.status.distance_to_target = haversine_distance(&current, &target);
        self.status.bearing_to_target = bearing_deg(&current, &target);
        self.status
    }

    /// The protection target if one is set, otherwise the threat itself.
    fn guard_center(&self, threat_location: &Position) -> Position {
        self.protected.as_ref().map_or(*threat_location, |t| t.position)
    }

    fn effective_radius(&self, profile_radius: f64) -> f64 {
        self.protected
            .as_ref()
            .map_or(profile_radius, |t| profile_radius.min(t.protection_radius))
    }

    fn orbit_guidance(
        &self,
        level: ThreatLevel,
        threat_location: &Position,
        now: DateTime<Utc>,
    ) -> Guidance {
        let profile = level.profile();
        let center = self.guard_center(threat_location);
        let radius = self.effective_radius(profile.orbit_radius_m);
        let position = orbit_position(&center, radius, now).with_altitude(profile.guard_altitude_m);
        Guidance { position, speed: self.band_speed(&center, radius, profile.max_speed_mps) }
    }

    fn band_speed(&self, center: &Position, radius: f64, max_speed: f64) -> f64 {
        let distance = haversine_distance(&self.status.current_position, center);
        if distance > radius + Self::ORBIT_BAND_M {
            max_speed * Self::APPROACH_FACTOR
        } else if distance < radius - Self::ORBIT_BAND_M {
            max_speed * Self::BACK_OFF_FACTOR
        } else {
            max_speed * Self::STATION_FACTOR
        }
    }
}
