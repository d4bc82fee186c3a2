use super::threat::{MissionMode, ThreatLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Geodetic point: latitude/longitude in degrees, altitude in meters above ground.
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl Position {
    pub const fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self { latitude, longitude, altitude }
    }

    pub const fn with_altitude(self, altitude: f64) -> Self {
        Self { altitude, ..self }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.1}m)", self.latitude, self.longitude, self.altitude)
    }
}

/// NED velocity in m/s (x north, y east, z up).
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Velocity {
    pub fn magnitude(&self) -> f64 { (self.x.powi(2) + self.y.powi(2) + self.z.powi(2)).sqrt() }
}

/// Orientation in radians.
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Attitude {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// The entity the aircraft is guarding.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ProtectionTarget {
    pub id: String,
    pub position: Position,
    /// Radius of the guarded zone in meters.
    pub protection_radius: f64,
    pub is_moving: bool,
}

/// Aggregate vehicle state as observed by the flight-control loop.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct FlightStatus {
    pub armed: bool,
    pub in_flight: bool,
    pub position: Position,
    pub velocity: Velocity,
    pub attitude: Attitude,
    pub battery_voltage: f64,
    /// Estimated endurance in seconds.
    pub flight_time_remaining: f64,
    pub threat_level: ThreatLevel,
    pub mission_mode: MissionMode,
}

impl Default for FlightStatus {
    fn default() -> Self {
        Self {
            armed: false,
            in_flight: false,
            position: Position::default(),
            velocity: Velocity::default(),
            attitude: Attitude::default(),
            battery_voltage: 0.0,
            flight_time_remaining: 0.0,
            threat_level: ThreatLevel::Green,
            mission_mode: MissionMode::Patrol,
        }
    }
}

/// Raw instantaneous readings produced once per control tick.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct SensorData {
    /// Accelerometer, m/s².
    pub accel: [f64; 3],
    /// Gyroscope, rad/s.
    pub gyro: [f64; 3],
    /// Magnetometer, gauss.
    pub mag: [f64; 3],
    pub gps_position: Position,
    pub gps_fix: bool,
    pub satellites: u8,
    /// Horizontal GPS accuracy in meters.
    pub gps_accuracy: f64,
    /// Barometric pressure in Pa.
    pub pressure: f64,
    /// Temperature in °C.
    pub temperature: f64,
    pub voltage: f64,
    pub current: f64,
    /// Remaining battery charge in percent.
    pub remaining: f64,
    /// Processor load reported by the flight-controller board in percent.
    pub board_load: f64,
    /// Memory usage reported by the flight-controller board in percent.
    pub board_memory: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, Serialize, Deserialize)]
pub enum ControlMode {
    PositionHold,
    VelocityControl,
    Manual,
    AutoMission,
    AltitudeHold,
    EmergencyLand,
}

/// Desired next state handed to the actuation gateway.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct FlightCommand {
    pub target_position: Position,
    /// Target heading in radians.
    pub target_yaw: f64,
    pub target_velocity: Velocity,
    pub mode: ControlMode,
    pub emergency_stop: bool,
    pub return_to_launch: bool,
}

impl FlightCommand {
    pub fn position_hold(target_position: Position) -> Self {
        Self {
            target_position,
            target_yaw: 0.0,
            target_velocity: Velocity::default(),
            mode: ControlMode::PositionHold,
            emergency_stop: false,
            return_to_launch: false,
        }
    }

    /// Descend-and-disarm at the given position.
    pub fn emergency_land(current: Position) -> Self {
        Self {
            target_position: current.with_altitude(0.0),
            mode: ControlMode::EmergencyLand,
            emergency_stop: true,
            ..Self::position_hold(current)
        }
    }

    pub fn is_emergency_land(&self) -> bool { self.mode == ControlMode::EmergencyLand }
}

/// Subsystem diagnostics evaluated each safety tick.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    pub gps_healthy: bool,
    pub imu_healthy: bool,
    pub battery_healthy: bool,
    pub communication_healthy: bool,
    pub motors_healthy: bool,
    pub battery_percentage: f64,
    pub cpu_load: f64,
    pub memory_usage: f64,
    pub critical_failure: bool,
    pub degraded_performance: bool,
    pub status_message: String,
}

impl Default for SystemHealth {
    fn default() -> Self {
        Self {
            gps_healthy: true,
            imu_healthy: true,
            battery_healthy: true,
            communication_healthy: true,
            motors_healthy: true,
            battery_percentage: 100.0,
            cpu_load: 0.0,
            memory_usage: 0.0,
            critical_failure: false,
            degraded_performance: false,
            status_message: String::from("All systems nominal"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NavigationStatus {
    pub current_position: Position,
    pub target_position: Position,
    /// Great-circle distance to the target in meters.
    pub distance_to_target: f64,
    /// Initial bearing to the target in degrees, 0..360.
    pub bearing_to_target: f64,
    pub waypoint_reached: bool,
    pub collision_risk: bool,
}

/// Outbound status snapshot emitted once per telemetry tick.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TelemetryPacket {
    pub sequence: u64,
    pub flight_status: FlightStatus,
    pub navigation_status: NavigationStatus,
    pub system_health: SystemHealth,
    pub threat_level: ThreatLevel,
    pub timestamp: DateTime<Utc>,
}
