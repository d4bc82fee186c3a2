//! Shared value types, the threat-level table and the geodesic primitives
//! used by every subsystem.

pub mod geo;
mod threat;
mod types;

#[cfg(test)]
mod tests;

pub use threat::{MissionMode, ThreatLevel, ThreatProfile};
pub use types::{
    Attitude, ControlMode, FlightCommand, FlightStatus, NavigationStatus, Position,
    ProtectionTarget, SensorData, SystemHealth, TelemetryPacket, Velocity,
};
