//! Boundary between the control core and the flight-controller hardware.
//!
//! The core only ever talks to an [`ActuationGateway`]; a serial/MAVLink adapter
//! and the [`SimulatedGateway`] are interchangeable behind it.

mod simulated;

#[cfg(test)]
mod tests;

use crate::common::{FlightCommand, FlightStatus, SensorData};
use async_trait::async_trait;
use strum_macros::Display;

pub use simulated::SimulatedGateway;

/// Hardware fault reported by a gateway call. Faults are values, never panics,
/// so a failing call cannot abort a control tick.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum GatewayError {
    /// The link to the flight controller could not be established.
    InitializationFailed,
    /// A call was made before a successful `initialize()`.
    NotInitialized,
    /// The flight controller did not answer.
    LinkDown,
    /// The flight controller refused the request in its current state.
    Rejected,
}

impl std::error::Error for GatewayError {}

/// Abstract "read sensors / apply command" surface of the vehicle.
///
/// Implementations mutate the vehicle state observed by subsequent
/// [`get_status`](ActuationGateway::get_status) calls.
#[async_trait]
pub trait ActuationGateway: Send + Sync {
    async fn initialize(&self) -> Result<(), GatewayError>;
    async fn read_sensors(&self) -> Result<SensorData, GatewayError>;
    async fn get_status(&self) -> Result<FlightStatus, GatewayError>;
    async fn execute(&self, command: &FlightCommand) -> Result<(), GatewayError>;
    async fn arm(&self) -> Result<(), GatewayError>;
    async fn disarm(&self) -> Result<(), GatewayError>;
    async fn takeoff(&self, altitude: f64) -> Result<(), GatewayError>;
    async fn land(&self) -> Result<(), GatewayError>;
    /// Best-effort descent and disarm. Must not panic, even with the link down.
    async fn emergency_land(&self);
    /// Hook invoked once when the vehicle enters degraded performance.
    async fn adjust_for_degraded_mode(&self) {}
}
