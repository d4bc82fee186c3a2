//! Control core of an autonomous protective aircraft.
//!
//! The [`Orchestrator`] runs four rate-scheduled loops (flight control,
//! navigation, safety, telemetry) over a shared [`StatusStore`], derives the
//! mission behaviour from externally reported threat levels and lets the
//! safety monitor override any mission command.
#![allow(clippy::module_name_repetitions, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]

mod logger;

pub mod actuation;
pub mod common;
pub mod config;
pub mod keychain;
pub mod mission;
pub mod navigation;
pub mod orchestrator;
pub mod safety;
pub mod status_store;
pub mod telemetry;

pub use actuation::{ActuationGateway, GatewayError, SimulatedGateway};
pub use common::{
    Attitude, ControlMode, FlightCommand, FlightStatus, MissionMode, NavigationStatus, Position,
    ProtectionTarget, SensorData, SystemHealth, TelemetryPacket, ThreatLevel, Velocity,
};
pub use config::CoreConfig;
pub use navigation::{NoProximitySensor, Obstacle, ProximitySensor, SimulatedProximitySensor};
pub use orchestrator::{CommandRejection, OperatorCommand, Orchestrator, OrchestratorError};
pub use status_store::{StatusStore, VehicleState};
pub use telemetry::{ChannelTelemetrySink, LogTelemetrySink, TelemetrySink};
