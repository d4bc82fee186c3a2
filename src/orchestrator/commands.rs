use crate::common::Position;
use crate::status_store::VehicleState;
use strum_macros::Display;

/// Operator request processed at the top of a flight-control tick.
#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum OperatorCommand {
    Arm,
    Disarm,
    /// Take off to the given altitude in meters.
    Takeoff(f64),
    Land,
    /// Append a waypoint to the navigation queue.
    Navigate(Position),
    ClearWaypoints,
    EmergencyLand,
}

/// Reason an operator command was refused. Rejected commands have no effect.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum CommandRejection {
    Disarmed,
    NotInFlight,
    InFlight,
    UnsafeToFly,
    QueueFull,
    NotRunning,
}

impl std::error::Error for CommandRejection {}

impl OperatorCommand {
    /// Checks the command against a vehicle snapshot.
    pub fn validate(&self, state: &VehicleState) -> Result<(), CommandRejection> {
        let flight = &state.flight;
        let unsafe_to_fly = state.health.critical_failure || state.emergency.is_engaged();
        match self {
            OperatorCommand::Arm if unsafe_to_fly => Err(CommandRejection::UnsafeToFly),
            OperatorCommand::Disarm if flight.in_flight => Err(CommandRejection::InFlight),
            OperatorCommand::Takeoff(_) | OperatorCommand::Navigate(_) | OperatorCommand::EmergencyLand
                if !flight.armed =>
            {
                Err(CommandRejection::Disarmed)
            }
            OperatorCommand::Takeoff(_) if unsafe_to_fly => Err(CommandRejection::UnsafeToFly),
            OperatorCommand::Land if state.emergency.is_engaged() => {
                Err(CommandRejection::UnsafeToFly)
            }
            OperatorCommand::Land if !flight.in_flight => Err(CommandRejection::NotInFlight),
            _ => Ok(()),
        }
    }
}
