//! Single source of truth shared by the four control loops.

use crate::common::{FlightStatus, NavigationStatus, SensorData, SystemHealth, ThreatLevel};
use crate::safety::SafetyVerdict;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// State of the safety-forced landing sequence.
#[derive(Debug, PartialEq, Clone, Default)]
pub enum EmergencyLatch {
    #[default]
    Idle,
    /// Emergency landing in progress; mission commands are locked out until disarm.
    Engaged { since: DateTime<Utc>, reason: String },
}

impl EmergencyLatch {
    pub fn is_engaged(&self) -> bool { matches!(self, EmergencyLatch::Engaged { .. }) }
}

/// Everything the loops exchange. Always handed out as a complete copy.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct VehicleState {
    pub flight: FlightStatus,
    pub health: SystemHealth,
    pub navigation: NavigationStatus,
    pub threat_level: ThreatLevel,
    /// Latest sensor sample, `None` until the first successful read.
    pub sensors: Option<SensorData>,
    pub last_sensor_read: Option<DateTime<Utc>>,
    pub verdict: SafetyVerdict,
    pub emergency: EmergencyLatch,
    /// Consecutive failed command executions.
    pub execute_faults: u32,
}

/// Mutex-guarded container for the [`VehicleState`].
///
/// Readers receive snapshots, never references into the live state, and every
/// write is applied under the lock as one unit, so no reader observes a
/// partially updated status.
#[derive(Debug, Default)]
pub struct StatusStore {
    state: Mutex<VehicleState>,
}

impl StatusStore {
    pub fn new() -> Self { Self::default() }

    /// Returns a copy of the current state.
    pub fn read(&self) -> VehicleState { self.lock().clone() }

    /// Applies `update` atomically and returns its result.
    ///
    /// # Arguments
    /// - `update`: Closure receiving exclusive access to the state. It must not block.
    pub fn write<R>(&self, update: impl FnOnce(&mut VehicleState) -> R) -> R {
        update(&mut self.lock())
    }

    pub fn threat_level(&self) -> ThreatLevel { self.lock().threat_level }

    pub fn flight(&self) -> FlightStatus { self.lock().flight }

    // Writers only ever assign complete values, so a poisoned lock still holds a valid snapshot.
    fn lock(&self) -> MutexGuard<'_, VehicleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
