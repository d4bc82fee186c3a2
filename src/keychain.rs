use crate::actuation::ActuationGateway;
use crate::config::CoreConfig;
use crate::mission::MissionPlanner;
use crate::navigation::{NavigationEngine, ProximitySensor};
use crate::safety::SafetyMonitor;
use crate::status_store::StatusStore;
use crate::telemetry::TelemetrySink;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Struct bundling the shared subsystems of the control core, handed to every
/// periodic loop.
///
/// Locks are always taken in the order `gate` → `nav` → `planner` → `safety`
/// → `store`. The `gate` serializes a flight-control tick against safety
/// verdict publication and threat escalation.
#[derive(Clone)]
pub struct Keychain {
    /// The actuation boundary towards the flight-controller hardware.
    gateway: Arc<dyn ActuationGateway>,
    /// Single source of truth for the vehicle state.
    store: Arc<StatusStore>,
    /// The navigation engine computing guard positions and waypoints.
    nav: Arc<RwLock<NavigationEngine>>,
    /// The mission planner holding the threat-driven mode.
    planner: Arc<RwLock<MissionPlanner>>,
    /// The safety monitor, owned by the safety loop.
    safety: Arc<Mutex<SafetyMonitor>>,
    /// Destination of the telemetry packets.
    sink: Arc<dyn TelemetrySink>,
    gate: Arc<Mutex<()>>,
}

impl Keychain {
    /// Creates a new `Keychain` from the configuration and the injected collaborators.
    ///
    /// # Arguments
    /// - `config`: Core configuration used to seed the subsystems.
    /// - `gateway`: Actuation adapter for the airframe.
    /// - `proximity`: Proximity sensor consulted by the navigation engine.
    /// - `sink`: Telemetry destination.
    pub fn new(
        config: &CoreConfig,
        gateway: Arc<dyn ActuationGateway>,
        proximity: Arc<dyn ProximitySensor>,
        sink: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            gateway,
            store: Arc::new(StatusStore::new()),
            nav: Arc::new(RwLock::new(NavigationEngine::new(config.navigation, proximity))),
            planner: Arc::new(RwLock::new(MissionPlanner::new(config.patrol))),
            safety: Arc::new(Mutex::new(SafetyMonitor::new(config.safety))),
            sink,
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Provides a cloned reference to the actuation gateway.
    pub fn gateway(&self) -> Arc<dyn ActuationGateway> { Arc::clone(&self.gateway) }

    /// Provides a cloned reference to the status store.
    pub fn store(&self) -> Arc<StatusStore> { Arc::clone(&self.store) }

    /// Provides a cloned reference to the navigation engine.
    pub fn nav(&self) -> Arc<RwLock<NavigationEngine>> { Arc::clone(&self.nav) }

    /// Provides a cloned reference to the mission planner.
    pub fn planner(&self) -> Arc<RwLock<MissionPlanner>> { Arc::clone(&self.planner) }

    /// Provides a cloned reference to the safety monitor.
    pub fn safety(&self) -> Arc<Mutex<SafetyMonitor>> { Arc::clone(&self.safety) }

    /// Provides a cloned reference to the telemetry sink.
    pub fn sink(&self) -> Arc<dyn TelemetrySink> { Arc::clone(&self.sink) }

    pub fn gate(&self) -> Arc<Mutex<()>> { Arc::clone(&self.gate) }
}
