//! Lifecycle of the control core and its four periodic loops.
//!
//! | loop           | period  | writes to the store                       |
//! |----------------|---------|-------------------------------------------|
//! | flight control | 10 ms   | sensors, flight status, execute faults    |
//! | navigation     | 33 ms   | navigation status                         |
//! | safety         | 100 ms  | health, verdict, emergency latch          |
//! | telemetry      | 1000 ms | nothing, emits packets to the sink        |

mod commands;
mod flight_loop;
mod navigation_loop;
mod pacing;
mod safety_loop;
mod telemetry_loop;

pub use commands::{CommandRejection, OperatorCommand};

use crate::actuation::{ActuationGateway, GatewayError};
use crate::common::{FlightStatus, Position, ProtectionTarget, ThreatLevel};
use crate::config::CoreConfig;
use crate::keychain::Keychain;
use crate::navigation::{NavigationEngine, NavigationError, ProximitySensor};
use crate::status_store::{EmergencyLatch, StatusStore, VehicleState};
use crate::telemetry::TelemetrySink;
use crate::{alert, error, info, log, warn};
use chrono::Utc;
use flight_loop::FlightControlLoop;
use navigation_loop::NavigationLoop;
use safety_loop::SafetyLoop;
use std::sync::Arc;
use strum_macros::Display;
use telemetry_loop::TelemetryLoop;
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorError {
    GatewayInitialization(GatewayError),
    NavigationInitialization(NavigationError),
    AlreadyStarted,
    /// The orchestrator was shut down and cannot be restarted.
    Stopped,
}

impl std::error::Error for OrchestratorError {}

/// Owns the shared subsystems and the four periodic loops driving them.
pub struct Orchestrator {
    config: CoreConfig,
    keychain: Keychain,
    c_tok: CancellationToken,
    command_tx: Sender<OperatorCommand>,
    command_rx: Option<Receiver<OperatorCommand>>,
    tasks: Vec<JoinHandle<()>>,
    running: bool,
}

impl Orchestrator {
    /// Creates a stopped orchestrator.
    ///
    /// # Arguments
    /// - `config`: Loop rates, thresholds and patrol defaults.
    /// - `gateway`: Actuation adapter for the airframe.
    /// - `proximity`: Proximity sensor consulted for collision risk.
    /// - `sink`: Destination of the telemetry packets.
    pub fn new(
        config: CoreConfig,
        gateway: Arc<dyn ActuationGateway>,
        proximity: Arc<dyn ProximitySensor>,
        sink: Arc<dyn TelemetrySink>,
    ) -> Self {
        let keychain = Keychain::new(&config, gateway, proximity, sink);
        let (command_tx, command_rx) = mpsc::channel(config.command_queue_depth.max(1));
        Self {
            config,
            keychain,
            c_tok: CancellationToken::new(),
            command_tx,
            command_rx: Some(command_rx),
            tasks: Vec::new(),
            running: false,
        }
    }

    pub fn is_running(&self) -> bool { self.running }

    /// Initializes the gateway and the navigation engine, then starts the loops.
    ///
    /// Fails closed: if either initialization fails no loop is started.
    pub async fn startup(&mut self) -> Result<(), OrchestratorError> {
        if self.running {
            return Err(OrchestratorError::AlreadyStarted);
        }
        if self.c_tok.is_cancelled() {
            return Err(OrchestratorError::Stopped);
        }
        let gateway = self.keychain.gateway();
        if let Err(e) = gateway.initialize().await {
            error!("Flight controller initialization failed: {e}");
            return Err(OrchestratorError::GatewayInitialization(e));
        }
        if let Err(e) = self.keychain.nav().write().await.initialize() {
            error!("Navigation engine initialization failed: {e}");
            return Err(OrchestratorError::NavigationInitialization(e));
        }
        let Some(commands) = self.command_rx.take() else {
            return Err(OrchestratorError::AlreadyStarted);
        };

        match gateway.get_status().await {
            Ok(status) => {
                self.keychain.nav().write().await.update_navigation(status.position);
                self.keychain.store().write(|s| s.flight = status);
            }
            Err(e) => warn!("Initial status unavailable: {e}"),
        }

        let rates = self.config.rates;
        let flight = FlightControlLoop::new(
            self.keychain.clone(),
            self.config.safety,
            commands,
            self.c_tok.clone(),
        );
        let nav = NavigationLoop::new(self.keychain.clone(), self.c_tok.clone());
        let safety = SafetyLoop::new(self.keychain.clone(), self.c_tok.clone());
        let telemetry = TelemetryLoop::new(self.keychain.clone(), self.c_tok.clone());
        self.tasks = vec![
            tokio::spawn(flight.run(rates.flight_control)),
            tokio::spawn(nav.run(rates.navigation)),
            tokio::spawn(safety.run(rates.safety)),
            tokio::spawn(telemetry.run(rates.telemetry)),
        ];
        self.running = true;
        info!(
            "Control core running: flight {:?}, navigation {:?}, safety {:?}, telemetry {:?}.",
            rates.flight_control, rates.navigation, rates.safety, rates.telemetry
        );
        Ok(())
    }

    /// Stops all loops. An airborne vehicle is emergency-landed before the loops are joined.
    pub async fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.c_tok.cancel();
        info!("Shutting down control core.");

        let gateway = self.keychain.gateway();
        {
            let gate = self.keychain.gate();
            let _tick = gate.lock().await;
            let in_flight = match gateway.get_status().await {
                Ok(status) => status.in_flight,
                Err(_) => self.keychain.store().flight().in_flight,
            };
            if in_flight {
                alert!("Shutdown while airborne, emergency landing.");
                gateway.emergency_land().await;
            }
        }

        for res in futures::future::join_all(self.tasks.drain(..)).await {
            if let Err(e) = res {
                error!("Control loop terminated abnormally: {e}");
            }
        }
        if let Ok(status) = gateway.get_status().await {
            self.keychain.store().write(|s| {
                s.flight = FlightStatus {
                    threat_level: s.flight.threat_level,
                    mission_mode: s.flight.mission_mode,
                    ..status
                };
            });
        }
        info!("Control core stopped.");
    }

    /// Applies a threat report as one atomic step: the planner switches mode,
    /// the navigation target is recomputed and both become visible in the store
    /// before the next control tick.
    pub async fn handle_threat_escalation(&self, level: ThreatLevel, location: Position) {
        let gate = self.keychain.gate();
        let _tick = gate.lock().await;
        let nav_lock = self.keychain.nav();
        let planner_lock = self.keychain.planner();
        let mut nav = nav_lock.write().await;
        let mut planner = planner_lock.write().await;

        let previous = planner.threat_level();
        let mode = planner.update_mission(level, location);
        let target = planner.get_current_commands(&nav, Utc::now()).target_position;
        let nav_status = nav.set_target(target);
        self.keychain.store().write(|s| {
            s.threat_level = level;
            s.flight.threat_level = level;
            s.flight.mission_mode = mode;
            s.navigation = nav_status;
        });
        if level > previous {
            alert!("Threat escalated {previous} -> {level} at {location}: {mode}.");
        } else {
            log!("Threat level {previous} -> {level} at {location}: {mode}.");
        }
    }

    pub async fn set_protection_target(&self, target: ProtectionTarget) {
        self.keychain.nav().write().await.set_protected_target(Some(target));
    }

    pub async fn clear_protection_target(&self) {
        self.keychain.nav().write().await.set_protected_target(None);
    }

    /// Updates the position of a moving protection target.
    ///
    /// # Returns
    /// `false` if no target is set or the target is stationary.
    pub async fn move_protection_target(&self, position: Position) -> bool {
        self.keychain.nav().write().await.move_protected_target(position)
    }

    pub async fn set_patrol_area(&self, center: Position, radius: f64) {
        self.keychain.planner().write().await.set_patrol_area(center, radius);
    }

    pub async fn set_patrol_altitude(&self, altitude: f64) {
        let clamped = altitude.clamp(self.config.safety.min_altitude, self.config.safety.max_altitude);
        self.keychain.planner().write().await.set_patrol_altitude(clamped);
    }

    pub async fn set_patrol_speed(&self, speed: f64) {
        self.keychain.planner().write().await.set_patrol_speed(speed.max(0.0));
    }

    /// Replaces the waypoint list with a climb-and-spiral evasion around the current position.
    pub async fn execute_evasive_maneuvers(&self) {
        let current = self.keychain.store().flight().position;
        let waypoints = NavigationEngine::evasive_waypoints(&current);
        alert!("Executing evasive maneuvers from {current}.");
        self.keychain.nav().write().await.set_waypoints(waypoints);
    }

    /// Returns a complete snapshot of the shared vehicle state.
    pub fn status(&self) -> VehicleState { self.keychain.store().read() }

    /// Queues an operator command for the next flight-control tick.
    pub fn submit(&self, command: OperatorCommand) -> Result<(), CommandRejection> {
        if !self.running {
            return Err(CommandRejection::NotRunning);
        }
        let snapshot = self.keychain.store().read();
        if let Err(rejection) = command.validate(&snapshot) {
            warn!("Operator command {command} rejected: {rejection}");
            return Err(rejection);
        }
        self.command_tx.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => {
                warn!("Operator command queue full, dropping {command}.");
                CommandRejection::QueueFull
            }
            TrySendError::Closed(_) => CommandRejection::NotRunning,
        })
    }
}

/// Engages the emergency latch unless it is already engaged.
///
/// # Returns
/// `true` if this call engaged the latch.
fn engage_emergency(store: &StatusStore, reason: &str) -> bool {
    store.write(|s| {
        if s.emergency.is_engaged() {
            return false;
        }
        s.emergency = EmergencyLatch::Engaged { since: Utc::now(), reason: reason.to_string() };
        true
    })
}
