use super::{commands::OperatorCommand, engage_emergency, pacing::pace};
use crate::common::{ControlMode, FlightCommand, FlightStatus};
use crate::config::SafetyThresholds;
use crate::keychain::Keychain;
use crate::status_store::{EmergencyLatch, VehicleState};
use crate::{alert, error, event, info, log, warn};
use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// 100 Hz loop reading sensors and applying exactly one command per tick.
pub(super) struct FlightControlLoop {
    keychain: Keychain,
    limits: SafetyThresholds,
    commands: Receiver<OperatorCommand>,
    c_tok: CancellationToken,
    link_up: bool,
}

impl FlightControlLoop {
    pub(super) fn new(
        keychain: Keychain,
        limits: SafetyThresholds,
        commands: Receiver<OperatorCommand>,
        c_tok: CancellationToken,
    ) -> Self {
        Self { keychain, limits, commands, c_tok, link_up: true }
    }

    pub(super) async fn run(mut self, period: Duration) {
        while !self.c_tok.is_cancelled() {
            let start = Instant::now();
            self.tick().await;
            pace(start, period).await;
        }
        log!("Flight control loop stopped.");
    }

    async fn tick(&mut self) {
        self.read_sensors().await;
        while let Ok(command) = self.commands.try_recv() {
            self.apply_operator_command(command).await;
        }

        let gate = self.keychain.gate();
        let _tick = gate.lock().await;
        if self.c_tok.is_cancelled() {
            return;
        }
        let Some(status) = self.refresh_status().await else { return };
        let snapshot = self.keychain.store().read();

        if snapshot.emergency.is_engaged() {
            self.continue_emergency_landing(&status).await;
            return;
        }
        if !status.armed || !status.in_flight {
            return;
        }
        if snapshot.verdict.requires_immediate_landing {
            if engage_emergency(&self.keychain.store(), &snapshot.health.status_message) {
                alert!("Immediate landing required: {}", snapshot.health.status_message);
            }
            self.continue_emergency_landing(&status).await;
            return;
        }

        let command = self.select_command(&status, &snapshot).await;
        self.execute(&self.clamp(command)).await;
    }

    async fn read_sensors(&mut self) {
        match self.keychain.gateway().read_sensors().await {
            Ok(sensors) => {
                if !self.link_up {
                    info!("Sensor link restored.");
                    self.link_up = true;
                }
                self.keychain.store().write(|s| {
                    s.last_sensor_read = Some(sensors.timestamp);
                    s.sensors = Some(sensors);
                });
            }
            Err(e) => {
                if self.link_up {
                    warn!("Sensor read failed: {e}");
                    self.link_up = false;
                }
            }
        }
    }

    /// Pulls the gateway status into the store, overlaying the planner's threat state.
    async fn refresh_status(&self) -> Option<FlightStatus> {
        let status = match self.keychain.gateway().get_status().await {
            Ok(status) => status,
            Err(e) => {
                event!("Status read failed: {e}");
                return None;
            }
        };
        let planner_lock = self.keychain.planner();
        let planner = planner_lock.read().await;
        let status = FlightStatus {
            threat_level: planner.threat_level(),
            mission_mode: planner.current_mode(),
            ..status
        };
        drop(planner);
        self.keychain.store().write(|s| s.flight = status);
        Some(status)
    }

    async fn continue_emergency_landing(&self, status: &FlightStatus) {
        let gateway = self.keychain.gateway();
        if !status.armed && !status.in_flight {
            self.keychain.store().write(|s| s.emergency = EmergencyLatch::Idle);
            alert!("Emergency landing complete, vehicle disarmed at {}.", status.position);
            return;
        }
        if !status.in_flight {
            if let Err(e) = gateway.disarm().await {
                error!("Disarm after emergency landing failed: {e}");
            }
            return;
        }
        self.execute(&FlightCommand::emergency_land(status.position)).await;
    }

    /// Picks the highest-priority command: ceiling descent, GPS altitude hold,
    /// return to launch, then the mission planner.
    async fn select_command(&self, status: &FlightStatus, snapshot: &VehicleState) -> FlightCommand {
        let verdict = &snapshot.verdict;
        let hold = |altitude: f64| FlightCommand {
            mode: ControlMode::AltitudeHold,
            ..FlightCommand::position_hold(status.position.with_altitude(altitude))
        };
        if let Some(altitude) = verdict.descend_to {
            return hold(altitude);
        }
        if verdict.altitude_hold {
            return hold(status.position.altitude);
        }
        if verdict.return_to_launch {
            return FlightCommand {
                mode: ControlMode::AutoMission,
                return_to_launch: true,
                ..FlightCommand::position_hold(status.position)
            };
        }
        let nav_lock = self.keychain.nav();
        let planner_lock = self.keychain.planner();
        let nav = nav_lock.read().await;
        let planner = planner_lock.read().await;
        planner.get_current_commands(&nav, Utc::now())
    }

    fn clamp(&self, mut command: FlightCommand) -> FlightCommand {
        if !command.is_emergency_land() {
            let altitude = &mut command.target_position.altitude;
            *altitude = altitude.clamp(self.limits.min_altitude, self.limits.max_altitude);
        }
        command
    }

    async fn execute(&self, command: &FlightCommand) {
        let store = self.keychain.store();
        match self.keychain.gateway().execute(command).await {
            Ok(()) => store.write(|s| s.execute_faults = 0),
            Err(e) => {
                let faults = store.write(|s| {
                    s.execute_faults += 1;
                    s.execute_faults
                });
                if faults == 1 || faults == self.limits.fault_tolerance {
                    error!("{} command failed ({faults} in a row): {e}", command.mode);
                }
            }
        }
    }

    async fn apply_operator_command(&self, command: OperatorCommand) {
        let snapshot = self.keychain.store().read();
        if let Err(rejection) = command.validate(&snapshot) {
            warn!("Operator command {command} rejected: {rejection}");
            return;
        }
        let gateway = self.keychain.gateway();
        let res = match command {
            OperatorCommand::Arm => gateway.arm().await,
            OperatorCommand::Disarm => gateway.disarm().await,
            OperatorCommand::Takeoff(altitude) => {
                let altitude = altitude.clamp(self.limits.min_altitude, self.limits.max_altitude);
                gateway.takeoff(altitude).await
            }
            OperatorCommand::Land => gateway.land().await,
            OperatorCommand::Navigate(position) => {
                self.keychain.nav().write().await.add_waypoint(position);
                Ok(())
            }
            OperatorCommand::ClearWaypoints => {
                self.keychain.nav().write().await.clear_waypoints();
                Ok(())
            }
            OperatorCommand::EmergencyLand => {
                if engage_emergency(&self.keychain.store(), "operator request") {
                    alert!("Operator requested emergency landing.");
                }
                Ok(())
            }
        };
        match res {
            Ok(()) => info!("Operator command {command} applied."),
            Err(e) => error!("Operator command {command} failed: {e}"),
        }
    }
}
