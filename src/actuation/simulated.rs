use super::{ActuationGateway, GatewayError};
use crate::common::{
    Attitude, ControlMode, FlightCommand, FlightStatus, Position, SensorData, Velocity,
};
use crate::{alert, info, warn};
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-process vehicle model standing in for the hardware adapter.
///
/// Executed commands teleport the vehicle to the commanded target, emergency
/// land commands descend by a fixed step per command and disarm on touchdown.
/// Fault injection setters allow tests to drive the safety paths.
#[derive(Debug)]
pub struct SimulatedGateway {
    state: Mutex<SimState>,
}

#[derive(Debug)]
struct SimState {
    initialized: bool,
    init_fails: bool,
    link_down: bool,
    armed: bool,
    in_flight: bool,
    position: Position,
    velocity: Velocity,
    attitude: Attitude,
    home: Position,
    battery_remaining: f64,
    battery_drain_per_read: f64,
    gps_fix: bool,
    satellites: u8,
    board_load: f64,
    descent_step: f64,
    degraded_adjustments: u32,
    commands: VecDeque<FlightCommand>,
}

impl SimulatedGateway {
    /// Battery endurance at 100 % charge in seconds.
    const FULL_ENDURANCE_S: f64 = 3600.0;
    const EMPTY_VOLTAGE: f64 = 10.5;
    const FULL_VOLTAGE: f64 = 12.6;
    const COMMAND_LOG_LEN: usize = 256;
    /// Default descent per emergency land command, 1 m/s at 100 Hz.
    const DEF_DESCENT_STEP: f64 = 0.01;

    /// Creates a disarmed, landed vehicle at `home` with a full battery and a healthy GPS fix.
    pub fn new(home: Position) -> Self {
        let ground = home.with_altitude(0.0);
        Self {
            state: Mutex::new(SimState {
                initialized: false,
                init_fails: false,
                link_down: false,
                armed: false,
                in_flight: false,
                position: ground,
                velocity: Velocity::default(),
                attitude: Attitude::default(),
                home: ground,
                battery_remaining: 100.0,
                battery_drain_per_read: 0.0,
                gps_fix: true,
                satellites: 12,
                board_load: 25.0,
                descent_step: Self::DEF_DESCENT_STEP,
                degraded_adjustments: 0,
                commands: VecDeque::new(),
            }),
        }
    }

    /// Sets the altitude lost per executed emergency land command.
    pub fn with_descent_step(self, meters: f64) -> Self {
        self.lock().descent_step = meters;
        self
    }

    /// Sets the battery percentage lost per sensor read.
    pub fn with_battery_drain(self, percent_per_read: f64) -> Self {
        self.lock().battery_drain_per_read = percent_per_read;
        self
    }

    pub fn fail_initialization(&self) { self.lock().init_fails = true; }
    pub fn set_link_down(&self, down: bool) { self.lock().link_down = down; }
    pub fn set_battery(&self, percent: f64) { self.lock().battery_remaining = percent; }
    pub fn set_board_load(&self, percent: f64) { self.lock().board_load = percent; }

    pub fn set_gps(&self, fix: bool, satellites: u8) {
        let mut state = self.lock();
        state.gps_fix = fix;
        state.satellites = satellites;
    }

    /// Places the vehicle at an arbitrary altitude, e.g. to breach the ceiling.
    pub fn set_altitude(&self, altitude: f64) { self.lock().position.altitude = altitude; }

    pub fn executed_commands(&self) -> Vec<FlightCommand> {
        self.lock().commands.iter().copied().collect()
    }

    pub fn battery_remaining(&self) -> f64 { self.lock().battery_remaining }

    pub fn last_command(&self) -> Option<FlightCommand> { self.lock().commands.back().copied() }

    pub fn degraded_adjustments(&self) -> u32 { self.lock().degraded_adjustments }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_online(&self) -> Result<MutexGuard<'_, SimState>, GatewayError> {
        let state = self.lock();
        if !state.initialized {
            Err(GatewayError::NotInitialized)
        } else if state.link_down {
            Err(GatewayError::LinkDown)
        } else {
            Ok(state)
        }
    }
}

impl SimState {
    fn voltage(&self) -> f64 {
        let span = SimulatedGateway::FULL_VOLTAGE - SimulatedGateway::EMPTY_VOLTAGE;
        SimulatedGateway::EMPTY_VOLTAGE + span * self.battery_remaining / 100.0
    }

    fn touch_down(&mut self) {
        self.position.altitude = 0.0;
        self.velocity = Velocity::default();
        self.in_flight = false;
    }

    fn record(&mut self, command: FlightCommand) {
        if self.commands.len() == SimulatedGateway::COMMAND_LOG_LEN {
            self.commands.pop_front();
        }
        self.commands.push_back(command);
    }
}

#[async_trait]
impl ActuationGateway for SimulatedGateway {
    async fn initialize(&self) -> Result<(), GatewayError> {
        let mut state = self.lock();
        if state.init_fails {
            return Err(GatewayError::InitializationFailed);
        }
        state.initialized = true;
        info!("Simulated flight controller online at {}.", state.position);
        Ok(())
    }

    async fn read_sensors(&self) -> Result<SensorData, GatewayError> {
        let mut state = self.lock_online()?;
        state.battery_remaining = (state.battery_remaining - state.battery_drain_per_read).max(0.0);
        let mut rng = rand::rng();
        let mut noise = || -> f64 { rng.random_range(-0.1..0.1) };
        let voltage = state.voltage();
        Ok(SensorData {
            accel: [noise(), noise(), -9.81 + noise()],
            gyro: [noise() * 0.1, noise() * 0.1, noise() * 0.1],
            mag: [0.22 + noise() * 0.01, 0.0, 0.42 + noise() * 0.01],
            gps_position: state.position,
            gps_fix: state.gps_fix,
            satellites: state.satellites,
            gps_accuracy: if state.gps_fix { 1.5 } else { 50.0 },
            pressure: 101_325.0 - 12.0 * state.position.altitude,
            temperature: 20.0 - 0.0065 * state.position.altitude,
            voltage,
            current: if state.in_flight { 18.0 } else { 0.5 },
            remaining: state.battery_remaining,
            board_load: state.board_load,
            board_memory: 40.0,
            timestamp: Utc::now(),
        })
    }

    async fn get_status(&self) -> Result<FlightStatus, GatewayError> {
        let state = self.lock_online()?;
        Ok(FlightStatus {
            armed: state.armed,
            in_flight: state.in_flight,
            position: state.position,
            velocity: state.velocity,
            attitude: state.attitude,
            battery_voltage: state.voltage(),
            flight_time_remaining: SimulatedGateway::FULL_ENDURANCE_S * state.battery_remaining
                / 100.0,
            ..FlightStatus::default()
        })
    }

    async fn execute(&self, command: &FlightCommand) -> Result<(), GatewayError> {
        let mut state = self.lock_online()?;
        if !state.armed {
            return Err(GatewayError::Rejected);
        }
        state.record(*command);
        if !state.in_flight {
            if command.is_emergency_land() {
                state.armed = false;
            }
            return Ok(());
        }
        match command.mode {
            ControlMode::EmergencyLand => {
                state.position.altitude = (state.position.altitude - state.descent_step).max(0.0);
                if state.position.altitude <= 0.0 {
                    state.touch_down();
                    state.armed = false;
                    alert!("Simulated vehicle touched down, motors disarmed.");
                }
            }
            ControlMode::AltitudeHold => {
                state.position.altitude = command.target_position.altitude.max(0.0);
                state.velocity = Velocity { x: 0.0, y: 0.0, z: command.target_velocity.z };
            }
            _ => {
                let target = if command.return_to_launch {
                    state.home.with_altitude(command.target_position.altitude)
                } else {
                    command.target_position
                };
                state.position = Position { altitude: target.altitude.max(0.0), ..target };
                state.velocity = command.target_velocity;
                state.attitude.yaw = command.target_yaw;
            }
        }
        Ok(())
    }

    async fn arm(&self) -> Result<(), GatewayError> {
        self.lock_online()?.armed = true;
        Ok(())
    }

    async fn disarm(&self) -> Result<(), GatewayError> {
        let mut state = self.lock_online()?;
        if state.in_flight {
            return Err(GatewayError::Rejected);
        }
        state.armed = false;
        Ok(())
    }

    async fn takeoff(&self, altitude: f64) -> Result<(), GatewayError> {
        let mut state = self.lock_online()?;
        if !state.armed {
            return Err(GatewayError::Rejected);
        }
        if !state.in_flight {
            state.home = state.position.with_altitude(0.0);
        }
        state.in_flight = true;
        state.position.altitude = altitude;
        Ok(())
    }

    async fn land(&self) -> Result<(), GatewayError> {
        self.lock_online()?.touch_down();
        Ok(())
    }

    async fn emergency_land(&self) {
        match self.lock_online() {
            Ok(mut state) => {
                state.touch_down();
                state.armed = false;
            }
            Err(e) => warn!("Simulated emergency landing could not reach the vehicle: {e}"),
        }
    }

    async fn adjust_for_degraded_mode(&self) { self.lock().degraded_adjustments += 1; }
}
