use super::{ActuationGateway, GatewayError, SimulatedGateway};
use crate::common::{ControlMode, FlightCommand, Position};

const HOME: Position = Position::new(40.7128, -74.0060, 0.0);

async fn airborne_sim(altitude: f64) -> SimulatedGateway {
    let sim = SimulatedGateway::new(HOME);
    sim.initialize().await.unwrap();
    sim.arm().await.unwrap();
    sim.takeoff(altitude).await.unwrap();
    sim
}

#[tokio::test]
async fn test_calls_before_initialize_fail() {
    let sim = SimulatedGateway::new(HOME);
    assert_eq!(sim.read_sensors().await.unwrap_err(), GatewayError::NotInitialized);
    assert_eq!(sim.arm().await.unwrap_err(), GatewayError::NotInitialized);
    sim.fail_initialization();
    assert_eq!(sim.initialize().await.unwrap_err(), GatewayError::InitializationFailed);
}

#[tokio::test]
async fn test_takeoff_execute_and_land() {
    let sim = airborne_sim(15.0).await;
    let status = sim.get_status().await.unwrap();
    assert!(status.armed && status.in_flight);
    assert!((status.position.altitude - 15.0).abs() < 1e-9);

    let target = Position::new(40.7130, -74.0058, 20.0);
    sim.execute(&FlightCommand::position_hold(target)).await.unwrap();
    assert_eq!(sim.get_status().await.unwrap().position, target);
    assert_eq!(sim.last_command().unwrap().mode, ControlMode::PositionHold);

    assert_eq!(sim.disarm().await.unwrap_err(), GatewayError::Rejected);
    sim.land().await.unwrap();
    sim.disarm().await.unwrap();
    let status = sim.get_status().await.unwrap();
    assert!(!status.armed && !status.in_flight);
}

#[tokio::test]
async fn test_execute_while_disarmed_rejected() {
    let sim = SimulatedGateway::new(HOME);
    sim.initialize().await.unwrap();
    let res = sim.execute(&FlightCommand::position_hold(HOME.with_altitude(10.0))).await;
    assert_eq!(res.unwrap_err(), GatewayError::Rejected);
    assert!(sim.executed_commands().is_empty());
    assert_eq!(sim.takeoff(10.0).await.unwrap_err(), GatewayError::Rejected);
}

#[tokio::test]
async fn test_emergency_land_commands_descend_and_disarm() {
    let sim = airborne_sim(10.0).await.with_descent_step(4.0);
    let mut steps = 0;
    while sim.get_status().await.unwrap().armed {
        let pos = sim.get_status().await.unwrap().position;
        sim.execute(&FlightCommand::emergency_land(pos)).await.unwrap();
        steps += 1;
        assert!(steps <= 3, "vehicle failed to touch down");
    }
    let status = sim.get_status().await.unwrap();
    assert!(!status.in_flight);
    assert!(status.position.altitude.abs() < 1e-9);
}

#[tokio::test]
async fn test_link_down_reports_fault_and_emergency_land_does_not_panic() {
    let sim = airborne_sim(10.0).await;
    sim.set_link_down(true);
    assert_eq!(sim.read_sensors().await.unwrap_err(), GatewayError::LinkDown);
    let res = sim.execute(&FlightCommand::position_hold(HOME.with_altitude(10.0))).await;
    assert_eq!(res.unwrap_err(), GatewayError::LinkDown);
    sim.emergency_land().await;
    sim.set_link_down(false);
    assert!(sim.get_status().await.unwrap().in_flight);
    sim.emergency_land().await;
    let status = sim.get_status().await.unwrap();
    assert!(!status.in_flight && !status.armed);
}

#[tokio::test]
async fn test_sensor_readings_follow_vehicle() {
    let sim = airborne_sim(30.0).await.with_battery_drain(0.5);
    sim.set_gps(false, 3);
    let first = sim.read_sensors().await.unwrap();
    let second = sim.read_sensors().await.unwrap();
    assert!(!first.gps_fix);
    assert_eq!(first.satellites, 3);
    assert!((first.gps_position.altitude - 30.0).abs() < 1e-9);
    assert!((first.remaining - 99.5).abs() < 1e-9);
    assert!(second.remaining < first.remaining);
    assert!((first.accel[2] + 9.81).abs() <= 0.1);
}
