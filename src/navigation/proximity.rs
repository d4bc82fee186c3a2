use std::sync::{Mutex, PoisonError};

/// Closest obstacle reported by a proximity sensor, relative to the vehicle.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Obstacle {
    pub distance_m: f64,
    /// Direction of the obstacle in degrees clockwise from north.
    pub bearing_deg: f64,
}

/// Proximity sensing capability injected into the navigation engine.
pub trait ProximitySensor: Send + Sync {
    fn nearest_obstacle(&self) -> Option<Obstacle>;
    fn is_available(&self) -> bool { true }
}

/// Sensor for airframes without proximity hardware; never reports an obstacle.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProximitySensor;

impl ProximitySensor for NoProximitySensor {
    fn nearest_obstacle(&self) -> Option<Obstacle> { None }
}

/// Scriptable sensor used alongside the simulated gateway.
#[derive(Debug)]
pub struct SimulatedProximitySensor {
    obstacle: Mutex<Option<Obstacle>>,
    available: bool,
}

impl SimulatedProximitySensor {
    pub fn new() -> Self { Self { obstacle: Mutex::new(None), available: true } }

    pub fn unavailable() -> Self { Self { available: false, ..Self::new() } }

    pub fn set_obstacle(&self, obstacle: Option<Obstacle>) {
        *self.obstacle.lock().unwrap_or_else(PoisonError::into_inner) = obstacle;
    }
}

impl Default for SimulatedProximitySensor {
    fn default() -> Self { Self::new() }
}

impl ProximitySensor for SimulatedProximitySensor {
    fn nearest_obstacle(&self) -> Option<Obstacle> {
        *self.obstacle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_available(&self) -> bool { self.available }
}
