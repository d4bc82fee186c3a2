//! Guard geometry, waypoint tracking and collision handling.

mod engine;
mod proximity;

pub use engine::{Guidance, NavigationEngine, NavigationError};
pub use proximity::{NoProximitySensor, Obstacle, ProximitySensor, SimulatedProximitySensor};
