//! Threat-level to mission-mode state machine and per-tick command derivation.

mod planner;

pub use planner::MissionPlanner;
