//! Health evaluation and the interventions it demands.

mod monitor;
#[cfg(test)]
mod tests;

pub use monitor::{SafetyAssessment, SafetyMonitor, SafetyVerdict};
