//! Outbound status snapshots and the sinks that carry them off the core.

use crate::common::TelemetryPacket;
use crate::status_store::VehicleState;
use crate::{info, warn};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};

/// Destination for telemetry packets. Implementations must not block.
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, packet: TelemetryPacket);
}

/// Assembles a packet from a complete [`VehicleState`] snapshot.
pub fn assemble(sequence: u64, state: &VehicleState, now: DateTime<Utc>) -> TelemetryPacket {
    TelemetryPacket {
        sequence,
        flight_status: state.flight,
        navigation_status: state.navigation,
        system_health: state.health.clone(),
        threat_level: state.threat_level,
        timestamp: now,
    }
}

/// Forwards packets into a bounded channel, dropping them while the consumer lags behind.
#[derive(Debug, Clone)]
pub struct ChannelTelemetrySink {
    tx: Sender<TelemetryPacket>,
}

impl ChannelTelemetrySink {
    /// Creates the sink together with the receiving end handed to the transport.
    pub fn new(capacity: usize) -> (Self, Receiver<TelemetryPacket>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl TelemetrySink for ChannelTelemetrySink {
    fn emit(&self, packet: TelemetryPacket) {
        match self.tx.try_send(packet) {
            Ok(()) => (),
            Err(TrySendError::Full(p)) => {
                warn!("Telemetry channel full, dropping packet {}.", p.sequence);
            }
            Err(TrySendError::Closed(p)) => {
                warn!("Telemetry receiver gone, dropping packet {}.", p.sequence);
            }
        }
    }
}

/// Prints a one-line summary of every n-th packet.
#[derive(Debug)]
pub struct LogTelemetrySink {
    every: u64,
    emitted: AtomicU64,
}

impl LogTelemetrySink {
    const DEF_EVERY: u64 = 10;

    pub fn new() -> Self { Self::every(Self::DEF_EVERY) }

    pub fn every(n: u64) -> Self { Self { every: n.max(1), emitted: AtomicU64::new(0) } }
}

impl Default for LogTelemetrySink {
    fn default() -> Self { Self::new() }
}

impl TelemetrySink for LogTelemetrySink {
    fn emit(&self, packet: TelemetryPacket) {
        let n = self.emitted.fetch_add(1, Ordering::Relaxed);
        if n % self.every != 0 {
            return;
        }
        let f = &packet.flight_status;
        info!(
            "#{} {} | {} | armed: {}, airborne: {} | {} | battery {:.1}% | {}",
            packet.sequence,
            packet.threat_level,
            f.mission_mode,
            f.armed,
            f.in_flight,
            f.position,
            packet.system_health.battery_percentage,
            packet.system_health.status_message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{assemble, ChannelTelemetrySink, TelemetrySink};
    use crate::common::ThreatLevel;
    use crate::status_store::VehicleState;
    use chrono::Utc;

    #[test]
    fn test_channel_sink_delivers_and_drops_when_full() {
        let (sink, mut rx) = ChannelTelemetrySink::new(2);
        let state = VehicleState { threat_level: ThreatLevel::Orange, ..VehicleState::default() };
        for seq in 0..4 {
            sink.emit(assemble(seq, &state, Utc::now()));
        }
        let first = rx.try_recv().unwrap();
        assert_eq!(first.sequence, 0);
        assert_eq!(first.threat_level, ThreatLevel::Orange);
        assert_eq!(rx.try_recv().unwrap().sequence, 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_sink_survives_closed_receiver() {
        let (sink, rx) = ChannelTelemetrySink::new(1);
        drop(rx);
        sink.emit(assemble(0, &VehicleState::default(), Utc::now()));
    }
}
