use super::pacing::pace;
use crate::keychain::Keychain;
use crate::log;
use crate::telemetry::assemble;
use chrono::Utc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// 1 Hz loop handing complete status snapshots to the telemetry sink.
pub(super) struct TelemetryLoop {
    keychain: Keychain,
    c_tok: CancellationToken,
    sequence: u64,
}

impl TelemetryLoop {
    pub(super) fn new(keychain: Keychain, c_tok: CancellationToken) -> Self {
        Self { keychain, c_tok, sequence: 0 }
    }

    pub(super) async fn run(mut self, period: Duration) {
        let sink = self.keychain.sink();
        let store = self.keychain.store();
        while !self.c_tok.is_cancelled() {
            let start = Instant::now();
            sink.emit(assemble(self.sequence, &store.read(), Utc::now()));
            self.sequence += 1;
            pace(start, period).await;
        }
        log!("Telemetry loop stopped after {} packets.", self.sequence);
    }
}
