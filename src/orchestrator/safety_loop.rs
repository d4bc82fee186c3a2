use super::{engage_emergency, pacing::pace};
use crate::keychain::Keychain;
use crate::{alert, log};
use chrono::Utc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// 10 Hz loop evaluating health and publishing the safety verdict.
pub(super) struct SafetyLoop {
    keychain: Keychain,
    c_tok: CancellationToken,
}

impl SafetyLoop {
    pub(super) fn new(keychain: Keychain, c_tok: CancellationToken) -> Self {
        Self { keychain, c_tok }
    }

    pub(super) async fn run(self, period: Duration) {
        while !self.c_tok.is_cancelled() {
            let start = Instant::now();
            self.tick().await;
            pace(start, period).await;
        }
        log!("Safety loop stopped.");
    }

    async fn tick(&self) {
        let store = self.keychain.store();
        let assessment = {
            let state = store.read();
            self.keychain.safety().lock().await.assess(&state, Utc::now())
        };
        if assessment.degraded_onset {
            self.keychain.gateway().adjust_for_degraded_mode().await;
        }

        // Publishing under the gate orders the verdict before the next flight tick's execute.
        let gate = self.keychain.gate();
        let _tick = gate.lock().await;
        let armed = store.write(|s| {
            s.health = assessment.health.clone();
            s.verdict = assessment.verdict.clone();
            s.flight.armed
        });
        if assessment.verdict.requires_immediate_landing
            && armed
            && engage_emergency(&store, &assessment.health.status_message)
        {
            alert!("Emergency landing engaged: {}", assessment.health.status_message);
        }
    }
}
