use super::pacing::pace;
use crate::keychain::Keychain;
use crate::log;
use chrono::Utc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// 30 Hz loop refining the navigation target and watching for collision risk.
pub(super) struct NavigationLoop {
    keychain: Keychain,
    c_tok: CancellationToken,
}

impl NavigationLoop {
    pub(super) fn new(keychain: Keychain, c_tok: CancellationToken) -> Self {
        Self { keychain, c_tok }
    }

    pub(super) async fn run(self, period: Duration) {
        while !self.c_tok.is_cancelled() {
            let start = Instant::now();
            self.tick().await;
            pace(start, period).await;
        }
        log!("Navigation loop stopped.");
    }

    async fn tick(&self) {
        let store = self.keychain.store();
        let current = store.flight().position;
        let nav_lock = self.keychain.nav();
        let planner_lock = self.keychain.planner();

        let mut nav = nav_lock.write().await;
        nav.update_navigation(current);
        let target = {
            let planner = planner_lock.read().await;
            planner.get_current_commands(&nav, Utc::now()).target_position
        };
        let status = nav.set_target(target);
        store.write(|s| s.navigation = status);
    }
}
