use std::time::Duration;
use tokio::time::Instant;

/// Sleeps for the remainder of `period` since `tick_start`.
///
/// An overrun tick yields immediately instead of queueing missed frames.
pub(super) async fn pace(tick_start: Instant, period: Duration) {
    let remaining = period.saturating_sub(tick_start.elapsed());
    if remaining.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(remaining).await;
    }
}
