//! Background reclamation of idle sessions.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::id::IdGenerator;
use crate::store::Shared;

/// Spawn the reclamation loop onto `runtime`.
///
/// The loop sweeps once per `period`, the first sweep one full period after
/// spawning. It exits when `cancel` fires or the store is gone.
pub(crate) fn spawn<G: IdGenerator>(
    runtime: &Handle,
    store: Weak<Shared<G>>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    runtime.spawn(run(store, period, cancel))
}

async fn run<G: IdGenerator>(store: Weak<Shared<G>>, period: Duration, cancel: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + period, period);
    // Missed ticks are not replayed back to back.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    trace!(
        period_ms = period.as_millis() as u64,
        "Reclamation loop started"
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let Some(store) = store.upgrade() else {
                    break;
                };
                store.reclaim();
            }
        }
    }

    trace!("Reclamation loop stopped");
}
