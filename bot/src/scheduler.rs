//! Fixed-cadence tick loop

use std::future::Future;
use std::sync::Arc;

use pe_engine::orchestrator::{Orchestrator, TickOutcome};
use tokio::task::JoinSet;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Fire `run_once` every `every` until `shutdown` resolves.
///
/// Each tick runs in its own task so a tick that is holding a position does
/// not delay the timer; overlapping ticks come back as `Skipped`. On shutdown
/// no new ticks start, but ticks already running are awaited so an open
/// position is always taken through its exit.
pub async fn run<F>(orchestrator: Arc<Orchestrator>, every: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    let mut timer = interval(every.max(Duration::from_secs(1)));
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!("⏰ Scheduler started: tick every {}s", every.as_secs());

    tokio::pin!(shutdown);

    let mut ticks = JoinSet::new();
    let mut count: u64 = 0;
    loop {
        tokio::select! {
            _ = timer.tick() => {
                // reap finished ticks
                while ticks.try_join_next().is_some() {}

                count += 1;
                let orchestrator = orchestrator.clone();
                ticks.spawn(async move {
                    match orchestrator.run_once().await {
                        Ok(TickOutcome::Skipped) => debug!("⏰ Tick #{} skipped, trade in progress", count),
                        Ok(TickOutcome::NoEntry(signal)) => info!("⏰ Tick #{}: no entry ({:?})", count, signal.reason),
                        Ok(TickOutcome::Traded { entry_order, position, .. }) => info!(
                            "⏰ Tick #{}: traded {} x{} (order {}), remaining {}",
                            count, position.symbol, entry_order.quantity, entry_order.order_id, position.remaining_qty
                        ),
                        Err(e) => error!("⏰ Tick #{} failed: {}", count, e),
                    }
                });
            }
            _ = &mut shutdown => {
                info!("🛑 Shutdown requested, stopping scheduler");
                break;
            }
        }
    }

    if orchestrator.is_trade_in_progress() {
        warn!("⏳ Waiting for open trade to exit before stopping");
    }
    while let Some(joined) = ticks.join_next().await {
        if let Err(e) = joined {
            error!("⏰ Tick task ended abnormally: {}", e);
        }
    }
}
