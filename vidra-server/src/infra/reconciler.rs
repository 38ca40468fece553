//! Background counter reconciliation: the safety net that corrects any
//! drift between derived counters and their live edges.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use vidra_core::EngagementLedger;

pub async fn run(ledger: Arc<EngagementLedger>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; skip it so startup isn't serialized
    // behind a full scan.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match ledger.reconcile_all().await {
            Ok(0) => {}
            Ok(corrected) => info!(corrected, "reconciled drifted engagement counters"),
            Err(err) => warn!(%err, "counter reconciliation pass failed"),
        }
    }
}
