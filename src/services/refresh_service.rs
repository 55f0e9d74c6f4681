use std::future::Future;
use std::time::Duration;

use chrono::Local;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::models::report::Report;
use crate::services::report_service::PriceTracker;

/// Build one report against the local clock and hand it to `render`
pub async fn run_once<F>(tracker: &PriceTracker, symbol: &str, mut render: F) -> Report
where
    F: FnMut(&Report),
{
    let report = tracker.build_report(symbol, &Local::now()).await;
    render(&report);
    report
}

/// Rebuild the report every `period` until `shutdown` resolves.
///
/// The first report is built immediately. A slow run delays the next tick
/// instead of firing a burst to catch up. Returns the number of reports
/// rendered.
pub async fn run_periodic<F, S>(
    tracker: &PriceTracker,
    symbol: &str,
    period: Duration,
    shutdown: S,
    mut render: F,
) -> usize
where
    F: FnMut(&Report),
    S: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!("Refreshing {} every {}s", symbol, period.as_secs_f64());

    let mut rendered = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Stopping refresh loop after {} report(s)", rendered);
                break;
            }
            _ = ticker.tick() => {
                debug!("Refresh tick {}", rendered + 1);
                run_once(tracker, symbol, &mut render).await;
                rendered += 1;
            }
        }
    }

    rendered
}
