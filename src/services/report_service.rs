use std::sync::Arc;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use tracing::{debug, info, warn};

use crate::api::delta::PriceSource;
use crate::models::price::{PricePoint, Resolution};
use crate::models::report::{FieldError, ReferenceComparison, Report, ReportField};
use crate::services::comparison_service::{compare, pick_nearest};
use crate::services::time_service::{
    candle_search_radius, daily_fallback_radius, resolve_today, window_around,
};
use crate::utils::errors::PriceError;

/// The 05:29:59 morning and 17:29:59 evening reference marks
pub fn default_marks() -> (NaiveTime, NaiveTime) {
    let morning = NaiveTime::from_hms_opt(5, 29, 59).unwrap_or(NaiveTime::MIN);
    let evening = NaiveTime::from_hms_opt(17, 29, 59).unwrap_or(NaiveTime::MIN);
    (morning, evening)
}

/// Builds price reports against two daily reference marks.
///
/// Holds no state between runs; every call re-fetches from the source.
pub struct PriceTracker {
    source: Arc<dyn PriceSource>,
    morning_mark: NaiveTime,
    evening_mark: NaiveTime,
}

impl PriceTracker {
    pub fn new(source: Arc<dyn PriceSource>, morning_mark: NaiveTime, evening_mark: NaiveTime) -> Self {
        Self {
            source,
            morning_mark,
            evening_mark,
        }
    }

    #[cfg(test)]
    pub fn with_default_marks(source: Arc<dyn PriceSource>) -> Self {
        let (morning, evening) = default_marks();
        Self::new(source, morning, evening)
    }

    /// Fetch the current price and both baselines for `symbol` and compare them.
    ///
    /// Never fails: a fetch that errors leaves its field empty and adds a
    /// `FieldError` to the report. The three fetches run concurrently.
    pub async fn build_report<Tz: TimeZone>(&self, symbol: &str, now: &DateTime<Tz>) -> Report {
        let morning_at = resolve_today(self.morning_mark, now).with_timezone(&Utc);
        let evening_at = resolve_today(self.evening_mark, now).with_timezone(&Utc);

        debug!(
            "Building report for {}: morning={} evening={}",
            symbol, morning_at, evening_at
        );

        let (current, morning, evening) = tokio::join!(
            self.source.fetch_current_price(symbol),
            self.fetch_baseline(symbol, morning_at),
            self.fetch_baseline(symbol, evening_at),
        );

        let mut errors = Vec::new();
        let current = settle(ReportField::Current, current, &mut errors);
        let morning = settle(ReportField::Morning, morning, &mut errors);
        let evening = settle(ReportField::Evening, evening, &mut errors);

        let report = Report {
            symbol: symbol.to_string(),
            generated_at: now.with_timezone(&Utc),
            morning: ReferenceComparison {
                mark: self.morning_mark,
                resolved_at: Some(morning_at),
                comparison: compare(morning, current.clone()),
            },
            evening: ReferenceComparison {
                mark: self.evening_mark,
                resolved_at: Some(evening_at),
                comparison: compare(evening, current.clone()),
            },
            current,
            errors,
        };

        info!(
            "{} report: current={:?} vs {}={:?}% vs {}={:?}% ({} error(s))",
            report.symbol,
            report.current_price(),
            report.morning.label(),
            report.morning.comparison.percent_change,
            report.evening.label(),
            report.evening.comparison.percent_change,
            report.errors.len()
        );

        report
    }

    /// Historical price nearest `target`.
    ///
    /// Looks at 1-minute candles within five minutes of the target first. When
    /// that query fails or comes back empty, the first daily candle within a
    /// day of the target is used instead. If the daily query has nothing
    /// either, the minute query's error wins over the daily one.
    async fn fetch_baseline(&self, symbol: &str, target: DateTime<Utc>) -> Result<PricePoint, PriceError> {
        let window = window_around(&target, candle_search_radius());
        let minute_error = match self
            .source
            .fetch_candles(symbol, &window, Resolution::OneMinute)
            .await
        {
            Ok(candles) => {
                if let Some(point) = pick_nearest(&candles, target) {
                    return Ok(point);
                }
                debug!("No minute candles for {} around {}, trying daily candles", symbol, target);
                None
            }
            Err(e) => {
                debug!("Minute candles for {} around {} failed ({}), trying daily candles", symbol, target, e);
                Some(e)
            }
        };

        let daily_window = window_around(&target, daily_fallback_radius());
        let daily = self
            .source
            .fetch_candles(symbol, &daily_window, Resolution::OneDay)
            .await;

        match (daily, minute_error) {
            (Ok(candles), _) if !candles.is_empty() => Ok(candles[0].to_price_point()),
            (_, Some(minute_error)) => Err(minute_error),
            (Err(daily_error), None) => Err(daily_error),
            (Ok(_), None) => Err(PriceError::NoData(format!(
                "No historical data for {} around {}",
                symbol, target
            ))),
        }
    }
}

/// Keep a successful value, or record the failure against `field`
fn settle<T>(field: ReportField, result: Result<T, PriceError>, errors: &mut Vec<FieldError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            warn!("Failed to fetch {}: {}", field.name(), error);
            errors.push(FieldError { field, error });
            None
        }
    }
}
