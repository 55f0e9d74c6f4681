use chrono::{DateTime, Utc};

use crate::models::price::{Candle, PricePoint};
use crate::models::report::ComparisonResult;

/// Candle whose open time is closest to `target`, as a price point.
/// Ties go to the earlier candle in input order.
pub fn pick_nearest(candles: &[Candle], target: DateTime<Utc>) -> Option<PricePoint> {
    let mut best: Option<(&Candle, i64)> = None;

    for candle in candles {
        let distance = (candle.open_time - target).num_milliseconds().abs();
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((candle, distance)),
        }
    }

    best.map(|(candle, _)| candle.to_price_point())
}

/// `(new - old) / old * 100`.
///
/// Absent when either side is absent, when `old` is zero, or when the
/// result is not finite.
pub fn percent_change(old: Option<f64>, new: Option<f64>) -> Option<f64> {
    let (old, new) = (old?, new?);
    if old == 0.0 {
        return None;
    }
    let change = (new - old) / old * 100.0;
    change.is_finite().then_some(change)
}

/// `new - old`, absent when either side is absent
pub fn absolute_change(old: Option<f64>, new: Option<f64>) -> Option<f64> {
    Some(new? - old?)
}

/// Compare `current` against `baseline`
pub fn compare(baseline: Option<PricePoint>, current: Option<PricePoint>) -> ComparisonResult {
    let old = baseline.as_ref().map(|p| p.value);
    let new = current.as_ref().map(|p| p.value);

    ComparisonResult {
        percent_change: percent_change(old, new),
        absolute_change: absolute_change(old, new),
        baseline,
        current,
    }
}
