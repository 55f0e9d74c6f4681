use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::models::price::CandleWindow;

const CANDLE_SEARCH_RADIUS_SECS: i64 = 5 * 60;
const DAILY_FALLBACK_RADIUS_SECS: i64 = 24 * 60 * 60;

/// Radius of the minute-candle search window
pub fn candle_search_radius() -> Duration {
    Duration::seconds(CANDLE_SEARCH_RADIUS_SECS)
}

/// Radius of the daily-candle fallback window
pub fn daily_fallback_radius() -> Duration {
    Duration::seconds(DAILY_FALLBACK_RADIUS_SECS)
}

/// Parse a wall-clock mark in `HH:MM:SS` form
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M:%S")
        .map_err(|e| format!("Invalid time of day '{}': expected HH:MM:SS ({})", input, e))
}

/// Most recent occurrence of `time_of_day` at or before `now`, in `now`'s zone.
///
/// Today's date is tried first and rolls back one calendar day if that
/// lands after `now`.
pub fn resolve_today<Tz: TimeZone>(time_of_day: NaiveTime, now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive().and_time(time_of_day);

    let resolved = localize(&tz, today);
    if resolved > *now {
        localize(&tz, today - Duration::days(1))
    } else {
        resolved
    }
}

/// Attach a zone to a naive local time. Ambiguous times take the earlier
/// instant; times inside a DST gap move forward one hour.
fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// `[instant - radius, instant + radius]` in UTC
pub fn window_around<Tz: TimeZone>(instant: &DateTime<Tz>, radius: Duration) -> CandleWindow {
    let center = instant.with_timezone(&Utc);
    CandleWindow {
        start: center - radius,
        end: center + radius,
    }
}
