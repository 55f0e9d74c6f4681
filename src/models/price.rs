//! Price and candle models

use chrono::{DateTime, Utc};

/// A price observed at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl PricePoint {
    pub fn new(value: f64, timestamp: DateTime<Utc>) -> Self {
        Self { value, timestamp }
    }
}

/// One OHLC bar; only the open time and close are used
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub close: f64,
}

impl Candle {
    /// The candle's close, stamped with its open time
    pub fn to_price_point(&self) -> PricePoint {
        PricePoint::new(self.close, self.open_time)
    }
}

/// Closed time range used to query historical candles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandleWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CandleWindow {
    #[cfg(test)]
    pub fn span(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// Candle resolution accepted by the history endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    OneMinute,
    OneDay,
}

impl Resolution {
    /// Query-string value for the `resolution` parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            Resolution::OneMinute => "1",
            Resolution::OneDay => "1D",
        }
    }
}
