//! Report models handed to the presentation layer

use chrono::{DateTime, NaiveTime, Utc};

use crate::models::price::PricePoint;
use crate::utils::errors::PriceError;

/// Change of `current` relative to `baseline`.
///
/// Both deltas are absent unless both prices are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonResult {
    pub baseline: Option<PricePoint>,
    pub current: Option<PricePoint>,
    pub percent_change: Option<f64>,
    pub absolute_change: Option<f64>,
}

/// Direction of a price move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Higher,
    Lower,
    Unchanged,
}

impl Trend {
    pub fn from_change(percent: f64) -> Self {
        if percent > 0.0 {
            Trend::Higher
        } else if percent < 0.0 {
            Trend::Lower
        } else {
            Trend::Unchanged
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trend::Higher => "📈 Higher",
            Trend::Lower => "📉 Lower",
            Trend::Unchanged => "➡️ Same",
        }
    }
}

/// Which report field a fetch failure left empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportField {
    Current,
    Morning,
    Evening,
}

impl ReportField {
    pub fn name(&self) -> &'static str {
        match self {
            ReportField::Current => "current price",
            ReportField::Morning => "morning reference",
            ReportField::Evening => "evening reference",
        }
    }
}

/// A fetch failure attached to the report instead of being raised
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: ReportField,
    pub error: PriceError,
}

/// One reference mark and how the current price compares against it
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceComparison {
    pub mark: NaiveTime,
    pub resolved_at: Option<DateTime<Utc>>,
    pub comparison: ComparisonResult,
}

impl ReferenceComparison {
    /// Mark formatted as `HH:MM:SS`
    pub fn label(&self) -> String {
        self.mark.format("%H:%M:%S").to_string()
    }

    pub fn baseline_price(&self) -> Option<f64> {
        self.comparison.baseline.as_ref().map(|p| p.value)
    }

    pub fn trend(&self) -> Option<Trend> {
        self.comparison.percent_change.map(Trend::from_change)
    }
}

/// Everything one tracker run produced
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub current: Option<PricePoint>,
    pub morning: ReferenceComparison,
    pub evening: ReferenceComparison,
    pub errors: Vec<FieldError>,
}

impl Report {
    pub fn current_price(&self) -> Option<f64> {
        self.current.as_ref().map(|p| p.value)
    }

    /// True when the current price and both baselines are present
    pub fn is_complete(&self) -> bool {
        self.current.is_some()
            && self.morning.comparison.baseline.is_some()
            && self.evening.comparison.baseline.is_some()
    }

    pub fn error_for(&self, field: ReportField) -> Option<&PriceError> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| &e.error)
    }
}
