use chrono::Local;

use crate::models::report::{ReferenceComparison, Report, ReportField};
use crate::services::comparison_service::percent_change;
use crate::utils::format::{format_percent, format_price, format_signed_amount, NOT_AVAILABLE};
use crate::utils::Table;

/// Render a report as plain text for the terminal
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();

    out.push_str(&format!("₿ {} Price Tracker\n\n", report.symbol));

    let mut metrics = Table::new(vec!["", "Price", "Change"]);
    metrics.add_row(vec![
        "Current".to_string(),
        format_price(report.current_price()),
        String::new(),
    ]);
    for reference in [&report.morning, &report.evening] {
        metrics.add_row(vec![
            format!("vs {}", reference.label()),
            format_price(reference.baseline_price()),
            format_percent(reference.comparison.percent_change),
        ]);
    }
    out.push_str(&metrics.render());
    out.push_str(&format!(
        "Last updated: {}\n",
        report.generated_at.with_timezone(&Local).format("%H:%M:%S")
    ));

    if report.is_complete() {
        out.push_str("\n📈 Detailed Analysis\n");
        out.push_str(&render_analysis(report));
        out.push_str("\n💡 Summary\n");
        for reference in [&report.morning, &report.evening] {
            out.push_str(&render_summary_line(reference));
            out.push('\n');
        }
    } else {
        out.push_str("\n⚠️ Some price data is unavailable:\n");
        for field in [ReportField::Current, ReportField::Morning, ReportField::Evening] {
            if let Some(error) = report.error_for(field) {
                out.push_str(&format!("  - {} ({}): {}\n", field.name(), error.kind(), error));
            }
        }
    }

    out
}

/// Per-mark table: price, move relative to current, and absolute gap
fn render_analysis(report: &Report) -> String {
    let current = report.current_price();
    let mut table = Table::new(vec![
        "Time Period",
        "Price ($)",
        "Change from Current (%)",
        "Absolute Difference ($)",
    ]);

    for reference in [&report.morning, &report.evening] {
        table.add_row(vec![
            reference.label(),
            format_price(reference.baseline_price()),
            format_percent(percent_change(current, reference.baseline_price())),
            format_signed_amount(reference.comparison.absolute_change),
        ]);
    }

    table.add_row(vec![
        "Current".to_string(),
        format_price(current),
        "0.00%".to_string(),
        "0.00".to_string(),
    ]);

    table.render()
}

fn render_summary_line(reference: &ReferenceComparison) -> String {
    match (reference.trend(), reference.comparison.percent_change) {
        (Some(trend), Some(change)) => format!(
            "Since {}: {} by {:.2}%",
            reference.label(),
            trend.label(),
            change.abs()
        ),
        _ => format!("Since {}: {}", reference.label(), NOT_AVAILABLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::price::PricePoint;
    use crate::models::report::{ComparisonResult, FieldError};
    use crate::services::comparison_service::compare;
    use crate::utils::errors::PriceError;
    use chrono::{NaiveTime, TimeZone, Utc};

    fn reference(h: u32, baseline: Option<f64>, current: Option<f64>) -> ReferenceComparison {
        let stamp = Utc.with_ymd_and_hms(2024, 1, 15, h, 29, 59).unwrap();
        ReferenceComparison {
            mark: NaiveTime::from_hms_opt(h, 29, 59).unwrap(),
            resolved_at: Some(stamp),
            comparison: compare(
                baseline.map(|v| PricePoint::new(v, stamp)),
                current.map(|v| PricePoint::new(v, stamp)),
            ),
        }
    }

    fn report(current: Option<f64>, errors: Vec<FieldError>) -> Report {
        Report {
            symbol: "BTCUSDT".to_string(),
            generated_at: Utc.with_ymd_and_hms(2024, 1, 15, 20, 0, 0).unwrap(),
            current: current.map(|v| PricePoint::new(v, Utc::now())),
            morning: reference(5, Some(49000.0), current),
            evening: reference(17, Some(51000.0), current),
            errors,
        }
    }

    #[test]
    fn test_render_complete_report() {
        let text = render_report(&report(Some(50000.0), Vec::new()));
        assert!(text.contains("$50,000.00"));
        assert!(text.contains("+2.04%"));
        assert!(text.contains("-1.96%"));
        assert!(text.contains("Detailed Analysis"));
        assert!(text.contains("+1,000.00"));
        assert!(text.contains("Since 05:29:59: 📈 Higher by 2.04%"));
        assert!(text.contains("Since 17:29:59: 📉 Lower by 1.96%"));
    }

    #[test]
    fn test_render_missing_current_shows_na_and_cause() {
        let errors = vec![FieldError {
            field: ReportField::Current,
            error: PriceError::Network("connection refused".to_string()),
        }];
        let text = render_report(&report(None, errors));
        assert!(text.contains("N/A"));
        assert!(!text.contains("Detailed Analysis"));
        assert!(text.contains("current price (network): Network error: connection refused"));
    }

    #[test]
    fn test_summary_line_without_change() {
        let mut reference = reference(5, None, Some(1.0));
        reference.comparison = ComparisonResult::default();
        assert_eq!(render_summary_line(&reference), "Since 05:29:59: N/A");
    }
}
