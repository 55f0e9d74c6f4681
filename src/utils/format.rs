/// Placeholder shown for any absent value
pub const NOT_AVAILABLE: &str = "N/A";

/// `1234567.891` -> `1,234,567.89`
pub fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// `$50,000.00`, or `N/A`
pub fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) if v < 0.0 => format!("-${}", group_thousands(-v)),
        Some(v) => format!("${}", group_thousands(v)),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `+2.04%`, or `N/A`
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.2}%", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `+1,000.00` / `-1,000.00`, or `N/A`. Anything that rounds to zero is `+0.00`.
pub fn format_signed_amount(value: Option<f64>) -> String {
    let rounded = match value {
        Some(v) => (v * 100.0).round() / 100.0,
        None => return NOT_AVAILABLE.to_string(),
    };
    if rounded < 0.0 {
        group_thousands(rounded)
    } else {
        format!("+{}", group_thousands(rounded))
    }
}
