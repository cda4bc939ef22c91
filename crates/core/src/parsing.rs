//! Locale-specific text parsing for the Korean currency and percentage
//! idioms used by reference templates ("월 300만-1,000만원", "12,000원", "30%").
//!
//! Every parser returns `None` on malformed input; callers decide whether
//! that is a non-match or a logged default.

/// Ten-thousand multiplier written as `만`.
const MAN: u64 = 10_000;

/// Parse a monthly budget range such as `"월 300만-1,000만원"` into
/// `(min, max)` in whole currency units.
pub fn parse_budget_range(raw: &str) -> Option<(u64, u64)> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '월' | '원' | ',') && !c.is_whitespace())
        .collect();

    let mut parts = cleaned.split('-');
    let (min, max) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let min = parse_man_amount(min)?;
    let max = parse_man_amount(max)?;
    (min <= max).then_some((min, max))
}

/// `"300만"` → 3_000_000, `"500000"` → 500_000.
fn parse_man_amount(raw: &str) -> Option<u64> {
    match raw.strip_suffix('만') {
        Some(digits) => digits.parse::<u64>().ok()?.checked_mul(MAN),
        None => raw.parse::<u64>().ok(),
    }
}

/// Parse a percentage string (`"30%"`, `"12.5 %"`) into its number (`30.0`).
pub fn parse_percent_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    let value = number.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Parse a percentage string into a ratio (`"30%"` → `0.30`).
pub fn parse_percentage(raw: &str) -> Option<f64> {
    parse_percent_value(raw).map(|v| v / 100.0)
}

/// Parse a currency amount such as `"12,000원"` or `"15000"`.
pub fn parse_currency(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('원')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<u64>().ok()
}

/// Format an integer with comma thousands separators (`3000000` → `"3,000,000"`).
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a KPI amount: whole numbers get separators, fractions keep two places.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value >= 0.0 && value <= u64::MAX as f64 {
        format_thousands(value as u64)
    } else {
        format!("{:.2}", value)
    }
}
