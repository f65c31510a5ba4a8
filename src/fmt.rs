use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::reports::TimeRange;

fn cents(val: Decimal) -> Decimal {
    val.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a decimal as a dollar amount with thousands separators: $1,234.56
pub fn money(val: Decimal) -> String {
    let rounded = cents(val);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let fixed = format!("{:.2}", rounded.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Plain two-decimal amount for CSV cells.
pub fn amount(val: Decimal) -> String {
    format!("{:.2}", cents(val))
}

/// Signed percentage with one decimal: +12.5%, -3.0%
pub fn percent(val: Decimal) -> String {
    let rounded = val.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("{:.1}%", rounded)
    } else {
        format!("+{:.1}%", rounded.abs())
    }
}

/// `YYYY-MM` becomes a short month name, `YYYY-MM-DD` becomes `Mar 5`.
pub fn bucket_label(key: &str) -> String {
    if key.len() == 7 {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d") {
            return date.format("%b").to_string();
        }
    }
    match NaiveDate::parse_from_str(key, "%Y-%m-%d") {
        Ok(date) => date.format("%b %-d").to_string(),
        Err(_) => key.to_string(),
    }
}

/// Category heading: first letter upper-case, the rest lower-case.
pub fn category_title(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn range_label(range: TimeRange) -> &'static str {
    match range {
        TimeRange::Week => "Last 7 days",
        TimeRange::Month => "Last 30 days",
        TimeRange::Year => "Last year",
    }
}

pub fn period_label(range: TimeRange) -> String {
    format!("vs previous {}", range.key())
}
