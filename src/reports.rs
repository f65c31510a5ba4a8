use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{OcrError, Result};
use crate::models::PurchaseRecord;

// ---------------------------------------------------------------------------
// Range and time zone
// ---------------------------------------------------------------------------

/// Trailing reporting window ending at the reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Month,
}

impl TimeRange {
    pub fn days(&self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::days(self.days())
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            Self::Year => Granularity::Month,
            _ => Granularity::Day,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl FromStr for TimeRange {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(OcrError::UnknownRange(other.to_string())),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub fn parse_timezone(s: &str) -> Result<Tz> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(chrono_tz::UTC);
    }
    trimmed
        .parse::<Tz>()
        .map_err(|_| OcrError::InvalidTimezone(trimmed.to_string()))
}

pub fn window_start(range: TimeRange, now: DateTime<Utc>) -> DateTime<Utc> {
    now - range.window()
}

fn uploaded_between(
    record: &PurchaseRecord,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> bool {
    // Missing timestamps never satisfy a window comparison.
    match record.uploaded_at {
        Some(ts) => ts >= start && end.map_or(true, |end| ts < end),
        None => false,
    }
}

/// Sums saturate at `Decimal::MAX` instead of overflowing.
fn sum_prices<'a>(records: impl IntoIterator<Item = &'a PurchaseRecord>) -> Decimal {
    records
        .into_iter()
        .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.price))
}

/// `part * 100 / whole` without panicking. Falls back to `f64` when the
/// exact intermediate overflows, and saturates when the result itself does
/// not fit.
fn ratio_percent(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
        .or_else(|| Decimal::from_f64(part.to_f64()? * 100.0 / whole.to_f64()?))
        .unwrap_or(if part.is_sign_negative() == whole.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        })
}

// ---------------------------------------------------------------------------
// Window filter and totals
// ---------------------------------------------------------------------------

/// Records uploaded at or after the window start. There is no upper bound,
/// so future-dated records are kept.
pub fn filter_by_range(
    records: &[PurchaseRecord],
    range: TimeRange,
    now: DateTime<Utc>,
) -> Vec<&PurchaseRecord> {
    let start = window_start(range, now);
    records
        .iter()
        .filter(|r| uploaded_between(r, start, None))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub total_spent: Decimal,
    pub average_per_day: Decimal,
}

/// The average divides by the calendar length of the window, not by the
/// number of days that have spending.
pub fn totals(filtered: &[&PurchaseRecord], range: TimeRange) -> Totals {
    let total_spent = sum_prices(filtered.iter().copied());
    Totals {
        total_spent,
        average_per_day: total_spent
            .checked_div(Decimal::from(range.days()))
            .unwrap_or(Decimal::ZERO),
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTotal {
    #[serde(rename = "name")]
    pub key: String,
    pub total: Decimal,
    /// Position of the key's first record, kept for palette assignment.
    #[serde(skip)]
    pub first_seen: usize,
}

/// Sums prices per key, largest total first. Equal totals keep the order in
/// which their keys first appeared.
pub fn group_by<F>(filtered: &[&PurchaseRecord], key_fn: F) -> Vec<GroupTotal>
where
    F: Fn(&PurchaseRecord) -> String,
{
    let mut groups: Vec<GroupTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for &record in filtered {
        let key = key_fn(record);
        match index.get(&key) {
            Some(&i) => groups[i].total = groups[i].total.saturating_add(record.price),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(GroupTotal {
                    key,
                    total: record.price,
                    first_seen: groups.len(),
                });
            }
        }
    }
    groups.sort_by(|a, b| b.total.cmp(&a.total));
    groups
}

pub fn category_key(record: &PurchaseRecord) -> String {
    if record.category.is_empty() {
        "uncategorized".to_string()
    } else {
        record.category.clone()
    }
}

pub fn vendor_key(record: &PurchaseRecord) -> String {
    if record.vendor.is_empty() {
        "Unknown".to_string()
    } else {
        record.vendor.clone()
    }
}

/// Percentage of `whole` that `part` represents, zero for an empty whole.
pub fn share_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        ratio_percent(part, whole)
    }
}

/// Every record filed under `name`, compared case-insensitively and with no
/// date window. Records without a category answer to `uncategorized`.
pub fn category_items<'a>(records: &'a [PurchaseRecord], name: &str) -> Vec<&'a PurchaseRecord> {
    let wanted = name.trim().to_lowercase();
    records
        .iter()
        .filter(|r| category_key(r).to_lowercase() == wanted)
        .collect()
}

/// Sum of the given records' prices.
pub fn total_of(records: &[&PurchaseRecord]) -> Decimal {
    sum_prices(records.iter().copied())
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub key: String,
    pub total: Decimal,
}

pub fn bucket_key(ts: DateTime<Utc>, granularity: Granularity, tz: Tz) -> String {
    let local = ts.with_timezone(&tz);
    match granularity {
        Granularity::Day => local.format("%Y-%m-%d").to_string(),
        Granularity::Month => local.format("%Y-%m").to_string(),
    }
}

fn month_key_back(date: NaiveDate, months: i32) -> String {
    let index = date.year() * 12 + date.month0() as i32 - months;
    format!("{:04}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1)
}

fn empty_buckets(range: TimeRange, now: DateTime<Utc>, tz: Tz) -> BTreeMap<String, Decimal> {
    let mut buckets = BTreeMap::new();
    let today = now.with_timezone(&tz).date_naive();
    match range.granularity() {
        Granularity::Day => {
            let mut day = window_start(range, now).with_timezone(&tz).date_naive();
            while day <= today {
                buckets.insert(day.format("%Y-%m-%d").to_string(), Decimal::ZERO);
                day = day + Duration::days(1);
            }
        }
        Granularity::Month => {
            for back in 0..12 {
                buckets.insert(month_key_back(today, back), Decimal::ZERO);
            }
        }
    }
    buckets
}

/// Spending per calendar day (week, month) or calendar month (year) in `tz`,
/// with every slot of the window present. Records that land outside the
/// prepared slots are left out of the series only.
pub fn bucket_series(
    filtered: &[&PurchaseRecord],
    range: TimeRange,
    now: DateTime<Utc>,
    tz: Tz,
) -> Vec<Bucket> {
    let mut buckets = empty_buckets(range, now, tz);
    let granularity = range.granularity();
    for record in filtered {
        let Some(ts) = record.uploaded_at else {
            continue;
        };
        if let Some(slot) = buckets.get_mut(&bucket_key(ts, granularity, tz)) {
            *slot = slot.saturating_add(record.price);
        }
    }
    buckets
        .into_iter()
        .map(|(key, total)| Bucket { key, total })
        .collect()
}

/// Buckets that saw spending, newest first.
pub fn daily_breakdown(series: &[Bucket]) -> Vec<&Bucket> {
    let mut days: Vec<&Bucket> = series
        .iter()
        .filter(|b| b.total > Decimal::ZERO)
        .collect();
    days.sort_by(|a, b| b.key.cmp(&a.key));
    days
}

// ---------------------------------------------------------------------------
// Period comparison
// ---------------------------------------------------------------------------

/// Change of the current window against the equal-length window just before
/// it (`[now - 2w, now - w)`). An empty previous window reports +100.
pub fn percent_change(records: &[PurchaseRecord], range: TimeRange, now: DateTime<Utc>) -> Decimal {
    let current = sum_prices(filter_by_range(records, range, now));
    let previous_start = now - range.window() - range.window();
    let previous_end = window_start(range, now);
    let previous = sum_prices(
        records
            .iter()
            .filter(|r| uploaded_between(r, previous_start, Some(previous_end))),
    );
    if previous.is_zero() {
        return Decimal::ONE_HUNDRED;
    }
    ratio_percent(current.saturating_sub(previous), previous)
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub range: TimeRange,
    pub total_spent: Decimal,
    pub average_per_day: Decimal,
    pub category_totals: Vec<GroupTotal>,
    pub vendor_totals: Vec<GroupTotal>,
    pub bucketed_series: Vec<Bucket>,
    pub top_category: Option<String>,
    pub top_vendor: Option<String>,
    pub percent_change: Decimal,
}

pub fn aggregate(
    records: &[PurchaseRecord],
    range: TimeRange,
    now: DateTime<Utc>,
    tz: Tz,
) -> AggregateResult {
    let filtered = filter_by_range(records, range, now);
    let Totals {
        total_spent,
        average_per_day,
    } = totals(&filtered, range);
    let category_totals = group_by(&filtered, category_key);
    let vendor_totals = group_by(&filtered, vendor_key);
    let bucketed_series = bucket_series(&filtered, range, now, tz);

    AggregateResult {
        range,
        total_spent,
        average_per_day,
        top_category: category_totals.first().map(|g| g.key.clone()),
        top_vendor: vendor_totals.first().map(|g| g.key.clone()),
        category_totals,
        vendor_totals,
        bucketed_series,
        percent_change: percent_change(records, range, now),
    }
}
