use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One purchased line item, as stored in the user's `items` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vendor: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    /// `None` when the stored value was missing or unparsable.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl PurchaseRecord {
    pub fn new(
        name: &str,
        price: Decimal,
        vendor: &str,
        category: &str,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.to_string(),
            price,
            vendor: vendor.to_string(),
            category: category.to_string(),
            uploaded_at: Some(uploaded_at),
        }
    }

    /// Build a record from untyped text fields (CSV rows), coercing the same
    /// way the JSON loader does.
    pub fn from_raw(name: &str, price: &str, vendor: &str, category: &str, uploaded_at: &str) -> Self {
        Self {
            name: name.to_string(),
            price: coerce_decimal_str(price),
            vendor: vendor.to_string(),
            category: category.to_string(),
            uploaded_at: parse_timestamp(uploaded_at),
        }
    }
}

/// Running balance a friend owes from split receipts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendBalance {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub amount: Decimal,
}

/// The per-user document. Fields this tool does not understand (ids,
/// password hashes, timestamps) are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default)]
    pub items: Vec<PurchaseRecord>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub friends: Vec<FriendBalance>,
    #[serde(default, deserialize_with = "lenient_opt_decimal", skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_opt_decimal", skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserDocument {
    pub fn from_items(items: Vec<PurchaseRecord>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }
}

/// Result of the OCR backend for one receipt.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptScan {
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub items: Vec<ScannedLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScannedLine {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
}

// ---------------------------------------------------------------------------
// Permissive coercion
// ---------------------------------------------------------------------------

/// Numbers and numeric strings become decimals; everything else is zero.
pub fn coerce_decimal(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()).unwrap_or(Decimal::ZERO),
        Value::String(s) => coerce_decimal_str(s),
        _ => Decimal::ZERO,
    }
}

pub fn coerce_decimal_str(raw: &str) -> Decimal {
    let s = raw.trim();
    if s.is_empty() {
        return Decimal::ZERO;
    }
    parse_decimal(s).unwrap_or(Decimal::ZERO)
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) and bare
/// `YYYY-MM-DD` (UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

fn coerce_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => Utc.timestamp_millis_opt(n.as_f64()? as i64).single(),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_decimal<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Decimal, D::Error> {
    Ok(coerce_decimal(&Value::deserialize(d)?))
}

fn lenient_opt_decimal<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<Decimal>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        other => Some(coerce_decimal(&other)),
    })
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
    Ok(coerce_timestamp(&Value::deserialize(d)?))
}
