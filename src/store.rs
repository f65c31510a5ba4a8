use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{OcrError, Result};
use crate::fmt::{amount, bucket_label};
use crate::models::{PurchaseRecord, UserDocument};
use crate::reports::Bucket;

#[derive(Debug, Deserialize)]
struct CsvItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    vendor: String,
    #[serde(default)]
    category: String,
    #[serde(default, rename = "uploadedAt")]
    uploaded_at: String,
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Load a user document from `.json` (full document, `{"items": [...]}` or a
/// bare item array) or `.csv` (one item per row).
pub fn load_document(path: &Path) -> Result<UserDocument> {
    let doc = match extension(path).as_str() {
        "json" => parse_json_document(&std::fs::read_to_string(path)?)?,
        "csv" => UserDocument::from_items(read_csv_items(path)?),
        other => return Err(OcrError::UnsupportedFormat(other.to_string())),
    };
    tracing::debug!(
        path = %path.display(),
        items = doc.items.len(),
        friends = doc.friends.len(),
        "loaded user document"
    );
    Ok(doc)
}

pub fn parse_json_document(content: &str) -> Result<UserDocument> {
    match serde_json::from_str::<Value>(content)? {
        items @ Value::Array(_) => Ok(UserDocument::from_items(serde_json::from_value(items)?)),
        doc @ Value::Object(_) => Ok(serde_json::from_value(doc)?),
        _ => Err(OcrError::Other(
            "expected a user document, an items wrapper or an item array".to_string(),
        )),
    }
}

fn read_csv_items(path: &Path) -> Result<Vec<PurchaseRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;
    let mut items = Vec::new();
    for row in reader.deserialize::<CsvItem>() {
        let row = row?;
        items.push(PurchaseRecord::from_raw(
            &row.name,
            &row.price,
            &row.vendor,
            &row.category,
            &row.uploaded_at,
        ));
    }
    Ok(items)
}

pub fn save_document(path: &Path, doc: &UserDocument) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, format!("{json}\n"))?;
    tracing::info!(path = %path.display(), items = doc.items.len(), "saved user document");
    Ok(())
}

pub fn write_series_csv(path: &Path, series: &[Bucket]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["bucket", "label", "total"])?;
    for bucket in series {
        writer.write_record([
            bucket.key.as_str(),
            bucket_label(&bucket.key).as_str(),
            amount(bucket.total).as_str(),
        ])?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = series.len(), "wrote series csv");
    Ok(())
}
