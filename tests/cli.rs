use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const NOW: &str = "2026-10-17T12:00:00Z";

const USER_DOC: &str = r#"{
    "_id": "64f0c0ffee",
    "firstName": "Ada",
    "lastName": "Lovelace",
    "email": "ada@example.com",
    "items": [
        {"name": "Lunch", "price": 12.5, "vendor": "Cafe", "category": "food", "uploadedAt": "2026-10-16T12:00:00.000Z"},
        {"name": "Train", "price": "22.50", "vendor": "Rail", "category": "travel", "uploadedAt": "2026-10-15T08:00:00.000Z"},
        {"name": "Boots", "price": 40, "vendor": "Shop", "category": "clothes", "uploadedAt": "2026-09-01T10:00:00.000Z"}
    ],
    "categories": ["food", "travel"],
    "friends": [{"name": "Sam", "amount": "4.00"}]
}"#;

const RECEIPT: &str = r#"{
    "store_name": "Corner Shop",
    "items": [
        {"name": "Milk", "price": 2.49, "category": "food"},
        {"name": "Wine", "price": 9.99, "category": "food"}
    ]
}"#;

fn ocrganise(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ocrganise").unwrap();
    cmd.env("OCRGANISE_HOME", home).env_remove("RUST_LOG");
    cmd
}

fn fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_report_json() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "user.json", USER_DOC);

    let output = ocrganise(dir.path())
        .args(["report", "--json", "--range", "week", "--now", NOW, "--tz", "UTC", "--file"])
        .arg(&doc)
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["range"], "week");
    assert_eq!(v["totalSpent"].as_f64(), Some(35.0));
    assert_eq!(v["averagePerDay"].as_f64(), Some(5.0));
    assert_eq!(v["topCategory"], "travel");
    assert_eq!(v["topVendor"], "Rail");
    assert_eq!(v["percentChange"].as_f64(), Some(100.0));
    assert_eq!(v["bucketedSeries"].as_array().unwrap().len(), 8);
    assert_eq!(v["categoryTotals"][1]["name"], "food");
}

#[test]
fn test_report_year_json_uses_month_buckets() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "user.json", USER_DOC);

    let output = ocrganise(dir.path())
        .args(["report", "--json", "--range", "year", "--now", NOW, "--file"])
        .arg(&doc)
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let series = v["bucketedSeries"].as_array().unwrap();
    assert_eq!(series.len(), 12);
    assert_eq!(series[11]["key"], "2026-10");
    assert_eq!(v["topCategory"], "clothes");
}

#[test]
fn test_report_tables() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "user.json", USER_DOC);

    ocrganise(dir.path())
        .args(["report", "--now", NOW, "--file"])
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Spent"))
        .stdout(predicate::str::contains("$35.00"))
        .stdout(predicate::str::contains("Last 7 days"))
        .stdout(predicate::str::contains("+100.0%"))
        .stdout(predicate::str::contains("Category Breakdown"))
        .stdout(predicate::str::contains("Spending by Vendor"))
        .stdout(predicate::str::contains("Oct 16"));
}

#[test]
fn test_report_reads_csv() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(
        &dir,
        "items.csv",
        "name,price,vendor,category,uploadedAt\nTea,3.20,Cafe,food,2026-10-17T08:00:00Z\n",
    );

    ocrganise(dir.path())
        .args(["report", "--view", "overview", "--now", NOW, "--file"])
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("$3.20"))
        .stdout(predicate::str::contains("Spending Trends").not());
}

#[test]
fn test_report_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "user.json", r#"{"items": []}"#);

    ocrganise(dir.path())
        .args(["report", "--now", NOW, "--file"])
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("No spending data available"));
}

#[test]
fn test_report_rejects_unknown_range() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "user.json", USER_DOC);

    ocrganise(dir.path())
        .args(["report", "--range", "decade", "--file"])
        .arg(&doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown range: decade"));
}

#[test]
fn test_report_rejects_bad_timezone() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "user.json", USER_DOC);

    ocrganise(dir.path())
        .args(["report", "--tz", "Mars/Olympus", "--file"])
        .arg(&doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone"));
}

#[test]
fn test_export_series_csv() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "user.json", USER_DOC);
    let out = dir.path().join("series.csv");

    ocrganise(dir.path())
        .args(["export", "--range", "week", "--now", NOW, "--file"])
        .arg(&doc)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let csv = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[0], "bucket,label,total");
    assert!(lines.contains(&"2026-10-15,Oct 15,22.50"));
    assert!(lines.contains(&"2026-10-16,Oct 16,12.50"));
}

#[test]
fn test_split_then_owed() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "user.json", USER_DOC);
    let receipt = fixture(&dir, "receipt.json", RECEIPT);

    ocrganise(dir.path())
        .arg("split")
        .arg(&receipt)
        .args(["--assign", "Wine=sam", "--now", NOW, "--file"])
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 1 item(s) and 1 friend balance(s)"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&doc).unwrap()).unwrap();
    assert_eq!(saved["_id"], "64f0c0ffee");
    assert_eq!(saved["items"].as_array().unwrap().len(), 4);
    assert_eq!(saved["items"][3]["vendor"], "Corner Shop");
    assert_eq!(saved["friends"][0]["name"], "Sam");
    let owed = saved["friends"][0]["amount"].as_f64().unwrap();
    assert!((owed - 13.99).abs() < 1e-9, "got: {owed}");

    ocrganise(dir.path())
        .args(["owed", "--file"])
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sam"))
        .stdout(predicate::str::contains("$13.99"));
}

#[test]
fn test_split_dry_run_leaves_document_alone() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "user.json", USER_DOC);
    let receipt = fixture(&dir, "receipt.json", RECEIPT);

    ocrganise(dir.path())
        .arg("split")
        .arg(&receipt)
        .args(["--assign", "Milk=Jo", "--dry-run", "--file"])
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert_eq!(std::fs::read_to_string(&doc).unwrap(), USER_DOC);
}

#[test]
fn test_owed_clear() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "user.json", USER_DOC);

    ocrganise(dir.path())
        .args(["owed", "--clear", "sam", "--file"])
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared balance for sam"))
        .stdout(predicate::str::contains("No friends owe you anything yet."))
        .stdout(predicate::str::contains("Sam").not());

    // The settled entry is kept in the document at zero.
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&doc).unwrap()).unwrap();
    assert_eq!(saved["friends"][0]["name"], "Sam");
    assert_eq!(saved["friends"][0]["amount"].as_f64(), Some(0.0));

    ocrganise(dir.path())
        .args(["owed", "--clear", "Max", "--file"])
        .arg(&doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown friend: Max"));
}

#[test]
fn test_init_creates_document_and_settings() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");

    ocrganise(dir.path())
        .args(["init", "--tz", "Europe/London", "--range", "month", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized ocrganise"));

    assert!(data_dir.join("user.json").exists());
    assert!(data_dir.join("exports").is_dir());
    let settings = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
    assert!(settings.contains("Europe/London"));
    assert!(settings.contains("\"month\""));

    // The saved defaults apply when flags are omitted.
    let output = ocrganise(dir.path())
        .args(["report", "--json", "--now", NOW])
        .output()
        .unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["range"], "month");
    assert_eq!(v["bucketedSeries"].as_array().unwrap().len(), 31);
}

#[test]
fn test_split_skips_lines() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "user.json", USER_DOC);
    let receipt = fixture(&dir, "receipt.json", RECEIPT);

    ocrganise(dir.path())
        .arg("split")
        .arg(&receipt)
        .args(["--skip", "wine", "--now", NOW, "--file"])
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("(skipped)"))
        .stdout(predicate::str::contains("Saved 1 item(s) and 0 friend balance(s)"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&doc).unwrap()).unwrap();
    let items = saved["items"].as_array().unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[3]["name"], "Milk");
    assert_eq!(saved["friends"][0]["amount"].as_f64(), Some(4.0));
}

#[test]
fn test_category_lists_items_and_total() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "user.json", USER_DOC);

    ocrganise(dir.path())
        .args(["category", "FOOD", "--file"])
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("Food"))
        .stdout(predicate::str::contains("Lunch"))
        .stdout(predicate::str::contains("2026-10-16"))
        .stdout(predicate::str::contains("Total Spent: $12.50"))
        .stdout(predicate::str::contains("Train").not());

    ocrganise(dir.path())
        .args(["category", "groceries", "--file"])
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("No items found in this category"));
}

#[test]
fn test_category_overview_covers_all_dates() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "user.json", USER_DOC);

    ocrganise(dir.path())
        .args(["category", "--file"])
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("Categories"))
        .stdout(predicate::str::contains("clothes"))
        .stdout(predicate::str::contains("$40.00"))
        .stdout(predicate::str::contains("travel"));
}

#[test]
fn test_settings_without_data_dir_keep_their_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "user.json", USER_DOC);
    fixture(&dir, "settings.json", r#"{"default_range": "month", "timezone": "Europe/London"}"#);

    let output = ocrganise(dir.path())
        .args(["report", "--json", "--now", NOW, "--file"])
        .arg(&doc)
        .output()
        .unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["range"], "month");
    assert_eq!(v["bucketedSeries"].as_array().unwrap().len(), 31);
}
