use comfy_table::{Cell, Table};

use crate::cli::resolve_document_path;
use crate::error::Result;
use crate::fmt::{category_title, money};
use crate::models::PurchaseRecord;
use crate::palette::color_for;
use crate::reports::{self, category_key, parse_timezone};
use crate::settings::load_settings;
use crate::store::load_document;

use super::report::swatch;

pub fn run(name: Option<&str>, file: Option<&str>) -> Result<()> {
    let path = resolve_document_path(file);
    let doc = load_document(&path)?;
    match name {
        Some(name) => print_category(&doc.items, name),
        None => {
            print_categories(&doc.items);
            Ok(())
        }
    }
}

fn print_categories(items: &[PurchaseRecord]) {
    let all: Vec<&PurchaseRecord> = items.iter().collect();
    let groups = reports::group_by(&all, category_key);
    if groups.is_empty() {
        println!("No spending data available");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["", "Category", "Amount"]);
    for group in &groups {
        table.add_row(vec![
            Cell::new(swatch(color_for(&group.key))),
            Cell::new(&group.key),
            Cell::new(money(group.total)),
        ]);
    }
    println!("Categories\n{table}");
}

fn print_category(items: &[PurchaseRecord], name: &str) -> Result<()> {
    let tz = parse_timezone(&load_settings().timezone)?;
    let matches = reports::category_items(items, name);
    let title = category_title(name);
    if matches.is_empty() {
        println!("{title}\nNo items found in this category");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Item", "Vendor", "Date", "Amount"]);
    for item in &matches {
        let date = item
            .uploaded_at
            .map(|ts| ts.with_timezone(&tz).format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&item.name),
            Cell::new(&item.vendor),
            Cell::new(date),
            Cell::new(money(item.price)),
        ]);
    }
    println!("{title}\n{table}");
    println!("Total Spent: {}", money(reports::total_of(&matches)));
    Ok(())
}
