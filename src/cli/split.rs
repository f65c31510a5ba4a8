use std::path::Path;

use comfy_table::{Cell, Table};

use crate::cli::{parse_now, resolve_document_path};
use crate::error::Result;
use crate::fmt::money;
use crate::models::ReceiptScan;
use crate::split::{self, Assignment};
use crate::store::{load_document, save_document};

pub fn run(
    receipt: &str,
    assign: &[String],
    skip: &[String],
    file: Option<&str>,
    now: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let scan: ReceiptScan = serde_json::from_str(&std::fs::read_to_string(Path::new(receipt))?)?;
    let assignments = assign
        .iter()
        .map(|a| a.parse::<Assignment>())
        .collect::<Result<Vec<_>>>()?;
    let uploaded_at = parse_now(now)?;
    let outcome = split::split_receipt(&scan, &assignments, skip, uploaded_at)?;

    let mut table = Table::new();
    table.set_header(vec!["Who", "Item", "Amount"]);
    for item in &outcome.own_items {
        table.add_row(vec![
            Cell::new(split::SELF_NAME),
            Cell::new(&item.name),
            Cell::new(money(item.price)),
        ]);
    }
    for friend in &outcome.friend_totals {
        table.add_row(vec![
            Cell::new(&friend.name),
            Cell::new("(owes you)"),
            Cell::new(money(friend.amount)),
        ]);
    }
    for name in &outcome.skipped {
        table.add_row(vec![Cell::new("-"), Cell::new(name), Cell::new("(skipped)")]);
    }
    println!("Receipt Split\n{table}");

    if dry_run {
        println!("Dry run: nothing saved.");
        return Ok(());
    }

    let path = resolve_document_path(file);
    let mut doc = load_document(&path)?;
    let added = outcome.own_items.len();
    doc.items.extend(outcome.own_items);
    split::merge_friends(&mut doc.friends, &outcome.friend_totals);
    save_document(&path, &doc)?;
    println!(
        "Saved {added} item(s) and {} friend balance(s) to {}",
        outcome.friend_totals.len(),
        path.display()
    );
    Ok(())
}
