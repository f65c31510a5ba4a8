use colored::Colorize;
use comfy_table::{Cell, Table};
use rust_decimal::Decimal;

use crate::cli::resolve_document_path;
use crate::error::Result;
use crate::fmt::money;
use crate::models::FriendBalance;
use crate::split::{clear_friend, total_owed};
use crate::store::{load_document, save_document};

pub fn run(file: Option<&str>, clear: Option<&str>) -> Result<()> {
    let path = resolve_document_path(file);
    let mut doc = load_document(&path)?;

    if let Some(name) = clear {
        clear_friend(&mut doc.friends, name)?;
        save_document(&path, &doc)?;
        println!("Cleared balance for {name}");
    }

    // Settled friends stay in the document but are not listed.
    let owing: Vec<FriendBalance> = doc
        .friends
        .into_iter()
        .filter(|f| f.amount > Decimal::ZERO)
        .collect();
    if owing.is_empty() {
        println!("No friends owe you anything yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Friend", "Owes"]);
    for friend in &owing {
        table.add_row(vec![Cell::new(&friend.name), Cell::new(money(friend.amount))]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money(total_owed(&owing)).bold()),
    ]);
    println!("Money Owed\n{table}");
    Ok(())
}
