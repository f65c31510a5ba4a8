use colored::{ColoredString, Colorize};
use comfy_table::{Cell, Table};
use rust_decimal::Decimal;

use crate::cli::{resolve_window, View, WindowArgs};
use crate::error::Result;
use crate::fmt::{bucket_label, money, percent, period_label, range_label};
use crate::palette::{color_for, vendor_color, Color};
use crate::reports::{self, AggregateResult};

pub(crate) fn swatch(color: Color) -> ColoredString {
    let (r, g, b) = color.rgb();
    "●".truecolor(r, g, b)
}

pub fn run(window: WindowArgs, view: View, json: bool) -> Result<()> {
    let w = resolve_window(&window)?;
    let result = reports::aggregate(&w.doc.items, w.range, w.now, w.tz);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if w.doc.items.is_empty() {
        println!("No spending data available");
        println!("Add expenses to see your spending reports.");
        return Ok(());
    }

    if matches!(view, View::Overview | View::All) {
        print_overview(&result);
    }
    if matches!(view, View::Trends | View::All) {
        if view == View::All {
            println!();
        }
        print_trends(&result);
    }
    Ok(())
}

fn print_overview(result: &AggregateResult) {
    let change = percent(result.percent_change);
    // Spending going up is bad news.
    let change = if result.percent_change >= Decimal::ZERO {
        change.red().bold()
    } else {
        change.green().bold()
    };
    let top_category = result.top_category.as_deref().unwrap_or("");

    let mut stats = Table::new();
    stats.set_header(vec!["", "Value", ""]);
    stats.add_row(vec![
        Cell::new("Total Spent".bold()),
        Cell::new(money(result.total_spent)),
        Cell::new(range_label(result.range)),
    ]);
    stats.add_row(vec![
        Cell::new("Daily Avg".bold()),
        Cell::new(money(result.average_per_day)),
        Cell::new("Per day"),
    ]);
    stats.add_row(vec![
        Cell::new("Top Category".bold()),
        Cell::new(format!("{} {top_category}", swatch(color_for(top_category)))),
        Cell::new("Highest spending"),
    ]);
    stats.add_row(vec![
        Cell::new("Change".bold()),
        Cell::new(change),
        Cell::new(period_label(result.range)),
    ]);
    println!("Spending Report\n{stats}");

    if result.category_totals.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["", "Category", "Amount", "%"]);
    for group in &result.category_totals {
        let share = reports::share_of(group.total, result.total_spent);
        table.add_row(vec![
            Cell::new(swatch(color_for(&group.key))),
            Cell::new(&group.key),
            Cell::new(money(group.total)),
            Cell::new(format!("{:.0}%", share.round())),
        ]);
    }
    println!("\nCategory Breakdown\n{table}");
}

fn print_trends(result: &AggregateResult) {
    let mut series = Table::new();
    series.set_header(vec!["Period", "Amount"]);
    for bucket in &result.bucketed_series {
        series.add_row(vec![
            Cell::new(bucket_label(&bucket.key)),
            Cell::new(money(bucket.total)),
        ]);
    }
    println!("Spending Trends\n{series}");

    if !result.vendor_totals.is_empty() {
        let mut vendors = Table::new();
        vendors.set_header(vec!["", "Vendor", "Amount"]);
        for group in &result.vendor_totals {
            vendors.add_row(vec![
                Cell::new(swatch(vendor_color(group.first_seen))),
                Cell::new(&group.key),
                Cell::new(money(group.total)),
            ]);
        }
        println!("\nSpending by Vendor\n{vendors}");
    }

    let breakdown = reports::daily_breakdown(&result.bucketed_series);
    if !breakdown.is_empty() {
        let mut daily = Table::new();
        daily.set_header(vec!["Date", "Amount"]);
        for bucket in breakdown {
            daily.add_row(vec![
                Cell::new(bucket_label(&bucket.key)),
                Cell::new(money(bucket.total).yellow().bold()),
            ]);
        }
        println!("\nDaily Breakdown\n{daily}");
    }
}
