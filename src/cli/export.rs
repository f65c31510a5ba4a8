use std::path::PathBuf;

use crate::cli::{resolve_window, WindowArgs};
use crate::error::Result;
use crate::reports::{self, TimeRange};
use crate::settings::get_data_dir;
use crate::store::write_series_csv;

fn default_path(range: TimeRange) -> PathBuf {
    let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
    get_data_dir()
        .join("exports")
        .join(format!("spending-{range}-{date}.csv"))
}

pub fn run(window: WindowArgs, output: Option<String>) -> Result<()> {
    let w = resolve_window(&window)?;
    let result = reports::aggregate(&w.doc.items, w.range, w.now, w.tz);
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(w.range));
    write_series_csv(&path, &result.bucketed_series)?;
    println!("Wrote {}", path.display());
    Ok(())
}
