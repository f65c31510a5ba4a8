pub mod category;
pub mod export;
pub mod init;
pub mod owed;
pub mod report;
pub mod split;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::{OcrError, Result};
use crate::models::{parse_timestamp, UserDocument};
use crate::reports::{parse_timezone, TimeRange};
use crate::settings::{document_path, load_settings};
use crate::store::load_document;

#[derive(Parser)]
#[command(
    name = "ocrganise",
    version,
    about = "Spending reports and friend balances for OCRganise receipts."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and create an empty user document.
    Init {
        /// Path for OCRganise data (default: ~/Documents/ocrganise)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Default time zone for day and month buckets, e.g. Europe/London
        #[arg(long)]
        tz: Option<String>,
        /// Default reporting window: week, month or year
        #[arg(long)]
        range: Option<String>,
    },
    /// Show spending totals, breakdowns and trends.
    Report {
        #[command(flatten)]
        window: WindowArgs,
        /// Which part of the report to print
        #[arg(long, value_enum, default_value_t = View::All)]
        view: View,
        /// Print the aggregate as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Export the spending series to CSV.
    Export {
        #[command(flatten)]
        window: WindowArgs,
        /// Output file (default: <data_dir>/exports/spending-<range>-<date>.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Browse spending by category, or list the items in one category.
    Category {
        /// Category to show (case-insensitive); omit to list all categories
        name: Option<String>,
        /// User document (default: <data_dir>/user.json)
        #[arg(long)]
        file: Option<String>,
    },
    /// Split a scanned receipt between you and your friends.
    Split {
        /// Receipt scan JSON returned by the OCR service
        receipt: String,
        /// Assign a line to a friend: ITEM=FRIEND (repeatable)
        #[arg(long = "assign")]
        assign: Vec<String>,
        /// Leave a scanned line out entirely: ITEM (repeatable)
        #[arg(long = "skip")]
        skip: Vec<String>,
        /// User document to update (default: <data_dir>/user.json)
        #[arg(long)]
        file: Option<String>,
        /// Purchase time for the saved items (RFC 3339, default: now)
        #[arg(long)]
        now: Option<String>,
        /// Show the split without saving it
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// List what friends owe you.
    Owed {
        /// User document (default: <data_dir>/user.json)
        #[arg(long)]
        file: Option<String>,
        /// Mark a friend as settled up
        #[arg(long)]
        clear: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum View {
    Overview,
    Trends,
    All,
}

#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Reporting window: week, month or year
    #[arg(long)]
    pub range: Option<String>,
    /// User document (.json or .csv, default: <data_dir>/user.json)
    #[arg(long)]
    pub file: Option<String>,
    /// Reference instant (RFC 3339, default: now)
    #[arg(long)]
    pub now: Option<String>,
    /// IANA time zone for day and month buckets (default from settings)
    #[arg(long)]
    pub tz: Option<String>,
}

/// Everything a report needs, with settings applied under the flags.
pub(crate) struct Window {
    pub range: TimeRange,
    pub now: DateTime<Utc>,
    pub tz: Tz,
    pub doc: UserDocument,
}

pub(crate) fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(raw) => parse_timestamp(raw).ok_or_else(|| OcrError::InvalidTimestamp(raw.to_string())),
        None => Ok(Utc::now()),
    }
}

pub(crate) fn resolve_document_path(file: Option<&str>) -> PathBuf {
    file.map(PathBuf::from).unwrap_or_else(document_path)
}

pub(crate) fn resolve_window(args: &WindowArgs) -> Result<Window> {
    let settings = load_settings();
    let range: TimeRange = args
        .range
        .as_deref()
        .unwrap_or(&settings.default_range)
        .parse()?;
    let tz = parse_timezone(args.tz.as_deref().unwrap_or(&settings.timezone))?;
    let now = parse_now(args.now.as_deref())?;
    let path = resolve_document_path(args.file.as_deref());
    tracing::debug!(%range, %now, %tz, path = %path.display(), "resolved report window");
    let doc = load_document(&path)?;
    Ok(Window { range, now, tz, doc })
}
