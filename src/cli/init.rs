use std::path::PathBuf;

use crate::error::Result;
use crate::models::UserDocument;
use crate::reports::{parse_timezone, TimeRange};
use crate::settings::{load_settings, save_settings, shellexpand_path};
use crate::store::save_document;

pub fn run(data_dir: Option<String>, tz: Option<String>, range: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(tz) = tz {
        settings.timezone = parse_timezone(&tz)?.name().to_string();
    }
    if let Some(range) = range {
        settings.default_range = range.parse::<TimeRange>()?.key().to_string();
    }

    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(resolved.join("exports"))?;

    let doc_path = resolved.join("user.json");
    if !doc_path.exists() {
        save_document(&doc_path, &UserDocument::default())?;
    }

    println!("Initialized ocrganise at {}", resolved.display());
    Ok(())
}
