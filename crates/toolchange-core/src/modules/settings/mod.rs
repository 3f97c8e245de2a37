//! Settings extraction from the config window a slicer appends to its gcode.
//!
//! The window opens after the line containing `EXECUTABLE_BLOCK_END` and
//! closes at the first line containing `CONFIG_BLOCK_END`. Inside it, lines
//! of the form `; key = value` become typed [`SettingValue`]s.

mod model;
mod parser;

pub use model::{Number, SettingValue, Settings};
pub use parser::{SettingsExtraction, coerce_value, parse_setting_line, parse_settings};

use crate::domain::{ToolchangeError, ToolchangeResult};
use parser::SettingsScanner;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Streams `path` until the window closes. Missing markers are reported in
/// [`SettingsExtraction::warnings`]; only an unreadable file is an error.
pub fn extract_settings(path: &Path) -> ToolchangeResult<SettingsExtraction> {
    let file = File::open(path)
        .map_err(|source| ToolchangeError::from_io(&source, "IO.SETTINGS_OPEN", path))?;

    let mut scanner = SettingsScanner::default();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| {
            ToolchangeError::io_failure(
                "IO.SETTINGS_READ",
                format!("Error reading file '{}': {}", path.display(), source),
            )
        })?;
        if scanner.feed_physical_line(&line).is_break() {
            break;
        }
    }

    let extraction = scanner.finish();
    debug!(
        "extracted {} settings from {}",
        extraction.settings.len(),
        path.display()
    );
    Ok(extraction)
}
