use super::model::{Number, SettingValue, Settings};
use crate::common::markers::{CONFIG_BLOCK_END, EXECUTABLE_BLOCK_END};
use crate::domain::ToolchangeError;
use std::ops::ControlFlow;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsExtraction {
    pub settings: Settings,
    pub start_marker_found: bool,
    pub end_marker_found: bool,
    /// Non-fatal `MissingMarker` diagnostics.
    pub warnings: Vec<ToolchangeError>,
}

/// Line-at-a-time state machine over the settings window.
#[derive(Debug, Default)]
pub(super) struct SettingsScanner {
    settings: Settings,
    in_window: bool,
    end_marker_found: bool,
}

impl SettingsScanner {
    /// Feeds one `\n`-delimited line, treating any lone `\r` inside it as a
    /// further line break.
    pub(super) fn feed_physical_line(&mut self, line: &str) -> ControlFlow<()> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        for segment in line.split('\r') {
            self.feed(segment)?;
        }
        ControlFlow::Continue(())
    }

    fn feed(&mut self, line: &str) -> ControlFlow<()> {
        if line.contains(EXECUTABLE_BLOCK_END) {
            self.in_window = true;
            return ControlFlow::Continue(());
        }

        if line.contains(CONFIG_BLOCK_END) {
            self.end_marker_found = true;
            return ControlFlow::Break(());
        }

        if !self.in_window || line.trim().is_empty() || !line.starts_with(';') {
            return ControlFlow::Continue(());
        }

        if let Some((key, value)) = parse_setting_line(line) {
            self.settings.insert(key, value);
        }
        ControlFlow::Continue(())
    }

    pub(super) fn finish(self) -> SettingsExtraction {
        let mut warnings = Vec::new();
        if !self.in_window {
            warnings.push(ToolchangeError::missing_marker(
                "MARKER.EXECUTABLE_BLOCK_END",
                format!("{EXECUTABLE_BLOCK_END} marker not found in file."),
            ));
        }
        if !self.end_marker_found {
            warnings.push(ToolchangeError::missing_marker(
                "MARKER.CONFIG_BLOCK_END",
                format!("{CONFIG_BLOCK_END} marker not found in file."),
            ));
        }
        for warning in &warnings {
            debug!("{}", warning.message());
        }

        SettingsExtraction {
            settings: self.settings,
            start_marker_found: self.in_window,
            end_marker_found: self.end_marker_found,
            warnings,
        }
    }
}

pub fn parse_settings(source: &str) -> SettingsExtraction {
    let mut scanner = SettingsScanner::default();
    for line in source.lines() {
        if scanner.feed_physical_line(line).is_break() {
            break;
        }
    }
    scanner.finish()
}

/// Parses `;<ws>identifier<ws>=<ws>value`. The value part must hold at least
/// one character before trimming; a lone `=` at end of line is no setting.
pub fn parse_setting_line(line: &str) -> Option<(&str, SettingValue)> {
    let rest = line.strip_prefix(';')?.trim_start();
    let key_len = identifier_len(rest)?;
    let (key, rest) = rest.split_at(key_len);
    let raw_value = rest.trim_start().strip_prefix('=')?;
    if raw_value.is_empty() {
        return None;
    }
    Some((key, coerce_value(raw_value.trim())))
}

fn identifier_len(text: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    let (_, first) = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    let len = chars
        .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '_'))
        .map_or(text.len(), |(index, _)| index);
    Some(len)
}

/// Types a trimmed raw value. A comma makes it a list; the list stays
/// numeric only when every piece parses, and one float piece makes every
/// element a float.
pub fn coerce_value(raw: &str) -> SettingValue {
    if raw.contains(',') {
        let pieces = raw.split(',').collect::<Vec<_>>();
        return match pieces
            .iter()
            .map(|piece| parse_number(piece))
            .collect::<Option<Vec<_>>>()
        {
            Some(numbers) => SettingValue::NumberList(widen_to_float(numbers)),
            None => SettingValue::StringList(
                pieces.iter().map(|piece| piece.trim().to_string()).collect(),
            ),
        };
    }

    match parse_number(raw) {
        Some(number) => SettingValue::Number(number),
        None => SettingValue::String(raw.to_string()),
    }
}

fn widen_to_float(numbers: Vec<Number>) -> Vec<Number> {
    if !numbers.iter().any(|number| matches!(number, Number::Float(_))) {
        return numbers;
    }
    numbers
        .into_iter()
        .map(|number| match number {
            Number::Int(value) => Number::Float(value as f64),
            float => float,
        })
        .collect()
}

fn parse_number(piece: &str) -> Option<Number> {
    let trimmed = piece.trim();
    if piece.contains('.') {
        trimmed.parse::<f64>().ok().map(Number::Float)
    } else {
        trimmed.parse::<i64>().ok().map(Number::Int)
    }
}
