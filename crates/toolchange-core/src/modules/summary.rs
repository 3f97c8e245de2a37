use crate::common::markers::KEY_SETTINGS;
use crate::domain::{
    KeySettingStatus, RewriteReport, RunReport, ToolchangeError, ToolchangeResult,
};
use crate::modules::settings::{Settings, SettingsExtraction};

pub fn key_setting_statuses(settings: &Settings) -> Vec<KeySettingStatus> {
    KEY_SETTINGS
        .iter()
        .map(|&name| KeySettingStatus {
            name,
            value: settings.get(name).map(ToString::to_string),
        })
        .collect()
}

pub fn missing_key_settings(settings: &Settings) -> Vec<&'static str> {
    KEY_SETTINGS
        .iter()
        .copied()
        .filter(|name| !settings.contains_key(name))
        .collect()
}

pub fn render_settings_summary(extraction: &SettingsExtraction) -> String {
    let mut lines = vec![
        "=== Extracted Settings Summary ===".to_string(),
        format!("Total settings found: {}", extraction.settings.len()),
    ];
    for status in key_setting_statuses(&extraction.settings) {
        let value = status.value.as_deref().unwrap_or("NOT FOUND");
        lines.push(format!("{}: {}", status.name, value));
    }
    lines.push("==================================".to_string());

    let missing = missing_key_settings(&extraction.settings);
    if !missing.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Warning: Could not find the following required settings: {}",
            missing.join(", ")
        ));
    }
    lines.join("\n")
}

pub fn render_rewrite_summary(report: &RewriteReport) -> String {
    match report {
        RewriteReport::Copied {
            output_path,
            same_file,
        } => {
            let copy_line = if *same_file {
                format!(
                    "Output is the input file; left untouched: {}",
                    output_path.display()
                )
            } else {
                format!("File copied to: {}", output_path.display())
            };
            [
                "No ramming sections found in gcode file.".to_string(),
                "No modifications needed - copying input to output...".to_string(),
                copy_line,
                String::new(),
                "Processing skipped.".to_string(),
            ]
            .join("\n")
        }
        RewriteReport::Rewritten { output_path, stats } => [
            format!(
                "Found {} ramming section(s) to process",
                stats.ramming_starts_found
            ),
            format!("Found {} ramming end marker(s)", stats.ramming_end_markers),
            format!(
                "Successfully replaced {} ramming section(s)",
                stats.ramming_sections_replaced
            ),
            format!(
                "Inserted Z-down compensation after {} PAUSE command(s)",
                stats.pause_insertions
            ),
            format!(
                "Removed {} priming section(s) (CP TOOLCHANGE LOAD)",
                stats.priming_sections_removed
            ),
            format!("Output saved to: {}", output_path.display()),
            String::new(),
            "Processing complete.".to_string(),
        ]
        .join("\n"),
    }
}

pub fn render_json_report(report: &RunReport) -> ToolchangeResult<String> {
    serde_json::to_string_pretty(report).map_err(|source| {
        ToolchangeError::io_failure(
            "IO.REPORT_ENCODE",
            format!("failed to encode run report: {}", source),
        )
    })
}
