//! Section rewriting: ramming spans become an unload sequence, priming
//! blocks are dropped, and pauses after a filament change get the lift undone
//! and the next material's temperatures set.

mod compensation;
mod ramming;

use crate::common::markers::{PAUSE, PRIMING_LOAD, RAMMING_END, unload_block};
use crate::domain::{
    PostProcessRequest, RewriteOptions, RewriteReport, RewriteStats, ToolchangeError,
    ToolchangeResult,
};
use crate::modules::serialization::{
    copy_preserving_metadata, normalize_line_endings, write_text_atomic,
};
use crate::modules::settings::Settings;
use compensation::CompensationPlan;
use ramming::{count_ramming_start_lines, replace_ramming_sections};
use std::borrow::Cow;
use std::fs;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// No ramming sections; the source needs no changes.
    Unchanged,
    Rewritten { text: String, stats: RewriteStats },
}

/// Rewrites gcode text whose line endings are already `\n`. `settings` is
/// only consulted when a pause compensation is emitted.
pub fn rewrite_source(
    source: &str,
    settings: &Settings,
    options: &RewriteOptions,
) -> ToolchangeResult<RewriteOutcome> {
    let ramming_starts_found = count_ramming_start_lines(source);
    if ramming_starts_found == 0 {
        return Ok(RewriteOutcome::Unchanged);
    }

    let replacement = replace_ramming_sections(source, &unload_block(options));
    let lines = replacement.text.split('\n').collect::<Vec<_>>();
    let ramming_ends = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.contains(RAMMING_END))
        .map(|(index, _)| index)
        .collect::<Vec<_>>();
    debug!("ramming end markers at lines {:?}", ramming_ends);

    let plan = CompensationPlan::new(settings, options, &ramming_ends);
    let mut output: Vec<Cow<'_, str>> = Vec::with_capacity(lines.len());
    let mut pause_insertions = 0;
    let mut priming_sections_removed = 0;
    let mut skip_remaining = 0usize;

    for (index, line) in lines.iter().copied().enumerate() {
        if skip_remaining > 0 {
            skip_remaining -= 1;
            continue;
        }

        if line.contains(PRIMING_LOAD) {
            skip_remaining = options.priming_block_lines.saturating_sub(1);
            priming_sections_removed += 1;
            debug!("removing priming block at line {}", index);
            continue;
        }

        output.push(Cow::Borrowed(line));

        if line.contains(PAUSE)
            && let Some(change) = plan.matching_change(index)
        {
            let compensation = plan.compensation_lines(change)?;
            debug!(
                "inserting {} compensation lines after pause at line {} (change {})",
                compensation.len(),
                index,
                change
            );
            output.extend(compensation.into_iter().map(Cow::Owned));
            pause_insertions += 1;
        }
    }

    Ok(RewriteOutcome::Rewritten {
        text: output.join("\n"),
        stats: RewriteStats {
            ramming_starts_found,
            ramming_sections_replaced: replacement.replaced,
            ramming_end_markers: ramming_ends.len(),
            pause_insertions,
            priming_sections_removed,
        },
    })
}

/// Reads the request's input a second time, independent of settings
/// extraction, and writes the result to its output path.
pub fn rewrite_file(
    request: &PostProcessRequest,
    settings: &Settings,
) -> ToolchangeResult<RewriteReport> {
    let input = &request.input_path;
    let output_path = request.output_path.clone();

    let source = fs::read_to_string(input)
        .map_err(|source| ToolchangeError::from_io(&source, "IO.REWRITE_READ", input))?;
    let source = normalize_line_endings(&source);

    match rewrite_source(&source, settings, &request.options)? {
        RewriteOutcome::Unchanged => {
            let same_file = copy_preserving_metadata(input, &output_path)?;
            info!(
                "no ramming sections; copied {} to {}",
                input.display(),
                output_path.display()
            );
            Ok(RewriteReport::Copied {
                output_path,
                same_file,
            })
        }
        RewriteOutcome::Rewritten { text, stats } => {
            write_text_atomic(&output_path, &text, input)?;
            info!("wrote rewritten gcode to {}", output_path.display());
            Ok(RewriteReport::Rewritten { output_path, stats })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RewriteOutcome, rewrite_source};
    use crate::domain::RewriteOptions;
    use crate::modules::settings::{Number, SettingValue, Settings};

    fn rewritten(source: &str, settings: &Settings) -> (String, crate::domain::RewriteStats) {
        match rewrite_source(source, settings, &RewriteOptions::default())
            .expect("rewrite should succeed")
        {
            RewriteOutcome::Rewritten { text, stats } => (text, stats),
            RewriteOutcome::Unchanged => panic!("expected a rewrite"),
        }
    }

    #[test]
    fn source_without_ramming_is_unchanged() {
        let outcome = rewrite_source(
            "G1 X1\n; CP TOOLCHANGE LOAD\nPAUSE\n",
            &Settings::new(),
            &RewriteOptions::default(),
        )
        .expect("rewrite should succeed");
        assert_eq!(outcome, RewriteOutcome::Unchanged);
    }

    #[test]
    fn priming_block_drops_marker_and_next_five_lines() {
        let source = "\
; Ramming start
; Cooling park
keep-1
; CP TOOLCHANGE LOAD
drop-1
; CP TOOLCHANGE LOAD
PAUSE
drop-4
drop-5
keep-2
";
        let (text, stats) = rewritten(source, &Settings::new());
        assert!(text.ends_with("; Cooling park\nkeep-1\nkeep-2\n"));
        assert!(!text.contains("drop-"));
        assert!(!text.contains("CP TOOLCHANGE LOAD"));
        assert_eq!(stats.priming_sections_removed, 1);
        assert_eq!(stats.pause_insertions, 0);
    }

    #[test]
    fn pause_after_intermediate_change_gets_compensation() {
        let mut settings = Settings::new();
        settings.insert(
            "nozzle_temperature",
            SettingValue::NumberList(vec![Number::Int(200), Number::Int(210)]),
        );
        let source = "\
; Ramming start
G1 E-10
; Cooling park
; Ramming end
M400
PAUSE
G1 X5
; Ramming start
G1 E-10
; Cooling park
; Ramming end
PAUSE
";
        let (text, stats) = rewritten(source, &settings);
        let lines = text.split('\n').collect::<Vec<_>>();
        let first_pause = lines
            .iter()
            .position(|line| *line == "PAUSE")
            .expect("pause should survive");
        assert_eq!(
            lines[first_pause + 1],
            "G91 ; Set positioning to relative (for Z-down compensation)"
        );
        assert_eq!(
            lines[first_pause + 4],
            "M104 S210 ; set temperature for the new material"
        );
        assert_eq!(lines[first_pause + 5], "M109 S210 ; wait for nozzle temperature");
        assert_eq!(lines[first_pause + 6], "G1 X5");
        assert_eq!(*lines.last().expect("trailing empty line"), "");
        assert_eq!(lines[lines.len() - 2], "PAUSE");
        assert_eq!(stats.pause_insertions, 1);
        assert_eq!(stats.ramming_end_markers, 2);
        assert_eq!(stats.ramming_sections_replaced, 2);
        assert!(!text.contains("G1 E-10"));
    }

    #[test]
    fn pause_outside_every_window_is_left_alone() {
        let mut source = String::from("; Ramming start\n; Cooling park\n; Ramming end\n");
        for _ in 0..10 {
            source.push_str("G1 X1\n");
        }
        source.push_str("PAUSE\n; Ramming start\n; Cooling park\n; Ramming end\n");

        let (text, stats) = rewritten(&source, &Settings::new());
        assert_eq!(stats.pause_insertions, 0);
        assert!(!text.contains("Z-down"));
    }

    #[test]
    fn compensation_uses_pre_deletion_line_indices() {
        let source = "\
; Ramming start
; Cooling park
; Ramming end
; CP TOOLCHANGE LOAD
a
b
c
d
e
f
g
h
i
PAUSE
; Ramming start
; Cooling park
; Ramming end
";
        let (text, stats) = rewritten(source, &Settings::new());
        assert_eq!(stats.pause_insertions, 0, "pause sits 11 lines after the marker");
        assert!(text.contains("h\ni\nPAUSE\n"));
    }

    #[test]
    fn type_errors_abort_the_rewrite() {
        let mut settings = Settings::new();
        settings.insert(
            "first_layer_bed_temperature",
            SettingValue::StringList(vec!["60".into(), "hot".into()]),
        );
        let source = "; Ramming start\n; Cooling park\n; Ramming end\nPAUSE\n; Ramming start\n; Cooling park\n; Ramming end\n";
        let error = rewrite_source(source, &settings, &RewriteOptions::default())
            .expect_err("string list bed temperature should be rejected");
        assert_eq!(error.placeholder(), "INPUT.SETTING_TYPE");
    }
}
