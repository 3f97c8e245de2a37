use crate::common::markers::{
    CHAMBER_TEMPERATURE, FIRST_LAYER_BED_TEMPERATURE, NOZZLE_TEMPERATURE, bed_temperature_lines,
    chamber_temperature_line, lift_compensation_lines, nozzle_temperature_line, nozzle_wait_line,
};
use crate::domain::{RewriteOptions, ToolchangeResult};
use crate::modules::settings::Settings;

/// Decides which PAUSE lines get a compensation block and what it holds.
///
/// `ramming_ends` are line indices of ramming-end markers in file order;
/// entry `j` is the `j`-th filament change, whose incoming material is
/// index `j + 1` in the per-material settings lists.
pub(super) struct CompensationPlan<'a> {
    settings: &'a Settings,
    options: &'a RewriteOptions,
    ramming_ends: &'a [usize],
}

impl<'a> CompensationPlan<'a> {
    pub(super) fn new(
        settings: &'a Settings,
        options: &'a RewriteOptions,
        ramming_ends: &'a [usize],
    ) -> Self {
        Self {
            settings,
            options,
            ramming_ends,
        }
    }

    /// First filament change whose window `(end, end + pause_window]` holds
    /// `line_index`. The last change never qualifies: no material follows it.
    pub(super) fn matching_change(&self, line_index: usize) -> Option<usize> {
        let (_, eligible) = self.ramming_ends.split_last()?;
        eligible.iter().position(|&end| {
            end < line_index && line_index <= end.saturating_add(self.options.pause_window)
        })
    }

    pub(super) fn compensation_lines(&self, change: usize) -> ToolchangeResult<Vec<String>> {
        let next_material = change + 1;
        let mut lines = lift_compensation_lines(self.options).to_vec();

        if let Some(celsius) = self.next_material_value(CHAMBER_TEMPERATURE, next_material)? {
            lines.push(chamber_temperature_line(celsius));
        }

        let nozzle = self.next_material_value(NOZZLE_TEMPERATURE, next_material)?;
        if let Some(celsius) = nozzle {
            lines.push(nozzle_temperature_line(celsius));
        }

        if let Some(bed) = self.settings.number(FIRST_LAYER_BED_TEMPERATURE)? {
            lines.extend(bed_temperature_lines(bed.truncate()));
        }

        if let Some(celsius) = nozzle {
            lines.push(nozzle_wait_line(celsius));
        }

        Ok(lines)
    }

    fn next_material_value(&self, key: &str, index: usize) -> ToolchangeResult<Option<i64>> {
        Ok(self
            .settings
            .number_list(key)?
            .and_then(|values| values.get(index))
            .map(|value| value.truncate()))
    }
}
