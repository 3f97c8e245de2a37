//! Marker literals recognised in slicer output and the gcode lines emitted
//! in their place.
//!
//! Every marker is matched by substring containment, never by whole-line
//! equality.

use crate::domain::RewriteOptions;

pub const EXECUTABLE_BLOCK_END: &str = "EXECUTABLE_BLOCK_END";
pub const CONFIG_BLOCK_END: &str = "CONFIG_BLOCK_END";

pub const RAMMING_START: &str = "; Ramming start";
pub const RAMMING_END: &str = "; Ramming end";
pub const COOLING_PARK: &str = "; Cooling park";
pub const PRIMING_LOAD: &str = "; CP TOOLCHANGE LOAD";
pub const PAUSE: &str = "PAUSE";

pub const UNLOAD_COMMAND: &str = "QUIT_MATERIAL";

pub const NOZZLE_TEMPERATURE: &str = "nozzle_temperature";
pub const CHAMBER_TEMPERATURE: &str = "chamber_temperature";
pub const FIRST_LAYER_BED_TEMPERATURE: &str = "first_layer_bed_temperature";

/// Settings the pause compensation reads, in console-summary order.
pub const KEY_SETTINGS: [&str; 3] = [
    NOZZLE_TEMPERATURE,
    CHAMBER_TEMPERATURE,
    FIRST_LAYER_BED_TEMPERATURE,
];

/// Block substituted for every ramming span, delimiters included.
pub fn unload_block(options: &RewriteOptions) -> String {
    [
        RAMMING_START.to_string(),
        "G91 ; Set positioning to relative (for Z-up lift)".to_string(),
        format!(
            "G1 Z{lift} F{feed} ; Move Z-axis up by {lift}mm (adjust Z and F as needed)",
            lift = options.lift_mm,
            feed = options.feedrate
        ),
        "G90 ; Set positioning back to absolute".to_string(),
        UNLOAD_COMMAND.to_string(),
        COOLING_PARK.to_string(),
    ]
    .join("\n")
}

/// Travel lines undoing the unload lift once the operator resumes.
pub fn lift_compensation_lines(options: &RewriteOptions) -> [String; 3] {
    [
        "G91 ; Set positioning to relative (for Z-down compensation)".to_string(),
        format!(
            "G1 Z-{lift} F{feed} ; Move Z-axis down by {lift}mm (adjust Z and F as needed)",
            lift = options.lift_mm,
            feed = options.feedrate
        ),
        "G90 ; Set positioning back to absolute".to_string(),
    ]
}

pub fn chamber_temperature_line(celsius: i64) -> String {
    format!("M141 S{celsius} ; set chamber temperature for the new material")
}

pub fn nozzle_temperature_line(celsius: i64) -> String {
    format!("M104 S{celsius} ; set temperature for the new material")
}

pub fn bed_temperature_lines(celsius: i64) -> [String; 2] {
    [
        format!("M140 S{celsius} ; set initial bed temperature"),
        format!("M190 S{celsius} ; wait for bed temperature"),
    ]
}

pub fn nozzle_wait_line(celsius: i64) -> String {
    format!("M109 S{celsius} ; wait for nozzle temperature")
}
