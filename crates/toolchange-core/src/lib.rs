//! Post-processing of slicer gcode for printers that change filament by
//! unloading to the operator.
//!
//! The slicer's ramming sections are replaced with a lift-and-unload
//! sequence, its priming blocks are dropped, and every pause that follows an
//! intermediate filament change gets the lift undone and the next material's
//! temperatures set from the settings embedded in the file.

pub mod common;
pub mod domain;
pub mod modules;

pub use domain::{
    PostProcessRequest, RewriteOptions, RewriteReport, RewriteStats, RunReport, ToolchangeError,
    ToolchangeErrorCategory, ToolchangeResult,
};
pub use modules::{extract_settings, rewrite_file};
