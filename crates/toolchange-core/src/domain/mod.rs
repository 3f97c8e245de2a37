pub mod errors;

pub use errors::{ToolchangeError, ToolchangeErrorCategory, ToolchangeResult};

use serde::Serialize;
use std::path::PathBuf;

/// Tunables for the emitted unload and compensation blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewriteOptions {
    pub lift_mm: u32,
    pub feedrate: u32,
    pub pause_window: usize,
    pub priming_block_lines: usize,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            lift_mm: 30,
            feedrate: 600,
            pause_window: 10,
            priming_block_lines: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostProcessRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub options: RewriteOptions,
}

impl PostProcessRequest {
    /// Without an explicit output the input file is rewritten in place.
    pub fn new(input_path: impl Into<PathBuf>, output_path: Option<PathBuf>) -> Self {
        let input_path = input_path.into();
        let output_path = output_path.unwrap_or_else(|| input_path.clone());
        Self {
            input_path,
            output_path,
            options: RewriteOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RewriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_in_place(&self) -> bool {
        self.input_path == self.output_path
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RewriteStats {
    pub ramming_starts_found: usize,
    pub ramming_sections_replaced: usize,
    pub ramming_end_markers: usize,
    pub pause_insertions: usize,
    pub priming_sections_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RewriteReport {
    /// No ramming sections: the input was copied through untouched.
    Copied {
        output_path: PathBuf,
        same_file: bool,
    },
    Rewritten {
        output_path: PathBuf,
        stats: RewriteStats,
    },
}

impl RewriteReport {
    pub fn stats(&self) -> Option<&RewriteStats> {
        match self {
            Self::Copied { .. } => None,
            Self::Rewritten { stats, .. } => Some(stats),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySettingStatus {
    pub name: &'static str,
    pub value: Option<String>,
}

/// Machine-readable record of one post-processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub options: RewriteOptions,
    pub settings_count: usize,
    pub key_settings: Vec<KeySettingStatus>,
    pub warnings: Vec<String>,
    pub rewrite: Option<RewriteReport>,
    pub error: Option<String>,
}
