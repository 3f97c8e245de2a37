use super::CliError;
use super::helpers::write_json_report;
use std::path::PathBuf;
use toolchange_core::modules::{
    key_setting_statuses, render_rewrite_summary, render_settings_summary,
};
use toolchange_core::{
    PostProcessRequest, RewriteOptions, RunReport, ToolchangeError, extract_settings, rewrite_file,
};

#[derive(clap::Args)]
pub(super) struct RunArgs {
    /// Input gcode file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output gcode file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Z lift in mm applied before unloading and undone after the pause
    #[arg(long, value_name = "MM", default_value_t = RewriteOptions::default().lift_mm)]
    lift: u32,

    /// Feedrate for the lift and its compensation
    #[arg(long, value_name = "F", default_value_t = RewriteOptions::default().feedrate)]
    feedrate: u32,

    /// Lines after a ramming end in which a PAUSE gets compensated
    #[arg(long, value_name = "LINES", default_value_t = RewriteOptions::default().pause_window)]
    pause_window: usize,

    /// Priming block length, marker line included
    #[arg(
        long,
        value_name = "N",
        default_value_t = RewriteOptions::default().priming_block_lines as u32,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    priming_lines: u32,

    /// Also write a JSON run report
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub(super) verbose: bool,
}

impl RunArgs {
    fn options(&self) -> RewriteOptions {
        RewriteOptions {
            lift_mm: self.lift,
            feedrate: self.feedrate,
            pause_window: self.pause_window,
            priming_block_lines: self.priming_lines as usize,
        }
    }
}

/// Extracts settings, then rewrites. Failures past the pre-flight check are
/// printed and end the run without an error exit.
pub(super) fn run_post_process(args: RunArgs) -> Result<i32, CliError> {
    if !args.input.exists() {
        return Err(CliError::Toolchange(ToolchangeError::file_not_found(
            "IO.INPUT_NOT_FOUND",
            format!("Input file '{}' not found.", args.input.display()),
        )));
    }

    let options = args.options();
    let request = PostProcessRequest::new(args.input, args.output).with_options(options);
    let mut report = RunReport {
        input_path: request.input_path.clone(),
        output_path: request.output_path.clone(),
        options,
        settings_count: 0,
        key_settings: Vec::new(),
        warnings: Vec::new(),
        rewrite: None,
        error: None,
    };

    println!("Reading settings from: {}", request.input_path.display());
    if request.is_in_place() {
        println!("Output will overwrite the input file.");
    } else {
        println!("Output file: {}", request.output_path.display());
    }
    let extraction = match extract_settings(&request.input_path) {
        Ok(extraction) => extraction,
        Err(error) => {
            println!("{}", error.diagnostic_line());
            println!("Failed to read gcode file.");
            report.error = Some(error.to_string());
            return finish(args.report, &report);
        }
    };

    for warning in &extraction.warnings {
        println!("{}", warning.diagnostic_line());
    }
    report.settings_count = extraction.settings.len();
    report.key_settings = key_setting_statuses(&extraction.settings);
    report.warnings = extraction
        .warnings
        .iter()
        .map(|warning| warning.message().to_string())
        .collect();

    println!();
    println!("{}", render_settings_summary(&extraction));
    println!();
    println!("Checking for ramming sections...");

    match rewrite_file(&request, &extraction.settings) {
        Ok(rewrite) => {
            println!("{}", render_rewrite_summary(&rewrite));
            report.rewrite = Some(rewrite);
        }
        Err(error) => {
            println!("Error processing gcode file: {}", error.diagnostic_line());
            report.error = Some(error.to_string());
        }
    }

    finish(args.report, &report)
}

fn finish(report_path: Option<PathBuf>, report: &RunReport) -> Result<i32, CliError> {
    if let Some(path) = report_path {
        write_json_report(&path, report)?;
        println!("JSON report: {}", path.display());
    }
    Ok(0)
}
