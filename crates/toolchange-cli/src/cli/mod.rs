mod commands;
mod helpers;

use clap::Parser;
use std::ffi::OsString;
use toolchange_core::ToolchangeError;

pub fn run_from_env() -> i32 {
    match parse_and_dispatch(std::env::args_os()) {
        Ok(code) => code,
        Err(error) => {
            let toolchange_error = error.as_toolchange_error();
            eprintln!("{}", toolchange_error.diagnostic_line());
            toolchange_error.exit_code()
        }
    }
}

fn parse_and_dispatch<I, T>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => {
            helpers::init_logging(cli.run.verbose);
            commands::run_post_process(cli.run)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "toolchange-post",
    version,
    about = "Retrofit unload-and-pause filament changes into slicer gcode",
    after_help = "If OUTPUT is omitted, INPUT is overwritten in place."
)]
struct Cli {
    #[command(flatten)]
    run: commands::RunArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Toolchange(ToolchangeError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_toolchange_error(&self) -> ToolchangeError {
        match self {
            Self::Usage(message) => {
                ToolchangeError::input_validation("INPUT.CLI_USAGE", message.trim_end())
            }
            Self::Toolchange(error) => error.clone(),
            Self::Internal(error) => ToolchangeError::io_failure("IO.CLI", format!("{error:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CliError, parse_and_dispatch};
    use toolchange_core::ToolchangeErrorCategory;

    #[test]
    fn missing_input_argument_is_a_usage_error() {
        let error = parse_and_dispatch(["toolchange-post"]).expect_err("input is required");
        assert!(matches!(error, CliError::Usage(_)));
        let mapped = error.as_toolchange_error();
        assert_eq!(mapped.category(), ToolchangeErrorCategory::InputValidation);
        assert_eq!(mapped.exit_code(), 1);
    }

    #[test]
    fn help_exits_cleanly() {
        let code = parse_and_dispatch(["toolchange-post", "--help"]).expect("help should print");
        assert_eq!(code, 0);
    }

    #[test]
    fn zero_priming_lines_is_rejected() {
        let error = parse_and_dispatch(["toolchange-post", "in.gcode", "--priming-lines", "0"])
            .expect_err("priming block needs at least its marker line");
        assert!(matches!(error, CliError::Usage(_)));
    }

    #[test]
    fn internal_errors_map_to_io_failures() {
        let error = CliError::from(anyhow::anyhow!("report disk full"));
        let mapped = error.as_toolchange_error();
        assert_eq!(mapped.placeholder(), "IO.CLI");
        assert!(mapped.message().contains("report disk full"));
    }
}
