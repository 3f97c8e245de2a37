use anyhow::Context;
use std::fs;
use std::path::Path;
use toolchange_core::RunReport;
use toolchange_core::modules::render_json_report;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so the stdout summary stays clean. `--verbose` wins
/// over `RUST_LOG`; otherwise `RUST_LOG` wins over the `warn` default.
pub(super) fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    // A subscriber set earlier in the process (tests, embedding) stays active.
    if let Err(error) = installed {
        debug!("keeping existing tracing subscriber: {}", error);
    }
}

pub(super) fn write_json_report(path: &Path, report: &RunReport) -> anyhow::Result<()> {
    let json = render_json_report(report)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create report directory '{}'", parent.display())
        })?;
    }
    fs::write(path, json)
        .with_context(|| format!("failed to write run report '{}'", path.display()))?;

    debug!("wrote run report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{init_logging, write_json_report};
    use serde_json::Value;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use toolchange_core::{RewriteOptions, RunReport};

    fn empty_report() -> RunReport {
        RunReport {
            input_path: PathBuf::from("in.gcode"),
            output_path: PathBuf::from("out.gcode"),
            options: RewriteOptions::default(),
            settings_count: 2,
            key_settings: Vec::new(),
            warnings: vec!["CONFIG_BLOCK_END marker not found in file.".to_string()],
            rewrite: None,
            error: Some("IoFailure [IO.REWRITE_READ] boom".to_string()),
        }
    }

    #[test]
    fn logging_can_be_initialised_more_than_once() {
        init_logging(false);
        init_logging(true);
        tracing::debug!("still logging after a second init");
    }

    #[test]
    fn report_is_written_into_nested_directories() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("reports/run/report.json");

        write_json_report(&path, &empty_report()).expect("report should be written");

        let parsed: Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("report readable"))
                .expect("report should be json");
        assert_eq!(parsed["settings_count"], 2);
        assert_eq!(parsed["rewrite"], Value::Null);
        assert_eq!(parsed["error"], "IoFailure [IO.REWRITE_READ] boom");
    }

    #[test]
    fn unwritable_report_path_carries_context() {
        let temp = TempDir::new().expect("tempdir should be created");
        let blocker = temp.path().join("file");
        fs::write(&blocker, "x").expect("blocker should be written");

        let error = write_json_report(&blocker.join("report.json"), &empty_report())
            .expect_err("a file cannot be a directory");
        assert!(format!("{error:#}").contains("report directory"));
    }
}
