use crate::common::markers::{CONFIG_BLOCK_END, EXECUTABLE_BLOCK_END};
use crate::domain::{ToolchangeError, ToolchangeResult};
use crate::modules::settings::Settings;
use std::fs::{self, FileTimes, OpenOptions};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Canonical `\n` line endings. Unlike a plain replace of `\r\n`, lone `\r`
/// separators are converted too.
pub fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// Renders settings as a config window that parses back to the same mapping.
pub fn serialize_settings(settings: &Settings) -> String {
    let mut text = format!("; {EXECUTABLE_BLOCK_END}\n; CONFIG_BLOCK_START\n");
    for (key, value) in settings.iter() {
        text.push_str(&format!("; {} = {}\n", key, value.to_setting_text()));
    }
    text.push_str(&format!("; {CONFIG_BLOCK_END}\n"));
    text
}

/// Writes `content` through a temp file in the target's directory and
/// renames it into place, so a failed write never truncates an existing
/// target. The result takes the permissions of `permissions_from`.
pub fn write_text_atomic(
    target: &Path,
    content: &str,
    permissions_from: &Path,
) -> ToolchangeResult<()> {
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_error = |source: std::io::Error| {
        ToolchangeError::io_failure(
            "IO.OUTPUT_WRITE",
            format!("failed to write '{}': {}", target.display(), source),
        )
    };

    let mut temp = NamedTempFile::new_in(parent).map_err(write_error)?;
    temp.write_all(content.as_bytes()).map_err(write_error)?;
    temp.flush().map_err(write_error)?;

    if let Ok(metadata) = fs::metadata(permissions_from) {
        fs::set_permissions(temp.path(), metadata.permissions()).map_err(write_error)?;
    }

    temp.persist(target)
        .map_err(|persist| write_error(persist.error))?;
    Ok(())
}

/// Byte copy that carries over permissions and access/modification times.
/// Returns `true` when both paths name the same file and nothing was copied.
pub fn copy_preserving_metadata(source: &Path, target: &Path) -> ToolchangeResult<bool> {
    if same_file(source, target) {
        return Ok(true);
    }

    let copy_error = |error: std::io::Error| {
        ToolchangeError::io_failure(
            "IO.OUTPUT_COPY",
            format!(
                "failed to copy '{}' to '{}': {}",
                source.display(),
                target.display(),
                error
            ),
        )
    };

    fs::copy(source, target).map_err(copy_error)?;

    let metadata = fs::metadata(source).map_err(copy_error)?;
    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    OpenOptions::new()
        .write(true)
        .open(target)
        .and_then(|file| file.set_times(times))
        .map_err(copy_error)?;

    Ok(false)
}

fn same_file(first: &Path, second: &Path) -> bool {
    match (fs::canonicalize(first), fs::canonicalize(second)) {
        (Ok(first), Ok(second)) => first == second,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        copy_preserving_metadata, normalize_line_endings, serialize_settings, write_text_atomic,
    };
    use crate::modules::settings::{Number, SettingValue, Settings, parse_settings};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn normalize_uses_canonical_line_endings() {
        assert_eq!(
            normalize_line_endings("alpha\r\nbeta\rgamma\n"),
            "alpha\nbeta\ngamma\n"
        );
        assert_eq!(normalize_line_endings("no newline"), "no newline");
    }

    #[test]
    fn serialized_settings_parse_back_to_the_same_mapping() {
        let mut settings = Settings::new();
        settings.insert(
            "nozzle_temperature",
            SettingValue::NumberList(vec![Number::Int(220), Number::Int(240)]),
        );
        settings.insert(
            "filament_diameter",
            SettingValue::NumberList(vec![Number::Float(1.75), Number::Float(1.0)]),
        );
        settings.insert("layer_height", SettingValue::Number(Number::Float(0.2)));
        settings.insert("tiny", SettingValue::Number(Number::Float(1e-7)));
        settings.insert("wall_loops", SettingValue::Number(Number::Int(3)));
        settings.insert(
            "filament_type",
            SettingValue::StringList(vec!["PLA".into(), "".into(), "PETG".into()]),
        );
        settings.insert("printer_model", SettingValue::String("Custom XL".into()));
        settings.insert("notes", SettingValue::String(String::new()));

        let text = serialize_settings(&settings);
        let reparsed = parse_settings(&text);
        assert!(reparsed.warnings.is_empty());
        assert_eq!(reparsed.settings, settings);
    }

    #[test]
    fn overflowing_floats_survive_reserialization() {
        let first = parse_settings(
            "; EXECUTABLE_BLOCK_END\n; huge = 1.0e400\n; spread = -2.5e999,1.5\n; CONFIG_BLOCK_END\n",
        );
        assert_eq!(
            first.settings.get("huge"),
            Some(&SettingValue::Number(Number::Float(f64::INFINITY)))
        );

        let second = parse_settings(&serialize_settings(&first.settings));
        assert_eq!(second.settings, first.settings);
    }

    #[test]
    fn atomic_write_replaces_content_and_keeps_source_permissions() {
        let temp = TempDir::new().expect("tempdir should be created");
        let source = temp.path().join("in.gcode");
        let target = temp.path().join("out.gcode");
        fs::write(&source, "old").expect("source should be written");
        fs::write(&target, "stale content that is longer").expect("target should be written");

        write_text_atomic(&target, "new\ntext", &source).expect("write should succeed");

        assert_eq!(fs::read_to_string(&target).expect("target readable"), "new\ntext");
        assert_eq!(
            fs::metadata(&target).expect("target metadata").permissions(),
            fs::metadata(&source).expect("source metadata").permissions()
        );
    }

    #[test]
    fn atomic_write_into_missing_directory_fails_cleanly() {
        let temp = TempDir::new().expect("tempdir should be created");
        let target = temp.path().join("missing").join("out.gcode");
        let error = write_text_atomic(&target, "x", &target).expect_err("write should fail");
        assert_eq!(error.placeholder(), "IO.OUTPUT_WRITE");
        assert!(!target.exists());
    }

    #[test]
    fn copy_is_byte_identical_and_keeps_modification_time() {
        let temp = TempDir::new().expect("tempdir should be created");
        let source = temp.path().join("in.gcode");
        let target = temp.path().join("out.gcode");
        fs::write(&source, b"G1 X1\r\nG1 Y2\r\n").expect("source should be written");

        let same = copy_preserving_metadata(&source, &target).expect("copy should succeed");

        assert!(!same);
        assert_eq!(fs::read(&target).expect("target readable"), b"G1 X1\r\nG1 Y2\r\n");
        assert_eq!(
            fs::metadata(&target).and_then(|meta| meta.modified()).ok(),
            fs::metadata(&source).and_then(|meta| meta.modified()).ok()
        );
    }

    #[test]
    fn copy_onto_itself_is_skipped() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("in.gcode");
        fs::write(&path, "G28\n").expect("source should be written");

        let same = copy_preserving_metadata(&path, &path).expect("copy should succeed");
        assert!(same);
        assert_eq!(fs::read_to_string(&path).expect("readable"), "G28\n");
    }
}
