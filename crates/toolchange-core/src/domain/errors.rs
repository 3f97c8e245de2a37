use std::fmt::{Display, Formatter};

pub type ToolchangeResult<T> = Result<T, ToolchangeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolchangeErrorCategory {
    Success,
    InputValidation,
    FileNotFound,
    IoFailure,
    MissingMarker,
    SettingType,
}

impl ToolchangeErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InputValidation => "InputValidation",
            Self::FileNotFound => "FileNotFound",
            Self::IoFailure => "IoFailure",
            Self::MissingMarker => "MissingMarker",
            Self::SettingType => "SettingType",
        }
    }

    pub const fn exit_code(self) -> i32 {
        if self.is_fatal() { 1 } else { 0 }
    }

    /// Missing markers degrade extraction but never stop a run.
    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success | Self::MissingMarker)
    }
}

impl Display for ToolchangeErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{category} [{placeholder}] {message}")]
pub struct ToolchangeError {
    category: ToolchangeErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl ToolchangeError {
    pub fn new(
        category: ToolchangeErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ToolchangeErrorCategory::InputValidation, placeholder, message)
    }

    pub fn file_not_found(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ToolchangeErrorCategory::FileNotFound, placeholder, message)
    }

    pub fn io_failure(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ToolchangeErrorCategory::IoFailure, placeholder, message)
    }

    pub fn missing_marker(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ToolchangeErrorCategory::MissingMarker, placeholder, message)
    }

    pub fn setting_type(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ToolchangeErrorCategory::SettingType, placeholder, message)
    }

    /// Maps an I/O error onto `FileNotFound` or `IoFailure`; both are terminal
    /// for the operation that hit them, the split only changes the message.
    pub fn from_io(
        source: &std::io::Error,
        placeholder: &'static str,
        path: &std::path::Path,
    ) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::file_not_found(
                placeholder,
                format!("File '{}' not found.", path.display()),
            )
        } else {
            Self::io_failure(
                placeholder,
                format!("'{}': {}", path.display(), source),
            )
        }
    }

    pub const fn category(&self) -> ToolchangeErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "WARNING"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }
}
