use crate::domain::{ToolchangeError, ToolchangeResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Truncates toward zero, the way temperatures are emitted into gcode.
    pub fn truncate(self) -> i64 {
        match self {
            Self::Int(value) => value,
            Self::Float(value) => value.trunc() as i64,
        }
    }

    /// Text that re-parses to the same variant: floats always carry a `.`.
    pub fn to_setting_text(self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Float(value) if value.is_infinite() => {
                // Overflows back to the same infinity when parsed as a float.
                if value.is_sign_negative() {
                    "-1.0e400".to_string()
                } else {
                    "1.0e400".to_string()
                }
            }
            Self::Float(value) => {
                let text = format!("{value:?}");
                if text.contains('.') {
                    text
                } else if let Some(exponent) = text.find('e') {
                    format!("{}.0{}", &text[..exponent], &text[exponent..])
                } else {
                    text
                }
            }
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
        }
    }
}

/// A setting value, typed once at parse time from its raw comment text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Number(Number),
    NumberList(Vec<Number>),
    StringList(Vec<String>),
    String(String),
}

impl SettingValue {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::NumberList(_) => "number list",
            Self::StringList(_) => "string list",
            Self::String(_) => "string",
        }
    }

    /// Inverse of the comment-value coercion.
    pub fn to_setting_text(&self) -> String {
        match self {
            Self::Number(number) => number.to_setting_text(),
            Self::NumberList(numbers) => numbers
                .iter()
                .map(|number| number.to_setting_text())
                .collect::<Vec<_>>()
                .join(","),
            Self::StringList(values) => values.join(","),
            Self::String(value) => value.clone(),
        }
    }
}

impl Display for SettingValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::NumberList(numbers) => {
                let items = numbers
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();
                write!(f, "[{}]", items.join(", "))
            }
            Self::StringList(values) => {
                let items = values
                    .iter()
                    .map(|value| format!("'{value}'"))
                    .collect::<Vec<_>>();
                write!(f, "[{}]", items.join(", "))
            }
            Self::String(value) => f.write_str(value),
        }
    }
}

/// Settings read from the slicer's config window. Lookups of absent keys
/// yield `None`; lookups of present keys with the wrong shape are errors.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Settings {
    values: BTreeMap<String, SettingValue>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later insertions of the same key replace earlier ones.
    pub fn insert(&mut self, key: impl Into<String>, value: SettingValue) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn number(&self, key: &str) -> ToolchangeResult<Option<Number>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(SettingValue::Number(number)) => Ok(Some(*number)),
            Some(other) => Err(shape_mismatch(key, "a single number", other)),
        }
    }

    pub fn number_list(&self, key: &str) -> ToolchangeResult<Option<&[Number]>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(SettingValue::NumberList(numbers)) => Ok(Some(numbers.as_slice())),
            Some(other) => Err(shape_mismatch(key, "a comma-separated number list", other)),
        }
    }
}

fn shape_mismatch(key: &str, expected: &str, found: &SettingValue) -> ToolchangeError {
    ToolchangeError::setting_type(
        "INPUT.SETTING_TYPE",
        format!(
            "setting '{}' must be {}, found {} '{}'",
            key,
            expected,
            found.kind(),
            found.to_setting_text()
        ),
    )
}
