//! Free-form component attributes.
//!
//! Attributes are echoed verbatim into `<TITLE>_attributes::` blocks, in
//! the order they were inserted. Nothing here validates a value.

use std::fmt;

use indexmap::IndexMap;

use super::kind::{RemapMethod, Verbosity};
use super::{INDENTATION, indent};

/// Ordered `key -> value` attribute bag.
pub type Attributes = IndexMap<String, AttributeValue>;

/// A scalar attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Verbosity(Verbosity),
    RemapMethod(RemapMethod),
}

impl AttributeValue {
    /// Render for `model_configure` style files, where booleans are
    /// Fortran logicals.
    pub fn to_fortran(&self) -> String {
        match self {
            Self::Boolean(value) => fortran_bool(*value).to_string(),
            other => other.to_string(),
        }
    }
}

/// `.true.` / `.false.`
pub fn fortran_bool(value: bool) -> &'static str {
    if value { ".true." } else { ".false." }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            // Debug keeps the decimal point on whole numbers (`1.0`, not `1`).
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Verbosity(value) => f.write_str(value.code()),
            Self::RemapMethod(value) => f.write_str(value.code()),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Verbosity> for AttributeValue {
    fn from(value: Verbosity) -> Self {
        Self::Verbosity(value)
    }
}

impl From<RemapMethod> for AttributeValue {
    fn from(value: RemapMethod) -> Self {
        Self::RemapMethod(value)
    }
}

/// Attributes with `Verbosity = off` inserted first when the caller gave none.
pub(crate) fn with_default_verbosity(attributes: Attributes) -> Attributes {
    if attributes.contains_key("Verbosity") {
        return attributes;
    }
    let mut defaulted = Attributes::with_capacity(attributes.len() + 1);
    defaulted.insert("Verbosity".to_string(), Verbosity::Off.into());
    defaulted.extend(attributes);
    defaulted
}

/// Render `<title>_attributes::`, one indented `key = value` per line, then `::`.
pub(crate) fn attribute_block(title: &str, attributes: &Attributes) -> String {
    let lines = attributes
        .iter()
        .map(|(key, value)| format!("{key} = {value}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{title}_attributes::\n{}\n::",
        indent(&lines, INDENTATION)
    )
}
