//! Field value kinds and native values
//!
//! Provides [`ValueKind`], the closed set of field kinds a widget can be
//! built for, and [`FieldValue`], the native value a submitted form string
//! converts into. [`convert_str`] is the single conversion function used both
//! for `initial` directives at registration time and for submitted form data.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// Underlying value kind of an entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// UTF-8 string
    Text,
    /// Signed 64-bit integer
    Integer,
    /// 64-bit float
    Float,
    /// Boolean flag
    Boolean,
    /// UUID identifier
    Identifier,
    /// Anything else (relations, timestamps, blobs, ...)
    Opaque,
}

impl ValueKind {
    /// Stable lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
            ValueKind::Identifier => "identifier",
            ValueKind::Opaque => "opaque",
        }
    }

    /// Check if the kind is numeric
    #[inline]
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueKind::Integer | ValueKind::Float)
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native field value
///
/// Serializes untagged, so a `FieldValue::Integer(3)` becomes `3` in JSON
/// and `FieldValue::Null` becomes `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent value
    Null,
    /// Text value
    Text(String),
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// UUID value
    Identifier(Uuid),
}

impl FieldValue {
    /// Kind of the value, `None` for [`FieldValue::Null`]
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(_) => Some(ValueKind::Text),
            FieldValue::Integer(_) => Some(ValueKind::Integer),
            FieldValue::Float(_) => Some(ValueKind::Float),
            FieldValue::Boolean(_) => Some(ValueKind::Boolean),
            FieldValue::Identifier(_) => Some(ValueKind::Identifier),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// String form as it would appear in a submitted HTML form
    ///
    /// Feeding the result back through [`convert_str`] with the value's kind
    /// yields the same value.
    #[must_use]
    pub fn to_form_string(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Identifier(u) => u.hyphenated().to_string(),
        }
    }

    /// Convert into a JSON value
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Text(s) => serde_json::Value::String(s.clone()),
            FieldValue::Integer(i) => serde_json::Value::from(*i),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            FieldValue::Boolean(b) => serde_json::Value::Bool(*b),
            FieldValue::Identifier(u) => serde_json::Value::String(u.hyphenated().to_string()),
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_form_string())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Identifier(value)
    }
}

/// Failure converting a string into a native value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert '{value}' to {kind}")]
pub struct ConversionError {
    /// Offending raw value
    pub value: String,
    /// Target kind
    pub kind: ValueKind,
}

impl ConversionError {
    /// Create conversion error
    pub fn new(value: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }
}

/// Parse a boolean the way HTML checkboxes and query strings spell it
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

/// Convert a raw string into a native value of `kind`
///
/// # Errors
/// Returns [`ConversionError`] when the string does not parse as `kind`.
/// [`ValueKind::Opaque`] has no string form and always fails.
pub fn convert_str(raw: &str, kind: ValueKind) -> Result<FieldValue, ConversionError> {
    let fail = || ConversionError::new(raw, kind);
    match kind {
        ValueKind::Text => Ok(FieldValue::Text(raw.to_string())),
        ValueKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| fail()),
        ValueKind::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(FieldValue::Float)
            .ok_or_else(fail),
        ValueKind::Boolean => parse_bool(raw).map(FieldValue::Boolean).ok_or_else(fail),
        ValueKind::Identifier => Uuid::parse_str(raw.trim())
            .map(FieldValue::Identifier)
            .map_err(|_| fail()),
        ValueKind::Opaque => Err(fail()),
    }
}

/// Render a JSON scalar the way an HTML form would carry it
///
/// Used to pre-fill edit forms from stored records.
#[must_use]
pub fn json_to_form_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
