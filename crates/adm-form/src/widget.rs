//! Form widgets
//!
//! A [`Widget`] pairs a [`ValueKind`] with its validation constraints and
//! knows how to check, convert and render a submitted value. Widgets are
//! built once when an entity is registered and shared read-only by every
//! request afterwards.

use crate::value::{convert_str, parse_bool, ConversionError, FieldValue, ValueKind};
use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;
use std::fmt::{Display, Write as _};
use std::str::FromStr;
use uuid::Uuid;

/// Message for a missing required value
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Form widget, one variant per field kind
#[derive(Debug, Clone)]
pub enum Widget {
    /// Single-line text input
    Text(TextWidget),
    /// Whole-number input
    Integer(NumericWidget<i64>),
    /// Decimal input
    Float(NumericWidget<f64>),
    /// Checkbox
    Boolean(BooleanWidget),
    /// UUID input
    Identifier(IdentifierWidget),
    /// Free text input without constraints, for kinds with no string form
    Opaque(OpaqueWidget),
}

/// Text widget constraints
#[derive(Debug, Clone, Default)]
pub struct TextWidget {
    pub required: bool,
    pub placeholder: Option<String>,
    pub pattern: Option<Regex>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub initial: Option<String>,
}

/// Numeric widget constraints
#[derive(Debug, Clone, Default)]
pub struct NumericWidget<T> {
    pub required: bool,
    pub min: Option<T>,
    pub max: Option<T>,
    pub initial: Option<T>,
}

/// Boolean widget constraints
#[derive(Debug, Clone, Default)]
pub struct BooleanWidget {
    pub required: bool,
    pub initial: Option<bool>,
}

/// Identifier widget constraints
#[derive(Debug, Clone, Default)]
pub struct IdentifierWidget {
    pub required: bool,
    pub initial: Option<Uuid>,
}

/// Widget without constraints
#[derive(Debug, Clone, Default)]
pub struct OpaqueWidget;

impl Widget {
    /// Empty widget for a kind, no constraints set
    #[must_use]
    pub fn for_kind(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Text => Widget::Text(TextWidget::default()),
            ValueKind::Integer => Widget::Integer(NumericWidget::default()),
            ValueKind::Float => Widget::Float(NumericWidget::default()),
            ValueKind::Boolean => Widget::Boolean(BooleanWidget::default()),
            ValueKind::Identifier => Widget::Identifier(IdentifierWidget::default()),
            ValueKind::Opaque => Widget::Opaque(OpaqueWidget),
        }
    }

    /// Kind of value this widget produces
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Widget::Text(_) => ValueKind::Text,
            Widget::Integer(_) => ValueKind::Integer,
            Widget::Float(_) => ValueKind::Float,
            Widget::Boolean(_) => ValueKind::Boolean,
            Widget::Identifier(_) => ValueKind::Identifier,
            Widget::Opaque(_) => ValueKind::Opaque,
        }
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        match self {
            Widget::Text(w) => w.required,
            Widget::Integer(w) => w.required,
            Widget::Float(w) => w.required,
            Widget::Boolean(w) => w.required,
            Widget::Identifier(w) => w.required,
            Widget::Opaque(_) => false,
        }
    }

    /// Initial value, if one was registered
    #[must_use]
    pub fn initial(&self) -> Option<FieldValue> {
        match self {
            Widget::Text(w) => w.initial.clone().map(FieldValue::Text),
            Widget::Integer(w) => w.initial.map(FieldValue::Integer),
            Widget::Float(w) => w.initial.map(FieldValue::Float),
            Widget::Boolean(w) => w.initial.map(FieldValue::Boolean),
            Widget::Identifier(w) => w.initial.map(FieldValue::Identifier),
            Widget::Opaque(_) => None,
        }
    }

    /// Register the initial value shown in empty forms
    ///
    /// # Errors
    /// Returns [`ConversionError`] when `value` is not of the widget's kind.
    pub fn set_initial(&mut self, value: FieldValue) -> Result<(), ConversionError> {
        let kind = self.kind();
        match (self, value) {
            (Widget::Text(w), FieldValue::Text(v)) => w.initial = Some(v),
            (Widget::Integer(w), FieldValue::Integer(v)) => w.initial = Some(v),
            (Widget::Float(w), FieldValue::Float(v)) => w.initial = Some(v),
            (Widget::Float(w), FieldValue::Integer(v)) => w.initial = Some(v as f64),
            (Widget::Boolean(w), FieldValue::Boolean(v)) => w.initial = Some(v),
            (Widget::Identifier(w), FieldValue::Identifier(v)) => w.initial = Some(v),
            (_, other) => return Err(ConversionError::new(other.to_form_string(), kind)),
        }
        Ok(())
    }

    /// Check a submitted raw value, returning user-facing errors
    ///
    /// `None` means the field was absent from the submission and is treated
    /// like an empty value.
    #[must_use]
    pub fn validate(&self, raw: Option<&str>) -> Vec<String> {
        let raw = raw.unwrap_or("");
        match self {
            Widget::Text(w) => w.validate(raw),
            Widget::Integer(w) => w.validate(raw, "Enter a whole number."),
            Widget::Float(w) => w.validate(raw, "Enter a number."),
            Widget::Boolean(w) => w.validate(raw),
            Widget::Identifier(w) => w.validate(raw),
            Widget::Opaque(_) => Vec::new(),
        }
    }

    /// Convert a submitted raw value into its native form
    ///
    /// Empty input becomes [`FieldValue::Null`] for numeric, identifier and
    /// opaque widgets, `false` for checkboxes and `""` for text.
    ///
    /// # Errors
    /// Returns [`ConversionError`] when the value does not parse.
    pub fn clean(&self, raw: &str) -> Result<FieldValue, ConversionError> {
        let kind = self.kind();
        match self {
            Widget::Text(_) | Widget::Boolean(_) => convert_str(raw, kind),
            Widget::Opaque(_) if raw.is_empty() => Ok(FieldValue::Null),
            Widget::Opaque(_) => Ok(FieldValue::Text(raw.to_string())),
            _ if raw.trim().is_empty() => Ok(FieldValue::Null),
            _ => convert_str(raw, kind),
        }
    }

    /// Render the widget as an HTML `<input>`
    ///
    /// `value` overrides the initial value; `class` is added verbatim.
    #[must_use]
    pub fn render_html(&self, name: &str, value: Option<&str>, class: Option<&str>) -> String {
        let initial = self.initial().map(|v| v.to_form_string());
        let value = value.map(str::to_string).or(initial).unwrap_or_default();

        let mut attrs = InputAttrs::new(name, class);
        match self {
            Widget::Text(w) => {
                attrs.push("type", "text");
                attrs.push("value", &value);
                if let Some(p) = &w.placeholder {
                    attrs.push("placeholder", p);
                }
                if let Some(n) = w.min_length {
                    attrs.push("minlength", &n.to_string());
                }
                if let Some(n) = w.max_length {
                    attrs.push("maxlength", &n.to_string());
                }
                if let Some(re) = &w.pattern {
                    attrs.push("pattern", re.as_str());
                }
            }
            Widget::Integer(w) => {
                attrs.push("type", "number");
                attrs.push("value", &value);
                attrs.bounds(w.min, w.max);
            }
            Widget::Float(w) => {
                attrs.push("type", "number");
                attrs.push("step", "any");
                attrs.push("value", &value);
                attrs.bounds(w.min, w.max);
            }
            Widget::Boolean(_) => {
                attrs.push("type", "checkbox");
                attrs.push("value", "true");
                if parse_bool(&value).unwrap_or(false) {
                    attrs.flag("checked");
                }
            }
            Widget::Identifier(_) | Widget::Opaque(_) => {
                attrs.push("type", "text");
                attrs.push("value", &value);
            }
        }
        if self.is_required() {
            attrs.flag("required");
        }
        attrs.finish()
    }
}

impl TextWidget {
    fn validate(&self, raw: &str) -> Vec<String> {
        let mut errors = Vec::new();
        if raw.is_empty() {
            if self.required {
                errors.push(REQUIRED_MESSAGE.to_string());
            }
            return errors;
        }

        let len = raw.chars().count();
        if let Some(min) = self.min_length {
            if len < min {
                errors.push(format!(
                    "Ensure this value has at least {min} characters (it has {len})."
                ));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                errors.push(format!(
                    "Ensure this value has at most {max} characters (it has {len})."
                ));
            }
        }
        if let Some(re) = &self.pattern {
            if !re.is_match(raw) {
                errors.push(format!("Enter a value matching the pattern {}.", re.as_str()));
            }
        }
        errors
    }
}

/// Number types a [`NumericWidget`] accepts
pub trait NumericValue: FromStr + PartialOrd + Display + Copy {
    /// Whether a parsed value is usable; floats reject NaN and infinities
    fn is_usable(&self) -> bool {
        true
    }
}

impl NumericValue for i64 {}

impl NumericValue for f64 {
    fn is_usable(&self) -> bool {
        self.is_finite()
    }
}

impl<T: NumericValue> NumericWidget<T> {
    fn validate(&self, raw: &str, invalid_message: &str) -> Vec<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return if self.required {
                vec![REQUIRED_MESSAGE.to_string()]
            } else {
                Vec::new()
            };
        }

        let Some(value) = raw.parse::<T>().ok().filter(NumericValue::is_usable) else {
            return vec![invalid_message.to_string()];
        };

        let mut errors = Vec::new();
        if let Some(min) = self.min {
            if value < min {
                errors.push(format!("Ensure this value is greater than or equal to {min}."));
            }
        }
        if let Some(max) = self.max {
            if value > max {
                errors.push(format!("Ensure this value is less than or equal to {max}."));
            }
        }
        errors
    }
}

impl BooleanWidget {
    fn validate(&self, raw: &str) -> Vec<String> {
        match parse_bool(raw) {
            None => vec!["Enter a valid boolean.".to_string()],
            Some(false) if self.required => vec![REQUIRED_MESSAGE.to_string()],
            Some(_) => Vec::new(),
        }
    }
}

impl IdentifierWidget {
    fn validate(&self, raw: &str) -> Vec<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return if self.required {
                vec![REQUIRED_MESSAGE.to_string()]
            } else {
                Vec::new()
            };
        }
        if Uuid::parse_str(raw).is_err() {
            return vec!["Enter a valid UUID.".to_string()];
        }
        Vec::new()
    }
}

/// `<input>` attribute accumulator
struct InputAttrs {
    out: String,
}

impl InputAttrs {
    fn new(name: &str, class: Option<&str>) -> Self {
        let mut attrs = Self {
            out: String::from("<input"),
        };
        attrs.push("name", name);
        attrs.push("id", name);
        if let Some(class) = class {
            attrs.push("class", class);
        }
        attrs
    }

    fn push(&mut self, key: &str, value: &str) {
        let _ = write!(self.out, " {key}=\"{}\"", encode_double_quoted_attribute(value));
    }

    fn flag(&mut self, key: &str) {
        self.out.push(' ');
        self.out.push_str(key);
    }

    fn bounds<T: Display>(&mut self, min: Option<T>, max: Option<T>) {
        if let Some(min) = min {
            self.push("min", &min.to_string());
        }
        if let Some(max) = max {
            self.push("max", &max.to_string());
        }
    }

    fn finish(mut self) -> String {
        self.out.push('>');
        self.out
    }
}

/// Escape text for use between HTML tags
#[inline]
#[must_use]
pub fn escape_text(text: &str) -> String {
    encode_text(text).into_owned()
}
