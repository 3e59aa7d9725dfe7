//! Forms: ordered widgets plus cross-field validation
//!
//! [`values_are_valid`] runs every widget check and every registered
//! [`ValidationFn`]; [`clean_data`] turns raw submitted strings into native
//! values once validation has passed.

use crate::value::{ConversionError, FieldValue};
use crate::widget::Widget;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Raw submitted values, one string per field name
pub type FormValues = HashMap<String, String>;

/// Native values keyed by field name, in form order
pub type CleanData = IndexMap<String, FieldValue>;

/// Cross-field validation function
///
/// Returns user-facing errors (possibly none), or a fatal [`FormError`] that
/// aborts the whole validation pass.
pub type ValidationFn = Arc<dyn Fn(&FormValues) -> Result<Vec<String>, FormError> + Send + Sync>;

/// Wrap a closure as a [`ValidationFn`]
pub fn validation_fn<F>(f: F) -> ValidationFn
where
    F: Fn(&FormValues) -> Result<Vec<String>, FormError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Collapse multi-valued form data (`name -> [values]`) to the first value
#[must_use]
pub fn first_values(data: HashMap<String, Vec<String>>) -> FormValues {
    data.into_iter()
        .filter_map(|(k, mut v)| {
            if v.is_empty() {
                None
            } else {
                Some((k, v.swap_remove(0)))
            }
        })
        .collect()
}

/// Form errors that abort processing
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Two fields share a name
    #[error("form field '{0}' is already registered")]
    DuplicateField(String),

    /// Initial value given for a field the form does not have
    #[error("form has no field named '{0}'")]
    UnknownField(String),

    /// Submitted value did not convert to the field's kind
    #[error("field '{field}': {source}")]
    Conversion {
        field: String,
        #[source]
        source: ConversionError,
    },

    /// A validation function reported a fatal error
    #[error("validation aborted: {0}")]
    Aborted(String),
}

impl FormError {
    /// Create fatal validation error
    pub fn aborted(message: impl Into<String>) -> Self {
        Self::Aborted(message.into())
    }
}

/// Single form field
#[derive(Debug, Clone)]
pub struct FormField {
    /// Submitted parameter name
    pub name: String,
    /// Human label
    pub label: String,
    /// Shared widget
    pub widget: Arc<Widget>,
}

/// Form made of widgets in display order
#[derive(Clone, Default)]
pub struct Form {
    fields: Vec<FormField>,
    validators: Vec<ValidationFn>,
    initial: HashMap<String, String>,
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("fields", &self.fields)
            .field("validators", &self.validators.len())
            .field("initial", &self.initial)
            .finish()
    }
}

impl Form {
    /// Create empty form
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field
    ///
    /// # Errors
    /// [`FormError::DuplicateField`] if the name is taken.
    pub fn add_field(
        &mut self,
        name: impl Into<String>,
        label: impl Into<String>,
        widget: Arc<Widget>,
    ) -> Result<(), FormError> {
        let name = name.into();
        if self.fields.iter().any(|f| f.name == name) {
            return Err(FormError::DuplicateField(name));
        }
        self.fields.push(FormField {
            name,
            label: label.into(),
            widget,
        });
        Ok(())
    }

    /// Fields in display order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Look up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn register_validation_functions(&mut self, funcs: impl IntoIterator<Item = ValidationFn>) {
        self.validators.extend(funcs);
    }

    #[inline]
    #[must_use]
    pub fn validation_functions(&self) -> &[ValidationFn] {
        &self.validators
    }

    /// Pre-fill fields (edit forms)
    ///
    /// # Errors
    /// [`FormError::UnknownField`] for names the form does not contain.
    pub fn register_initial_values(&mut self, values: FormValues) -> Result<(), FormError> {
        for (name, value) in values {
            if self.field(&name).is_none() {
                return Err(FormError::UnknownField(name));
            }
            self.initial.insert(name, value);
        }
        Ok(())
    }

    /// Value to display when nothing was submitted
    ///
    /// Registered initial values win over the widget's own initial value.
    #[must_use]
    pub fn initial_value(&self, name: &str) -> Option<String> {
        if let Some(v) = self.initial.get(name) {
            return Some(v.clone());
        }
        self.field(name)
            .and_then(|f| f.widget.initial())
            .map(|v| v.to_form_string())
    }
}

/// Outcome of a validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Form-level errors from validation functions
    pub form_errors: Vec<String>,
    /// Per-field errors, in form order; empty vectors for valid fields
    pub field_errors: IndexMap<String, Vec<String>>,
}

impl ValidationReport {
    /// True when no errors were collected
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.values().all(Vec::is_empty)
    }

    /// Errors for one field
    #[must_use]
    pub fn errors_for(&self, field: &str) -> &[String] {
        self.field_errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// Total number of errors
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.form_errors.len() + self.field_errors.values().map(Vec::len).sum::<usize>()
    }
}

/// Validate submitted values against every widget and validation function
///
/// # Errors
/// Returns the first fatal error raised by a validation function.
pub fn values_are_valid(form: &Form, values: &FormValues) -> Result<ValidationReport, FormError> {
    let mut report = ValidationReport::default();

    for field in form.fields() {
        let raw = values.get(&field.name).map(String::as_str);
        let errors = field.widget.validate(raw);
        report.field_errors.insert(field.name.clone(), errors);
    }

    for func in form.validation_functions() {
        let errors = func(values)?;
        report.form_errors.extend(errors);
    }

    tracing::debug!(errors = report.error_count(), "validated form submission");
    Ok(report)
}

/// Convert submitted values into native values
///
/// Absent fields convert from the empty string.
///
/// # Errors
/// [`FormError::Conversion`] on the first value that fails to convert.
pub fn clean_data(form: &Form, values: &FormValues) -> Result<CleanData, FormError> {
    let mut clean = CleanData::with_capacity(form.fields().len());
    for field in form.fields() {
        let raw = values.get(&field.name).map_or("", String::as_str);
        let value = field.widget.clean(raw).map_err(|source| FormError::Conversion {
            field: field.name.clone(),
            source,
        })?;
        clean.insert(field.name.clone(), value);
    }
    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::value::ValueKind;
    use crate::widget::{NumericWidget, TextWidget};

    fn sample_form() -> Form {
        let mut form = Form::new();
        form.add_field(
            "Name",
            "Name",
            Arc::new(Widget::Text(TextWidget {
                required: true,
                ..TextWidget::default()
            })),
        )
        .unwrap();
        form.add_field(
            "Age",
            "Age",
            Arc::new(Widget::Integer(NumericWidget {
                min: Some(0),
                ..NumericWidget::default()
            })),
        )
        .unwrap();
        form
    }

    fn values(pairs: &[(&str, &str)]) -> FormValues {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn duplicate_field_rejected() {
        let mut form = sample_form();
        let err = form
            .add_field("Name", "Other", Arc::new(Widget::for_kind(ValueKind::Text)))
            .unwrap_err();
        assert!(matches!(err, FormError::DuplicateField(name) if name == "Name"));
    }

    #[test]
    fn collects_field_errors() {
        let report = values_are_valid(&sample_form(), &values(&[("Age", "-1")])).unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.errors_for("Name").len(), 1);
        assert_eq!(report.errors_for("Age").len(), 1);
        assert_eq!(report.error_count(), 2);
    }

    #[test]
    fn validation_functions_add_form_errors() {
        let mut form = sample_form();
        form.register_validation_functions([validation_fn(|v: &FormValues| {
            if v.get("Name").map(String::as_str) == Some("root") {
                Ok(vec!["reserved name".to_string()])
            } else {
                Ok(Vec::new())
            }
        })]);
        let report = values_are_valid(&form, &values(&[("Name", "root")])).unwrap();
        assert_eq!(report.form_errors, vec!["reserved name".to_string()]);
        assert!(!report.is_valid());
    }

    #[test]
    fn fatal_validation_aborts() {
        let mut form = sample_form();
        form.register_validation_functions([
            validation_fn(|_: &FormValues| Err(FormError::aborted("db down"))),
            validation_fn(|_: &FormValues| panic!("must not run")),
        ]);
        let err = values_are_valid(&form, &values(&[("Name", "x")])).unwrap_err();
        assert!(matches!(err, FormError::Aborted(_)));
    }

    #[test]
    fn clean_converts_values() {
        let clean = clean_data(&sample_form(), &values(&[("Name", "Ann"), ("Age", "31")])).unwrap();
        assert_eq!(clean["Name"], FieldValue::Text("Ann".into()));
        assert_eq!(clean["Age"], FieldValue::Integer(31));
        assert_eq!(clean.keys().collect::<Vec<_>>(), vec!["Name", "Age"]);
    }

    #[test]
    fn required_float_rejects_nan() {
        let mut form = Form::new();
        form.add_field(
            "Score",
            "Score",
            Arc::new(Widget::Float(NumericWidget {
                required: true,
                min: Some(0.0),
                ..NumericWidget::default()
            })),
        )
        .unwrap();
        let submitted = values(&[("Score", "NaN")]);
        let report = values_are_valid(&form, &submitted).unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.errors_for("Score").to_vec(), vec!["Enter a number.".to_string()]);
        assert!(clean_data(&form, &submitted).is_err());
    }

    #[test]
    fn clean_conversion_error_is_fatal() {
        let err = clean_data(&sample_form(), &values(&[("Age", "old")])).unwrap_err();
        assert!(matches!(err, FormError::Conversion { field, .. } if field == "Age"));
    }

    #[test]
    fn initial_values() {
        let mut form = sample_form();
        form.register_initial_values(values(&[("Age", "4")])).unwrap();
        assert_eq!(form.initial_value("Age").as_deref(), Some("4"));
        assert!(form.register_initial_values(values(&[("Nope", "1")])).is_err());
    }

    #[test]
    fn first_values_drops_empty() {
        let mut data = HashMap::new();
        data.insert("a".to_string(), vec!["1".to_string(), "2".to_string()]);
        data.insert("b".to_string(), Vec::new());
        let flat = first_values(data);
        assert_eq!(flat.get("a").map(String::as_str), Some("1"));
        assert!(!flat.contains_key("b"));
    }
}
