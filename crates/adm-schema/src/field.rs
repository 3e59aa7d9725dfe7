//! Field-config building
//!
//! Turns one [`FieldDescriptor`] plus the entity's hooks into a
//! [`FieldConfig`]: inclusion flags, display name and the form widgets.
//! Widgets are built once here and shared read-only afterwards.

use crate::descriptor::{AdminModel, FieldDescriptor, FormMode};
use crate::directive::{Directives, Inclusion};
use crate::error::DirectiveError;
use adm_form::{
    convert_str, BooleanWidget, IdentifierWidget, NumericWidget, TextWidget, ValueKind, Widget,
};
use regex::Regex;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

/// Text placeholder
pub const PLACEHOLDER: &str = "placeholder";
/// Value must be present
pub const REQUIRED: &str = "required";
/// Text pattern
pub const REGEX: &str = "regex";
/// Minimum text length
pub const MIN_LENGTH: &str = "minLength";
/// Maximum text length
pub const MAX_LENGTH: &str = "maxLength";
/// Minimum numeric value
pub const MIN: &str = "min";
/// Maximum numeric value
pub const MAX: &str = "max";
/// Initial form value
pub const INITIAL: &str = "initial";

/// Resolved configuration of one entity field
#[derive(Debug, Clone, Serialize)]
pub struct FieldConfig {
    pub name: String,
    pub display_name: String,
    pub kind: ValueKind,
    pub optional: bool,
    pub primary_key: bool,
    pub include_in_list_display: bool,
    pub include_in_list_fetch: bool,
    pub include_in_search: bool,
    pub include_in_instance_view: bool,
    pub include_in_add_form: bool,
    pub include_in_edit_form: bool,
    #[serde(skip)]
    pub add_widget: Option<Arc<Widget>>,
    #[serde(skip)]
    pub edit_widget: Option<Arc<Widget>>,
}

impl FieldConfig {
    /// Widget used for `mode`, if the field takes part in that form
    #[must_use]
    pub fn widget(&self, mode: FormMode) -> Option<&Arc<Widget>> {
        match mode {
            FormMode::Add => self.add_widget.as_ref(),
            FormMode::Edit => self.edit_widget.as_ref(),
        }
    }

    /// Build the config for one declared field
    ///
    /// # Errors
    /// Fails on an invalid inclusion directive or an `initial` value that
    /// does not convert to the field's kind.
    pub fn build<M: AdminModel + ?Sized>(
        field: &FieldDescriptor,
        is_primary_key: bool,
        model: &M,
    ) -> Result<Self, DirectiveError> {
        let directives = Directives::parse(&field.directives);
        let inclusion = Inclusion::resolve(&directives, &field.name, is_primary_key)?;

        let shared = if inclusion.in_any_form() {
            let mut widget = build_widget(field.kind, &directives);
            apply_initial(&mut widget, &directives, field.kind)?;
            Some(Arc::new(widget))
        } else {
            None
        };

        let mut add_widget = shared.clone().filter(|_| inclusion.add_form);
        let mut edit_widget = shared.filter(|_| inclusion.edit_form);
        if let Some(widget) = model.form_widget(&field.name, FormMode::Add) {
            add_widget = Some(Arc::new(widget));
        }
        if let Some(widget) = model.form_widget(&field.name, FormMode::Edit) {
            edit_widget = Some(Arc::new(widget));
        }

        Ok(Self {
            name: field.name.clone(),
            display_name: inclusion.display_name,
            kind: field.kind,
            optional: field.optional,
            primary_key: is_primary_key,
            include_in_list_display: inclusion.list_display,
            include_in_list_fetch: inclusion.list_fetch,
            include_in_search: inclusion.search,
            include_in_instance_view: inclusion.view,
            include_in_add_form: inclusion.add_form,
            include_in_edit_form: inclusion.edit_form,
            add_widget,
            edit_widget,
        })
    }
}

/// Build the directive-driven widget for a field kind
///
/// Constraint values that do not parse are skipped with a warning; they
/// never fail registration.
#[must_use]
pub fn build_widget(kind: ValueKind, directives: &Directives) -> Widget {
    let required = directives.has(REQUIRED);
    match kind {
        ValueKind::Text => Widget::Text(TextWidget {
            required,
            placeholder: directives.get(PLACEHOLDER).map(str::to_string),
            pattern: directives.get(REGEX).and_then(|raw| match Regex::new(raw) {
                Ok(re) => Some(re),
                Err(err) => {
                    tracing::warn!(pattern = raw, error = %err, "ignoring invalid regex directive");
                    None
                }
            }),
            min_length: constraint(directives, MIN_LENGTH),
            max_length: constraint(directives, MAX_LENGTH),
            initial: None,
        }),
        ValueKind::Integer => Widget::Integer(NumericWidget {
            required,
            min: constraint(directives, MIN),
            max: constraint(directives, MAX),
            initial: None,
        }),
        ValueKind::Float => Widget::Float(NumericWidget {
            required,
            min: constraint(directives, MIN),
            max: constraint(directives, MAX),
            initial: None,
        }),
        ValueKind::Boolean => Widget::Boolean(BooleanWidget {
            required,
            initial: None,
        }),
        ValueKind::Identifier => Widget::Identifier(IdentifierWidget {
            required,
            initial: None,
        }),
        ValueKind::Opaque => Widget::for_kind(ValueKind::Opaque),
    }
}

fn constraint<T: FromStr>(directives: &Directives, key: &str) -> Option<T> {
    let raw = directives.get(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(directive = key, value = raw, "ignoring unparsable constraint");
            None
        }
    }
}

/// Convert and install the `initial` directive, if any
///
/// # Errors
/// [`DirectiveError::TypeConversion`] when the value does not convert.
pub fn apply_initial(
    widget: &mut Widget,
    directives: &Directives,
    kind: ValueKind,
) -> Result<(), DirectiveError> {
    let Some(raw) = directives.get(INITIAL) else {
        return Ok(());
    };
    let conversion = || DirectiveError::TypeConversion {
        value: raw.to_string(),
        kind,
    };
    let value = convert_str(raw, kind).map_err(|_| conversion())?;
    widget.set_initial(value).map_err(|_| conversion())
}
