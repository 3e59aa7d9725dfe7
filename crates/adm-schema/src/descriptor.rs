//! Entity descriptors
//!
//! Entities describe their fields through [`ModelDescriptor`] instead of
//! runtime reflection. Types implement [`AdminModel`] to hand a descriptor to
//! the registrar and optionally override naming, widgets and validation.
//!
//! ```rust
//! use adm_form::ValueKind;
//! use adm_schema::{AdminModel, FieldDescriptor, ModelDescriptor};
//!
//! struct Tag;
//!
//! impl AdminModel for Tag {
//!     fn descriptor(&self) -> ModelDescriptor {
//!         ModelDescriptor::new("Tag")
//!             .field(FieldDescriptor::new("ID", ValueKind::Integer).primary_key())
//!             .field(FieldDescriptor::new("Label", ValueKind::Text).directives("required"))
//!     }
//! }
//!
//! assert_eq!(Tag.descriptor().primary_key().map(|f| f.name.as_str()), Some("ID"));
//! ```

use crate::error::RegistrationError;
use adm_form::{ValidationFn, ValueKind, Widget};
use serde::Serialize;
use std::collections::HashSet;

/// One declared field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: ValueKind,
    /// Field may hold no value (nullable / pointer field)
    pub optional: bool,
    pub primary_key: bool,
    /// Raw directive string, `""` for defaults
    pub directives: String,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false,
            primary_key: false,
            directives: String::new(),
        }
    }

    /// Mark the field as nullable
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark the field as the primary identifier
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Attach a directive string
    #[must_use]
    pub fn directives(mut self, raw: impl Into<String>) -> Self {
        self.directives = raw.into();
        self
    }
}

/// Declared shape of an entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Type name, used as entity name when no naming hook is given
    pub type_name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Primary identifier field
    ///
    /// The field flagged [`FieldDescriptor::primary_key`], else a field named
    /// `id` in any letter case.
    #[must_use]
    pub fn primary_key(&self) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.primary_key)
            .or_else(|| self.fields.iter().find(|f| f.name.eq_ignore_ascii_case("id")))
    }

    /// Check the descriptor describes a usable entity
    ///
    /// # Errors
    /// [`RegistrationError::InvalidEntityShape`] when the type name is empty,
    /// there are no fields, a field name is empty or repeated, or more than
    /// one field is flagged as primary key.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        let shape = |reason: &str| RegistrationError::invalid_shape(&self.type_name, reason);

        if self.type_name.is_empty() {
            return Err(shape("type name is empty"));
        }
        if self.fields.is_empty() {
            return Err(shape("no fields declared"));
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(shape("field with empty name"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(shape(&format!("field '{}' declared twice", field.name)));
            }
        }
        if self.fields.iter().filter(|f| f.primary_key).count() > 1 {
            return Err(shape("more than one primary key"));
        }
        Ok(())
    }
}

/// Form a widget is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    Add,
    Edit,
}

/// Entity type exposed through the admin panel
pub trait AdminModel {
    /// Field declarations
    fn descriptor(&self) -> ModelDescriptor;

    /// URL name; defaults to the descriptor's type name
    fn admin_name(&self) -> Option<String> {
        None
    }

    /// Human name; defaults to the humanized entity name
    fn admin_display_name(&self) -> Option<String> {
        None
    }

    /// Hand-written widget replacing the directive-built one for `mode`
    fn form_widget(&self, _field: &str, _mode: FormMode) -> Option<Widget> {
        None
    }

    /// Cross-field validation run on add and edit submissions
    fn validation_functions(&self) -> Vec<ValidationFn> {
        Vec::new()
    }
}

impl AdminModel for ModelDescriptor {
    fn descriptor(&self) -> ModelDescriptor {
        self.clone()
    }
}
