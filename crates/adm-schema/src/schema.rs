//! Compiled entity schema
//!
//! [`ModelSchema::compile`] is the pure half of entity registration: it
//! checks the descriptor, resolves names and builds every [`FieldConfig`].
//! The caller installs the result only when compilation succeeded, which
//! makes registration all-or-nothing.

use crate::descriptor::{AdminModel, FormMode};
use crate::error::RegistrationError;
use crate::field::FieldConfig;
use crate::humanize::{humanize, is_url_safe};
use adm_form::{Form, FormError, ValidationFn, ValueKind};
use std::fmt;

/// Names and field configs of one entity
#[derive(Clone)]
pub struct ModelSchema {
    pub name: String,
    pub display_name: String,
    pub type_name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldConfig>,
    /// Primary identifier field, if the entity declares one
    pub primary_key: Option<String>,
    pub validators: Vec<ValidationFn>,
}

impl fmt::Debug for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSchema")
            .field("name", &self.name)
            .field("display_name", &self.display_name)
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .field("primary_key", &self.primary_key)
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl ModelSchema {
    /// Build the schema of an entity
    ///
    /// # Errors
    /// - [`RegistrationError::InvalidEntityShape`] for unusable descriptors
    /// - [`RegistrationError::NotUrlSafe`] for names unusable in a path
    /// - [`RegistrationError::Field`] for the first field that fails to build
    pub fn compile<M: AdminModel + ?Sized>(model: &M) -> Result<Self, RegistrationError> {
        let descriptor = model.descriptor();
        descriptor.validate()?;

        let name = model.admin_name().unwrap_or_else(|| descriptor.type_name.clone());
        if !is_url_safe(&name) {
            return Err(RegistrationError::NotUrlSafe(name));
        }
        let display_name = model.admin_display_name().unwrap_or_else(|| humanize(&name));

        let primary_key = descriptor.primary_key().map(|f| f.name.clone());
        let fields = descriptor
            .fields
            .iter()
            .map(|field| {
                let is_primary = primary_key.as_deref() == Some(field.name.as_str());
                FieldConfig::build(field, is_primary, model).map_err(|source| RegistrationError::Field {
                    field: field.name.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(model = %name, fields = fields.len(), "compiled model schema");
        Ok(Self {
            name,
            display_name,
            type_name: descriptor.type_name,
            fields,
            primary_key,
            validators: model.validation_functions(),
        })
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Kind of the primary key field, if declared
    #[must_use]
    pub fn primary_key_kind(&self) -> Option<ValueKind> {
        self.primary_key
            .as_deref()
            .and_then(|name| self.field(name))
            .map(|f| f.kind)
    }

    /// Names of fields fetched for the list view
    #[must_use]
    pub fn list_fetch_fields(&self) -> Vec<String> {
        self.names_where(|f| f.include_in_list_fetch)
    }

    /// Names of fields matched by list search
    #[must_use]
    pub fn search_fields(&self) -> Vec<String> {
        self.names_where(|f| f.include_in_search)
    }

    /// Names of fields shown as list columns
    #[must_use]
    pub fn list_display_fields(&self) -> Vec<String> {
        self.names_where(|f| f.include_in_list_display)
    }

    /// Names of fields shown on the instance page
    #[must_use]
    pub fn view_fields(&self) -> Vec<String> {
        self.names_where(|f| f.include_in_instance_view)
    }

    fn names_where(&self, pred: impl Fn(&FieldConfig) -> bool) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| pred(f))
            .map(|f| f.name.clone())
            .collect()
    }

    /// Assemble the add or edit form
    ///
    /// Contains every field with a widget for `mode`, labelled with its
    /// display name, plus the entity's validation functions.
    ///
    /// # Errors
    /// [`FormError::DuplicateField`] cannot happen for a compiled schema but
    /// is propagated rather than hidden.
    pub fn form(&self, mode: FormMode) -> Result<Form, FormError> {
        let mut form = Form::new();
        for field in &self.fields {
            if let Some(widget) = field.widget(mode) {
                form.add_field(&field.name, &field.display_name, widget.clone())?;
            }
        }
        form.register_validation_functions(self.validators.iter().cloned());
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldDescriptor, ModelDescriptor};
    use crate::error::DirectiveError;
    use adm_form::{validation_fn, FormValues};

    struct Persona;

    impl AdminModel for Persona {
        fn descriptor(&self) -> ModelDescriptor {
            ModelDescriptor::new("Persona")
                .field(FieldDescriptor::new("ID", ValueKind::Integer).directives("listDisplay:exclude;addForm:exclude;editForm:exclude"))
                .field(FieldDescriptor::new("FirstName", ValueKind::Text).directives("required"))
                .field(FieldDescriptor::new("Bio", ValueKind::Text).directives("listDisplay:exclude;search:exclude"))
        }

        fn admin_display_name(&self) -> Option<String> {
            Some("People".into())
        }

        fn validation_functions(&self) -> Vec<adm_form::ValidationFn> {
            vec![validation_fn(|_: &FormValues| Ok(Vec::new()))]
        }
    }

    #[test]
    fn compiles_fields_in_order() {
        let schema = ModelSchema::compile(&Persona).unwrap();
        assert_eq!(schema.name, "Persona");
        assert_eq!(schema.display_name, "People");
        assert_eq!(schema.primary_key.as_deref(), Some("ID"));
        assert_eq!(schema.primary_key_kind(), Some(ValueKind::Integer));
        let names: Vec<_> = schema.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["ID", "FirstName", "Bio"]);
        assert_eq!(schema.field("FirstName").unwrap().display_name, "First Name");
    }

    #[test]
    fn capability_projections() {
        let schema = ModelSchema::compile(&Persona).unwrap();
        assert_eq!(schema.list_fetch_fields(), ["ID", "FirstName"]);
        assert_eq!(schema.list_display_fields(), ["FirstName"]);
        assert_eq!(schema.search_fields(), ["ID", "FirstName"]);
        assert_eq!(schema.view_fields(), ["ID", "FirstName", "Bio"]);
    }

    #[test]
    fn form_holds_widgets_and_validators() {
        let schema = ModelSchema::compile(&Persona).unwrap();
        let form = schema.form(FormMode::Add).unwrap();
        let names: Vec<_> = form.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["FirstName", "Bio"]);
        assert_eq!(form.fields()[0].label, "First Name");
        assert_eq!(form.validation_functions().len(), 1);
    }

    #[test]
    fn unsafe_name_rejected() {
        let descriptor = ModelDescriptor::new("Bad Name").field(FieldDescriptor::new("a", ValueKind::Text));
        assert_eq!(
            ModelSchema::compile(&descriptor).unwrap_err(),
            RegistrationError::NotUrlSafe("Bad Name".into())
        );
    }

    #[test]
    fn field_error_names_field() {
        let descriptor = ModelDescriptor::new("T")
            .field(FieldDescriptor::new("a", ValueKind::Text))
            .field(FieldDescriptor::new("b", ValueKind::Text).directives("view:sometimes"));
        let err = ModelSchema::compile(&descriptor).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::Field {
                field: "b".into(),
                source: DirectiveError::invalid("view", "sometimes"),
            }
        );
    }
}
