//! Error types for schema building
//!
//! Both enums are fatal at registration time: an entity that fails to build
//! is never installed.

use adm_form::ValueKind;

/// Errors while interpreting a field's directive string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    /// Inclusion key given something other than `include`/`exclude`
    #[error("invalid value for '{key}' directive: '{value}'")]
    InvalidDirective { key: String, value: String },

    /// `initial` value does not convert to the field's kind
    #[error("error converting value '{value}' to type '{kind}'")]
    TypeConversion { value: String, kind: ValueKind },
}

impl DirectiveError {
    /// Create invalid directive error
    pub fn invalid(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidDirective {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Errors while registering an entity or an app
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// Descriptor is not a usable struct-like shape
    #[error("admin model '{name}' has an invalid shape: {reason}")]
    InvalidEntityShape { name: String, reason: String },

    /// Name cannot be used as a URL path segment
    #[error("admin name '{0}' is not URL safe")]
    NotUrlSafe(String),

    /// Entity name already taken within the app
    #[error("admin model '{model}' already exists in app '{app}'. Models cannot be registered more than once")]
    DuplicateEntity { app: String, model: String },

    /// App name already taken within the panel
    #[error("admin app '{0}' already exists. Apps cannot be registered more than once")]
    DuplicateApp(String),

    /// One field failed to build
    #[error("field '{field}': {source}")]
    Field {
        field: String,
        #[source]
        source: DirectiveError,
    },
}

impl RegistrationError {
    /// Create invalid shape error
    pub fn invalid_shape(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEntityShape {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Check if the error is a name conflict rather than a configuration problem
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::NotUrlSafe(_) | Self::DuplicateEntity { .. } | Self::DuplicateApp(_) | Self::InvalidEntityShape { .. }
        )
    }
}
