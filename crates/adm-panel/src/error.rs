//! Error types for the admin panel
//!
//! Collaborator errors (`IntegratorError`, `PermissionError`, `AuditError`,
//! `RenderError`) are produced by the pluggable backends; `RequestError`
//! covers malformed requests. [`PanelError`] unifies them for the request
//! pipeline and maps each one to an HTTP status.

use adm_form::{FormError, ValueKind};
use adm_schema::RegistrationError;
use std::path::PathBuf;

/// HTTP status codes used by the pipeline
pub mod status {
    pub const OK: u16 = 200;
    pub const SEE_OTHER: u16 = 303;
    pub const BAD_REQUEST: u16 = 400;
    pub const FORBIDDEN: u16 = 403;
    pub const NOT_FOUND: u16 = 404;
    pub const UNPROCESSABLE_ENTITY: u16 = 422;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

/// Data integrator failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegratorError {
    /// No record with that identifier
    #[error("instance '{0}' not found")]
    NotFound(String),

    /// Record lacks a usable primary key
    #[error("missing primary key: {0}")]
    MissingPrimaryKey(String),

    /// Storage backend failure
    #[error("backend error: {0}")]
    Backend(String),
}

impl IntegratorError {
    /// Create backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Permission authority failure (not a denial)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("permission check failed: {0}")]
pub struct PermissionError(pub String);

/// Audit sink failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("audit log failed: {0}")]
pub struct AuditError(pub String);

/// Template rendering failure
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("unknown template: '{0}'")]
    UnknownTemplate(String),

    #[error("template context serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("template error: {0}")]
    Template(String),
}

/// Malformed request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("missing parameter: '{0}'")]
    MissingParameter(String),

    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    /// Identifier does not convert to the primary key kind
    #[error("invalid identifier '{value}' for {kind} primary key")]
    InvalidId { value: String, kind: ValueKind },
}

/// Configuration loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors surfaced by request handlers
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// Permission authority said no
    #[error("forbidden")]
    Forbidden,

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Integrator(#[from] IntegratorError),

    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

impl PanelError {
    /// HTTP status for read paths
    ///
    /// Delete handlers map integrator errors to 400 themselves.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Forbidden => status::FORBIDDEN,
            Self::NotFound(_) | Self::Integrator(IntegratorError::NotFound(_)) => status::NOT_FOUND,
            Self::Request(_) => status::BAD_REQUEST,
            Self::Integrator(_)
            | Self::Permission(_)
            | Self::Audit(_)
            | Self::Render(_)
            | Self::Form(_)
            | Self::Registration(_) => status::INTERNAL_SERVER_ERROR,
        }
    }
}
