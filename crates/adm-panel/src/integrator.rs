//! Data and permission collaborators
//!
//! Records travel as JSON objects ([`Record`]); the panel only reads the
//! fields it was told to fetch and the primary key the integrator resolves.

use crate::error::{IntegratorError, PermissionError};
use crate::request::RequestContext;
use adm_form::{CleanData, FieldValue, ValueKind};
use adm_schema::ModelSchema;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt::{self, Display};

/// Stored record
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Persistence binding
#[async_trait]
pub trait DataIntegrator: Send + Sync {
    /// Every record with every field
    async fn fetch_all(&self, model: &ModelSchema) -> Result<Vec<Record>, IntegratorError>;

    /// Every record projected to `fields`
    async fn fetch_fields(
        &self,
        model: &ModelSchema,
        fields: &[String],
    ) -> Result<Vec<Record>, IntegratorError>;

    /// Records whose `search_fields` match `term`, projected to `fields`
    ///
    /// Matching semantics belong to the integrator.
    async fn fetch_fields_with_search(
        &self,
        model: &ModelSchema,
        fields: &[String],
        term: &str,
        search_fields: &[String],
    ) -> Result<Vec<Record>, IntegratorError>;

    /// One record, `None` when absent
    async fn get_by_id(
        &self,
        model: &ModelSchema,
        id: &FieldValue,
    ) -> Result<Option<Record>, IntegratorError>;

    /// Insert a record built from cleaned form data
    async fn create(&self, model: &ModelSchema, values: &CleanData) -> Result<Record, IntegratorError>;

    /// Overwrite the cleaned fields of an existing record
    async fn update(
        &self,
        model: &ModelSchema,
        id: &FieldValue,
        values: &CleanData,
    ) -> Result<Record, IntegratorError>;

    async fn delete_by_id(&self, model: &ModelSchema, id: &FieldValue) -> Result<(), IntegratorError>;

    /// Primary key of a fetched record
    fn primary_key_value(&self, model: &ModelSchema, record: &Record) -> Result<FieldValue, IntegratorError>;

    /// Kind used to convert identifiers taken from paths and JSON bodies
    fn primary_key_kind(&self, model: &ModelSchema) -> Result<ValueKind, IntegratorError>;
}

/// What a permission check asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionAction {
    Read,
    Add,
    Update,
    Delete,
}

/// Scope and action of a permission check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermissionRequest {
    pub app: String,
    pub model: Option<String>,
    pub instance: Option<FieldValue>,
    pub action: PermissionAction,
}

impl PermissionRequest {
    #[must_use]
    pub fn app(app: &str, action: PermissionAction) -> Self {
        Self {
            app: app.to_string(),
            model: None,
            instance: None,
            action,
        }
    }

    #[must_use]
    pub fn model(app: &str, model: &str, action: PermissionAction) -> Self {
        Self {
            model: Some(model.to_string()),
            ..Self::app(app, action)
        }
    }

    #[must_use]
    pub fn instance(app: &str, model: &str, id: &FieldValue, action: PermissionAction) -> Self {
        Self {
            instance: Some(id.clone()),
            ..Self::model(app, model, action)
        }
    }
}

impl Display for PermissionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.action, self.app)?;
        if let Some(model) = &self.model {
            write!(f, "/{model}")?;
        }
        if let Some(id) = &self.instance {
            write!(f, "/{id}")?;
        }
        Ok(())
    }
}

/// Permission authority
///
/// Only [`PermissionChecker::check`] is required; the scoped helpers build
/// the matching [`PermissionRequest`].
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    /// Decide one request; `Err` means the authority itself failed
    async fn check(
        &self,
        request: &PermissionRequest,
        ctx: &dyn RequestContext,
    ) -> Result<bool, PermissionError>;

    async fn app_read(&self, app: &str, ctx: &dyn RequestContext) -> Result<bool, PermissionError> {
        self.check(&PermissionRequest::app(app, PermissionAction::Read), ctx)
            .await
    }

    async fn model_read(
        &self,
        app: &str,
        model: &str,
        ctx: &dyn RequestContext,
    ) -> Result<bool, PermissionError> {
        self.check(&PermissionRequest::model(app, model, PermissionAction::Read), ctx)
            .await
    }

    async fn model_add(
        &self,
        app: &str,
        model: &str,
        ctx: &dyn RequestContext,
    ) -> Result<bool, PermissionError> {
        self.check(&PermissionRequest::model(app, model, PermissionAction::Add), ctx)
            .await
    }

    async fn instance_read(
        &self,
        app: &str,
        model: &str,
        id: &FieldValue,
        ctx: &dyn RequestContext,
    ) -> Result<bool, PermissionError> {
        self.check(
            &PermissionRequest::instance(app, model, id, PermissionAction::Read),
            ctx,
        )
        .await
    }

    async fn instance_update(
        &self,
        app: &str,
        model: &str,
        id: &FieldValue,
        ctx: &dyn RequestContext,
    ) -> Result<bool, PermissionError> {
        self.check(
            &PermissionRequest::instance(app, model, id, PermissionAction::Update),
            ctx,
        )
        .await
    }

    async fn instance_delete(
        &self,
        app: &str,
        model: &str,
        id: &FieldValue,
        ctx: &dyn RequestContext,
    ) -> Result<bool, PermissionError> {
        self.check(
            &PermissionRequest::instance(app, model, id, PermissionAction::Delete),
            ctx,
        )
        .await
    }
}

/// Grants everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl PermissionChecker for AllowAll {
    async fn check(
        &self,
        _request: &PermissionRequest,
        _ctx: &dyn RequestContext,
    ) -> Result<bool, PermissionError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_display() {
        let request = PermissionRequest::instance("people", "Persona", &FieldValue::Integer(3), PermissionAction::Delete);
        assert_eq!(request.to_string(), "Delete people/Persona/3");
        assert_eq!(
            PermissionRequest::app("people", PermissionAction::Read).to_string(),
            "Read people"
        );
    }
}
