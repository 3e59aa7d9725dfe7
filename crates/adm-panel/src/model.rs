//! Registered entities
//!
//! A [`Model`] is immutable once registered. Request handlers live in
//! `listing`, `instance`, `forms` and `ajax` as further `impl Model` blocks.

use crate::audit::AuditEvent;
use crate::error::{IntegratorError, PanelError, RequestError};
use crate::integrator::{DataIntegrator, Record};
use crate::panel::Services;
use crate::request::{Handler, RequestContext, Response};
use adm_form::{convert_str, FieldValue, ValueKind};
use adm_schema::{FieldConfig, ModelSchema};
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Entity registered under an app
pub struct Model {
    app: String,
    app_display_name: String,
    schema: ModelSchema,
    data: Arc<dyn DataIntegrator>,
    pub(crate) services: Arc<Services>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("app", &self.app)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl Model {
    pub(crate) fn new(
        app: &str,
        app_display_name: &str,
        schema: ModelSchema,
        data: Arc<dyn DataIntegrator>,
        services: Arc<Services>,
    ) -> Self {
        Self {
            app: app.to_string(),
            app_display_name: app_display_name.to_string(),
            schema,
            data,
            services,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.schema.display_name
    }

    /// Name of the owning app
    #[inline]
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app
    }

    #[inline]
    #[must_use]
    pub fn app_display_name(&self) -> &str {
        &self.app_display_name
    }

    #[inline]
    #[must_use]
    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// Field configs in declaration order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldConfig] {
        &self.schema.fields
    }

    /// Data integrator resolved at registration (model, else app, else panel)
    #[inline]
    #[must_use]
    pub fn data_integrator(&self) -> &Arc<dyn DataIntegrator> {
        &self.data
    }

    /// Panel-relative path: `/a/<app>/<model>`
    #[must_use]
    pub fn link(&self) -> String {
        format!("/a/{}/{}", self.app, self.schema.name)
    }

    /// Absolute list path including the panel prefix
    #[must_use]
    pub fn full_link(&self) -> String {
        self.services.config.link(&self.link())
    }

    #[must_use]
    pub fn add_link(&self) -> String {
        format!("{}/add", self.link())
    }

    #[must_use]
    pub fn full_add_link(&self) -> String {
        self.services.config.link(&self.add_link())
    }

    /// Absolute detail path of one instance
    #[must_use]
    pub fn instance_link(&self, id: &FieldValue) -> String {
        format!("{}/{id}/view", self.full_link())
    }

    /// Absolute edit path of one instance
    #[must_use]
    pub fn edit_link(&self, id: &FieldValue) -> String {
        format!("{}/{id}/edit", self.full_link())
    }

    /// Primary key of a fetched record
    ///
    /// # Errors
    /// Propagates the integrator's failure.
    pub fn primary_key_value(&self, record: &Record) -> Result<FieldValue, IntegratorError> {
        self.data.primary_key_value(&self.schema, record)
    }

    /// Convert an identifier from a path, query or JSON body
    ///
    /// Opaque primary keys are passed through as text.
    ///
    /// # Errors
    /// [`RequestError::InvalidId`] when the value does not convert to the
    /// primary key kind.
    pub fn parse_id(&self, raw: &str) -> Result<FieldValue, PanelError> {
        let kind = self.data.primary_key_kind(&self.schema)?;
        if kind == ValueKind::Opaque {
            return Ok(FieldValue::Text(raw.to_string()));
        }
        convert_str(raw, kind).map_err(|_| {
            PanelError::from(RequestError::InvalidId {
                value: raw.to_string(),
                kind,
            })
        })
    }

    /// Identifier from the `id` path parameter, else the `id` query parameter
    pub(crate) fn request_id(ctx: &dyn RequestContext) -> Option<String> {
        ctx.path_param("id")
            .filter(|s| !s.is_empty())
            .or_else(|| ctx.query_param("id").filter(|s| !s.is_empty()))
    }

    pub(crate) async fn audit(&self, ctx: &dyn RequestContext, event: AuditEvent) -> Result<(), PanelError> {
        self.services.audit.record(ctx, event).await?;
        Ok(())
    }
}

/// Deny with [`PanelError::Forbidden`] unless `allowed`
pub(crate) fn ensure(allowed: bool) -> Result<(), PanelError> {
    if allowed {
        Ok(())
    } else {
        Err(PanelError::Forbidden)
    }
}

/// Turn a page result into a response, logging failures
pub(crate) fn page_response(model: &str, result: Result<Response, PanelError>) -> Response {
    match result {
        Ok(response) => response,
        Err(err) => {
            let status = err.status_code();
            if status >= 500 {
                tracing::error!(model, status, error = %err, "request failed");
            } else {
                tracing::warn!(model, status, error = %err, "request rejected");
            }
            Response::error_html(status, &err)
        }
    }
}

/// Wrap a model method as a route [`Handler`]
pub(crate) fn model_handler<F, Fut>(model: &Arc<Model>, f: F) -> Handler
where
    F: Fn(Arc<Model>, Arc<dyn RequestContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let model = Arc::clone(model);
    Arc::new(move |ctx: Arc<dyn RequestContext>| -> BoxFuture<'static, Response> {
        Box::pin(f(Arc::clone(&model), ctx))
    })
}
