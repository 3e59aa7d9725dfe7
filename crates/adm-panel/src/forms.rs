//! Add and edit form handlers
//!
//! GET renders the form. POST validates every widget and the entity's
//! validation functions; on errors the form is re-rendered with status 422,
//! otherwise the cleaned values are persisted, audited and the client is
//! redirected to the model list.

use crate::audit::{AuditEvent, AuditLevel};
use crate::error::{status, PanelError, RequestError};
use crate::model::{ensure, Model};
use crate::nav::nav_bar_context;
use crate::request::{Method, RequestContext, Response};
use crate::template;
use adm_form::{
    clean_data, first_values, json_to_form_string, values_are_valid, FieldValue, Form, FormValues,
    ValidationReport,
};
use adm_schema::FormMode;
use serde_json::json;

/// Outcome of a submission
enum Submission {
    /// Validation failed; re-render with the submitted values
    Invalid(FormValues, ValidationReport),
    /// Cleaned and persisted
    Saved(FieldValue),
}

impl Model {
    /// Add form handler body
    ///
    /// # Errors
    /// 403 without model-add permission; collaborator failures otherwise.
    #[tracing::instrument(skip_all, fields(app = %self.app_name(), model = %self.name()))]
    pub async fn add_form(&self, ctx: &dyn RequestContext) -> Result<Response, PanelError> {
        ensure(
            self.services
                .permissions
                .model_add(self.app_name(), self.name(), ctx)
                .await?,
        )?;
        let form = self.schema().form(FormMode::Add)?;
        let title = format!("Add {}", self.display_name());

        if ctx.method() != Method::Post {
            return self.form_page(ctx, &form, FormMode::Add, &title, None, None);
        }

        match self.submit(&form, ctx, None).await? {
            Submission::Invalid(values, report) => self.form_page(
                ctx,
                &form,
                FormMode::Add,
                &title,
                Some(&values),
                Some(&report),
            ),
            Submission::Saved(id) => {
                let event = AuditEvent::new(AuditLevel::InstanceAdd, id.to_string()).with_model(self.name());
                self.audit(ctx, event).await?;
                Ok(Response::redirect(self.full_link()))
            }
        }
    }

    /// Edit form handler body
    ///
    /// # Errors
    /// 400 without an id, 403 without instance-update permission, 404 for
    /// a missing record; collaborator failures otherwise.
    #[tracing::instrument(skip_all, fields(app = %self.app_name(), model = %self.name()))]
    pub async fn edit_form(&self, ctx: &dyn RequestContext) -> Result<Response, PanelError> {
        let raw = Self::request_id(ctx).ok_or_else(|| RequestError::MissingParameter("id".into()))?;
        let id = self.parse_id(&raw)?;
        ensure(
            self.services
                .permissions
                .instance_update(self.app_name(), self.name(), &id, ctx)
                .await?,
        )?;

        let record = self
            .data_integrator()
            .get_by_id(self.schema(), &id)
            .await?
            .ok_or_else(|| PanelError::NotFound(format!("{} '{id}'", self.name())))?;

        let mut form = self.schema().form(FormMode::Edit)?;
        let title = format!("Edit {} {id}", self.display_name());

        if ctx.method() != Method::Post {
            let initial: FormValues = form
                .fields()
                .iter()
                .filter_map(|f| record.get(&f.name).map(|v| (f.name.clone(), json_to_form_string(v))))
                .collect();
            form.register_initial_values(initial)?;
            return self.form_page(ctx, &form, FormMode::Edit, &title, None, None);
        }

        match self.submit(&form, ctx, Some(&id)).await? {
            Submission::Invalid(values, report) => self.form_page(
                ctx,
                &form,
                FormMode::Edit,
                &title,
                Some(&values),
                Some(&report),
            ),
            Submission::Saved(id) => {
                let event = AuditEvent::new(AuditLevel::InstanceEdit, id.to_string()).with_model(self.name());
                self.audit(ctx, event).await?;
                Ok(Response::redirect(self.full_link()))
            }
        }
    }

    /// Validate, clean and persist a submission
    ///
    /// Creates when `id` is `None`, updates otherwise. Nothing reaches the
    /// data integrator unless validation fully succeeds.
    async fn submit(
        &self,
        form: &Form,
        ctx: &dyn RequestContext,
        id: Option<&FieldValue>,
    ) -> Result<Submission, PanelError> {
        let values = first_values(ctx.form_data());
        let report = values_are_valid(form, &values)?;
        if !report.is_valid() {
            tracing::debug!(errors = report.error_count(), "form submission rejected");
            return Ok(Submission::Invalid(values, report));
        }

        let clean = clean_data(form, &values)?;
        let data = self.data_integrator();
        let saved = match id {
            None => {
                let record = data.create(self.schema(), &clean).await?;
                self.primary_key_value(&record)?
            }
            Some(id) => {
                data.update(self.schema(), id, &clean).await?;
                id.clone()
            }
        };
        tracing::info!(id = %saved, created = id.is_none(), "saved instance");
        Ok(Submission::Saved(saved))
    }

    /// Render the form page; a validation report means a rejected submission (422)
    fn form_page(
        &self,
        ctx: &dyn RequestContext,
        form: &Form,
        mode: FormMode,
        title: &str,
        values: Option<&FormValues>,
        report: Option<&ValidationReport>,
    ) -> Result<Response, PanelError> {
        let style = self.services.config.render_style;
        let form_html = style.renderer().render(form, values, report);
        let html = self.services.renderer.render(
            template::FORM,
            &json!({
                "title": title,
                "mode": mode,
                "model": { "name": self.name(), "display_name": self.display_name(), "link": self.full_link() },
                "render_style": style,
                "form_html": form_html,
                "error_count": report.map_or(0, ValidationReport::error_count),
                "nav_bar_items": nav_bar_context(&self.services, ctx),
            }),
        )?;
        let status = if report.is_some() {
            status::UNPROCESSABLE_ENTITY
        } else {
            status::OK
        };
        Ok(Response::html(status, html))
    }
}
