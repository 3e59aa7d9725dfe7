//! Instance detail page

use crate::audit::{AuditEvent, AuditLevel};
use crate::error::{status, PanelError, RequestError};
use crate::model::{ensure, Model};
use crate::nav::nav_bar_context;
use crate::request::{RequestContext, Response};
use crate::template;
use serde_json::{json, Value};

impl Model {
    /// Show one instance projected to its view fields
    ///
    /// # Errors
    /// 400 without an id, 403 without instance-read permission, 404 when
    /// the record does not exist.
    #[tracing::instrument(skip_all, fields(app = %self.app_name(), model = %self.name()))]
    pub async fn instance_view(&self, ctx: &dyn RequestContext) -> Result<Response, PanelError> {
        let raw = Self::request_id(ctx).ok_or_else(|| RequestError::MissingParameter("id".into()))?;
        let id = self.parse_id(&raw)?;

        let permissions = &self.services.permissions;
        ensure(
            permissions
                .instance_read(self.app_name(), self.name(), &id, ctx)
                .await?,
        )?;

        let record = self
            .data_integrator()
            .get_by_id(self.schema(), &id)
            .await?
            .ok_or_else(|| PanelError::NotFound(format!("{} '{id}'", self.name())))?;

        let fields: Vec<_> = self
            .fields()
            .iter()
            .filter(|f| f.include_in_instance_view)
            .map(|f| {
                json!({
                    "name": f.name,
                    "display_name": f.display_name,
                    "value": record.get(&f.name).cloned().unwrap_or(Value::Null),
                })
            })
            .collect();
        let update = permissions
            .instance_update(self.app_name(), self.name(), &id, ctx)
            .await?;
        let delete = permissions
            .instance_delete(self.app_name(), self.name(), &id, ctx)
            .await?;

        let html = self.services.renderer.render(
            template::INSTANCE,
            &json!({
                "title": format!("{} {id}", self.display_name()),
                "model": { "name": self.name(), "display_name": self.display_name(), "link": self.full_link() },
                "id": id,
                "fields": fields,
                "permissions": { "read": true, "update": update, "delete": delete },
                "edit_link": self.edit_link(&id),
                "nav_bar_items": nav_bar_context(&self.services, ctx),
            }),
        )?;

        let event = AuditEvent::new(AuditLevel::InstanceView, id.to_string()).with_model(self.name());
        self.audit(ctx, event).await?;
        Ok(Response::html(status::OK, html))
    }
}
