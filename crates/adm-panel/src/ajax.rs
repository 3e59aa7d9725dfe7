//! JSON action endpoints: search, single delete, bulk delete
//!
//! All three answer with [`JsonResponse`]. Integrator failures on the
//! delete paths map to 400, not 500.

use crate::audit::{AuditEvent, AuditLevel};
use crate::error::{status, PanelError};
use crate::model::Model;
use crate::request::{JsonResponse, RequestContext, Response};
use adm_form::FieldValue;
use serde_json::{json, Value};

/// Query parameter echoed by the search endpoint
pub const QUERY_PARAM: &str = "q";

fn json_error(status: u16, message: impl Into<String>) -> Response {
    Response::json(status, &JsonResponse::error(vec![message.into()]))
}

/// Identifier from a JSON value; strings are taken verbatim
fn id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Model {
    /// Search endpoint
    ///
    /// Requires model-read permission like the list page. Fetches every
    /// record and filters by instance-read permission; the query term is
    /// echoed back but not applied.
    #[tracing::instrument(skip_all, fields(app = %self.app_name(), model = %self.name()))]
    pub async fn search_ajax(&self, ctx: &dyn RequestContext) -> Response {
        let query = ctx.query_param(QUERY_PARAM).unwrap_or_default();

        match self
            .services
            .permissions
            .model_read(self.app_name(), self.name(), ctx)
            .await
        {
            Ok(true) => {}
            Ok(false) => return json_error(status::FORBIDDEN, "Permission denied"),
            Err(err) => return json_error(status::BAD_REQUEST, err.to_string()),
        }

        // TODO: apply `query` once the data integrator contract grows a
        // free-text search over all records.
        let records = match self.data_integrator().fetch_all(self.schema()).await {
            Ok(records) => records,
            Err(err) => return json_error(status::BAD_REQUEST, err.to_string()),
        };
        let visible = match self.filter_by_permission(records, ctx).await {
            Ok(visible) => visible,
            Err(err) => return json_error(status::BAD_REQUEST, err.to_string()),
        };

        let total = visible.len();
        let instances: Vec<Value> = visible.into_iter().map(|(_, record)| Value::Object(record)).collect();
        Response::json(
            status::OK,
            &JsonResponse::success(
                Some(json!({ "instances": instances, "total": total, "query": query })),
                "",
            ),
        )
    }

    /// Single delete endpoint
    ///
    /// Id from the path, else the `id` query parameter.
    #[tracing::instrument(skip_all, fields(app = %self.app_name(), model = %self.name()))]
    pub async fn delete_ajax(&self, ctx: &dyn RequestContext) -> Response {
        let Some(raw) = Self::request_id(ctx) else {
            return json_error(status::BAD_REQUEST, "Instance ID is required");
        };
        let id = match self.parse_id(&raw) {
            Ok(id) => id,
            Err(err) => return json_error(status::BAD_REQUEST, err.to_string()),
        };

        match self
            .services
            .permissions
            .instance_delete(self.app_name(), self.name(), &id, ctx)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(id = %id, "delete denied");
                return json_error(status::FORBIDDEN, "Permission denied");
            }
            Err(err) => return json_error(status::BAD_REQUEST, err.to_string()),
        }

        if let Err(err) = self.data_integrator().delete_by_id(self.schema(), &id).await {
            tracing::warn!(id = %id, error = %err, "delete failed");
            return json_error(status::BAD_REQUEST, err.to_string());
        }

        if let Err(err) = self.audit_delete(ctx, &id).await {
            tracing::error!(id = %id, error = %err, "audit failed after delete");
            return json_error(status::INTERNAL_SERVER_ERROR, err.to_string());
        }
        Response::json(status::OK, &JsonResponse::success(None, "Item deleted successfully"))
    }

    /// Bulk delete endpoint, body `{ "ids": [...] }`
    ///
    /// Every id is handled independently: a denied or failing id is
    /// reported and the batch continues. Status is 400 only when some id
    /// failed and nothing was deleted; an empty `ids` list answers 200 with
    /// zero deletions. An audit failure aborts the batch with 500.
    #[tracing::instrument(skip_all, fields(app = %self.app_name(), model = %self.name()))]
    pub async fn bulk_delete_ajax(&self, ctx: &dyn RequestContext) -> Response {
        let Ok(body) = ctx.json_body() else {
            return json_error(status::BAD_REQUEST, "Invalid JSON data");
        };
        let Some(ids) = body.get("ids") else {
            return json_error(status::BAD_REQUEST, "No items selected");
        };
        let Some(ids) = ids.as_array() else {
            return json_error(status::BAD_REQUEST, "Invalid IDs format");
        };

        let mut deleted = 0usize;
        let mut errors = Vec::new();
        for raw in ids.iter().map(id_text) {
            let id = match self.parse_id(&raw) {
                Ok(id) => id,
                Err(err) => {
                    errors.push(format!("Failed to delete item {raw}: {err}"));
                    continue;
                }
            };

            let allowed = self
                .services
                .permissions
                .instance_delete(self.app_name(), self.name(), &id, ctx)
                .await;
            if !matches!(allowed, Ok(true)) {
                errors.push(format!("Permission denied for item {raw}"));
                continue;
            }

            if let Err(err) = self.data_integrator().delete_by_id(self.schema(), &id).await {
                errors.push(format!("Failed to delete item {raw}: {err}"));
                continue;
            }
            deleted += 1;

            if let Err(err) = self.audit_delete(ctx, &id).await {
                tracing::error!(id = %id, error = %err, "audit failed during bulk delete");
                return json_error(status::INTERNAL_SERVER_ERROR, err.to_string());
            }
        }

        tracing::info!(deleted, failed = errors.len(), "bulk delete finished");
        if errors.is_empty() {
            return Response::json(
                status::OK,
                &JsonResponse::success(
                    Some(json!({ "deleted": deleted })),
                    format!("{deleted} items deleted successfully"),
                ),
            );
        }

        let failed = errors.len();
        let response = JsonResponse {
            success: deleted > 0,
            message: Some(format!("{deleted} items deleted, {failed} failed")),
            data: Some(json!({ "deleted": deleted, "failed": failed })),
            errors,
        };
        let status = if deleted == 0 { status::BAD_REQUEST } else { status::OK };
        Response::json(status, &response)
    }

    async fn audit_delete(&self, ctx: &dyn RequestContext, id: &FieldValue) -> Result<(), PanelError> {
        let event = AuditEvent::new(AuditLevel::InstanceDelete, id.to_string()).with_model(self.name());
        self.audit(ctx, event).await
    }
}
