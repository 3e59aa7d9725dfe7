//! Listing pipeline
//!
//! `ResolveParams -> CheckModelPermission -> Fetch -> FilterByPermission ->
//! Paginate -> Render -> Log`. Rendering also resolves the apps the caller
//! may read for the sidebar. The first failing stage ends the request.

use crate::audit::{AuditEvent, AuditLevel};
use crate::config::MIN_INSTANCES_PER_PAGE;
use crate::error::{status, PanelError};
use crate::integrator::Record;
use crate::model::{ensure, Model};
use crate::nav::{nav_bar_context, readable_apps};
use crate::request::{RequestContext, Response};
use crate::template;
use adm_form::FieldValue;
use serde::Serialize;
use serde_json::json;

/// Query parameter carrying the page number
pub const PAGE_PARAM: &str = "page";
/// Query parameter carrying the page size
pub const PER_PAGE_PARAM: &str = "perPage";
/// Query parameter carrying the list search term
pub const SEARCH_PARAM: &str = "search";

/// Requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based page number
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Resolve raw query values
    ///
    /// A missing, unparsable or zero page becomes 1. A missing, unparsable
    /// or zero page size becomes `default_per_page`. The page size is then
    /// raised to at least [`MIN_INSTANCES_PER_PAGE`].
    #[must_use]
    pub fn resolve(page: Option<&str>, per_page: Option<&str>, default_per_page: usize) -> Self {
        let parse = |raw: Option<&str>| {
            raw.and_then(|s| s.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
        };
        Self {
            page: parse(page).unwrap_or(1),
            per_page: parse(per_page)
                .unwrap_or(default_per_page)
                .max(MIN_INSTANCES_PER_PAGE),
        }
    }

    /// Slice bounds for `total` items
    #[must_use]
    pub fn window(&self, total: usize) -> PageWindow {
        let start = (self.page - 1).saturating_mul(self.per_page).min(total);
        let end = start.saturating_add(self.per_page).min(total);
        PageWindow {
            start,
            end,
            total_pages: total.div_ceil(self.per_page),
        }
    }
}

/// Slice of the filtered result shown on one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
    pub total_pages: usize,
}

/// Per-instance permission flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permissions {
    pub read: bool,
    pub update: bool,
    pub delete: bool,
}

/// Record projection with resolved permissions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    pub id: FieldValue,
    pub model: String,
    pub data: Record,
    pub permissions: Permissions,
}

/// Everything the list template needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPage {
    pub instances: Vec<Instance>,
    pub total_count: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub per_page: usize,
    pub search: Option<String>,
}

impl Model {
    /// Drop records the caller may not read, pairing the rest with their id
    ///
    /// # Errors
    /// Primary key or permission authority failures.
    pub async fn filter_by_permission(
        &self,
        records: Vec<Record>,
        ctx: &dyn RequestContext,
    ) -> Result<Vec<(FieldValue, Record)>, PanelError> {
        let permissions = &self.services.permissions;
        let mut visible = Vec::with_capacity(records.len());
        for record in records {
            let id = self.primary_key_value(&record)?;
            if permissions
                .instance_read(self.app_name(), self.name(), &id, ctx)
                .await?
            {
                visible.push((id, record));
            }
        }
        Ok(visible)
    }

    /// Run the listing pipeline up to pagination
    ///
    /// # Errors
    /// [`PanelError::Forbidden`] without model-read permission, before any
    /// data is fetched; collaborator failures otherwise.
    pub async fn list_page(&self, ctx: &dyn RequestContext) -> Result<ListPage, PanelError> {
        let pagination = Pagination::resolve(
            ctx.query_param(PAGE_PARAM).as_deref(),
            ctx.query_param(PER_PAGE_PARAM).as_deref(),
            self.services.config.default_instances_per_page,
        );
        tracing::debug!(page = pagination.page, per_page = pagination.per_page, "resolved pagination");

        let permissions = &self.services.permissions;
        ensure(permissions.model_read(self.app_name(), self.name(), ctx).await?)?;

        let schema = self.schema();
        let fetch = schema.list_fetch_fields();
        let search = ctx.query_param(SEARCH_PARAM).filter(|s| !s.is_empty());
        let records = match &search {
            None => self.data_integrator().fetch_fields(schema, &fetch).await?,
            Some(term) => {
                self.data_integrator()
                    .fetch_fields_with_search(schema, &fetch, term, &schema.search_fields())
                    .await?
            }
        };
        let fetched = records.len();

        let mut visible = self.filter_by_permission(records, ctx).await?;
        let total = visible.len();
        let window = pagination.window(total);
        tracing::debug!(fetched, visible = total, start = window.start, end = window.end, "filtered listing");

        let mut instances = Vec::with_capacity(window.end - window.start);
        for (id, data) in visible.drain(window.start..window.end) {
            let update = permissions
                .instance_update(self.app_name(), self.name(), &id, ctx)
                .await?;
            let delete = permissions
                .instance_delete(self.app_name(), self.name(), &id, ctx)
                .await?;
            instances.push(Instance {
                id,
                model: self.name().to_string(),
                data,
                permissions: Permissions {
                    read: true,
                    update,
                    delete,
                },
            });
        }

        Ok(ListPage {
            instances,
            total_count: total,
            total_pages: window.total_pages,
            current_page: pagination.page,
            per_page: pagination.per_page,
            search,
        })
    }

    /// List page handler body: pipeline, render, then audit
    ///
    /// # Errors
    /// As [`Model::list_page`], plus render and audit failures; an audit
    /// failure fails the request even though data was fetched.
    #[tracing::instrument(skip_all, fields(app = %self.app_name(), model = %self.name()))]
    pub async fn list_view(&self, ctx: &dyn RequestContext) -> Result<Response, PanelError> {
        let page = self.list_page(ctx).await?;
        let apps = readable_apps(&self.services, ctx).await?;

        let columns: Vec<_> = self
            .fields()
            .iter()
            .filter(|f| f.include_in_list_display)
            .map(|f| json!({ "name": f.name, "display_name": f.display_name }))
            .collect();
        let links: Vec<_> = page
            .instances
            .iter()
            .map(|i| json!({ "view": self.instance_link(&i.id), "edit": self.edit_link(&i.id) }))
            .collect();
        let html = self.services.renderer.render(
            template::MODEL,
            &json!({
                "title": self.display_name(),
                "app": { "name": self.app_name(), "display_name": self.app_display_name() },
                "model": { "name": self.name(), "display_name": self.display_name(), "link": self.full_link(), "add_link": self.full_add_link() },
                "columns": columns,
                "links": links,
                "page": page,
                "apps": apps,
                "nav_bar_items": nav_bar_context(&self.services, ctx),
            }),
        )?;

        let subject = format!("{} | {}", self.app_name(), self.display_name());
        self.audit(ctx, AuditEvent::new(AuditLevel::ListView, subject).with_model(self.name()))
            .await?;
        Ok(Response::html(status::OK, html))
    }
}
