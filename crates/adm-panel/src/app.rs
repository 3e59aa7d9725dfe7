//! Apps and entity registration

use crate::audit::{AuditEvent, AuditLevel};
use crate::error::{status, PanelError};
use crate::integrator::DataIntegrator;
use crate::model::{ensure, model_handler, page_response, Model};
use crate::nav::nav_bar_context;
use crate::panel::Services;
use crate::request::{Handler, Method, RequestContext, Response};
use crate::template;
use adm_schema::{AdminModel, ModelSchema, RegistrationError};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::json;
use std::fmt;
use std::sync::Arc;

struct AppInner {
    name: String,
    display_name: String,
    data: Arc<dyn DataIntegrator>,
    models: RwLock<IndexMap<String, Arc<Model>>>,
    services: Arc<Services>,
}

/// Group of models sharing a URL segment
///
/// Cloning yields another handle to the same app.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("name", &self.inner.name)
            .field("display_name", &self.inner.display_name)
            .field("models", &self.inner.models.read().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl App {
    pub(crate) fn new(
        name: &str,
        display_name: &str,
        data: Arc<dyn DataIntegrator>,
        services: Arc<Services>,
    ) -> Self {
        Self {
            inner: Arc::new(AppInner {
                name: name.to_string(),
                display_name: display_name.to_string(),
                data,
                models: RwLock::new(IndexMap::new()),
                services,
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.inner.display_name
    }

    /// Panel-relative path: `/a/<app>`
    #[must_use]
    pub fn link(&self) -> String {
        format!("/a/{}", self.inner.name)
    }

    #[must_use]
    pub fn full_link(&self) -> String {
        self.inner.services.config.link(&self.link())
    }

    #[must_use]
    pub fn model(&self, name: &str) -> Option<Arc<Model>> {
        self.inner.models.read().get(name).cloned()
    }

    /// Models in registration order
    #[must_use]
    pub fn models(&self) -> Vec<Arc<Model>> {
        self.inner.models.read().values().cloned().collect()
    }

    #[must_use]
    pub fn model_count(&self) -> usize {
        self.inner.models.read().len()
    }

    /// Register an entity type
    ///
    /// Builds every field config first and installs nothing on failure.
    /// On success the model's routes are registered with the web binding;
    /// there is no way to unregister them.
    ///
    /// # Errors
    /// Shape, naming and directive errors from schema compilation, or
    /// [`RegistrationError::DuplicateEntity`].
    pub fn register_model<M: AdminModel + ?Sized>(
        &mut self,
        model: &M,
        data: Option<Arc<dyn DataIntegrator>>,
    ) -> Result<Arc<Model>, RegistrationError> {
        let schema = ModelSchema::compile(model)?;
        self.install(schema, data)
    }

    /// Register an already compiled schema
    ///
    /// # Errors
    /// [`RegistrationError::DuplicateEntity`] when the name is taken.
    pub fn register_schema(
        &mut self,
        schema: ModelSchema,
        data: Option<Arc<dyn DataIntegrator>>,
    ) -> Result<Arc<Model>, RegistrationError> {
        self.install(schema, data)
    }

    fn install(
        &self,
        schema: ModelSchema,
        data: Option<Arc<dyn DataIntegrator>>,
    ) -> Result<Arc<Model>, RegistrationError> {
        let inner = &self.inner;
        let mut models = inner.models.write();
        if models.contains_key(&schema.name) {
            return Err(RegistrationError::DuplicateEntity {
                app: inner.name.clone(),
                model: schema.name,
            });
        }

        let data = data.unwrap_or_else(|| Arc::clone(&inner.data));
        let model = Arc::new(Model::new(
            &inner.name,
            &inner.display_name,
            schema,
            data,
            Arc::clone(&inner.services),
        ));
        register_model_routes(&inner.services, &model);

        tracing::info!(
            app = %inner.name,
            model = model.name(),
            fields = model.fields().len(),
            "registered admin model"
        );
        models.insert(model.name().to_string(), Arc::clone(&model));
        Ok(model)
    }

    pub(crate) fn register_routes(&self) {
        let app = self.clone();
        let handler: Handler = Arc::new(move |ctx: Arc<dyn RequestContext>| -> BoxFuture<'static, Response> {
            let app = app.clone();
            Box::pin(async move {
                let result = app.page(ctx.as_ref()).await;
                page_response(app.name(), result)
            })
        });
        self.inner
            .services
            .web
            .handle_route(Method::Get, &self.full_link(), handler);
    }

    /// App page listing the models the caller may read
    ///
    /// # Errors
    /// [`PanelError::Forbidden`] without app-read permission; collaborator
    /// failures otherwise.
    #[tracing::instrument(skip_all, fields(app = %self.inner.name))]
    pub async fn page(&self, ctx: &dyn RequestContext) -> Result<Response, PanelError> {
        let services = &self.inner.services;
        ensure(services.permissions.app_read(&self.inner.name, ctx).await?)?;

        let mut visible = Vec::new();
        for model in self.models() {
            if services
                .permissions
                .model_read(&self.inner.name, model.name(), ctx)
                .await?
            {
                visible.push(json!({
                    "name": model.name(),
                    "display_name": model.display_name(),
                    "link": model.full_link(),
                    "add_link": model.full_add_link(),
                }));
            }
        }

        let html = services.renderer.render(
            template::APP,
            &json!({
                "title": self.inner.display_name,
                "app": { "name": self.inner.name, "display_name": self.inner.display_name },
                "models": visible,
                "nav_bar_items": nav_bar_context(services, ctx),
            }),
        )?;

        let event = AuditEvent::new(AuditLevel::PanelView, self.inner.name.clone());
        services.audit.record(ctx, event).await?;
        Ok(Response::html(status::OK, html))
    }
}

fn register_model_routes(services: &Services, model: &Arc<Model>) {
    let base = model.full_link();
    let web = &services.web;

    web.handle_route(
        Method::Get,
        &base,
        model_handler(model, |m, ctx| async move {
            let result = m.list_view(ctx.as_ref()).await;
            page_response(m.name(), result)
        }),
    );
    web.handle_route(
        Method::Get,
        &format!("{base}/:id/view"),
        model_handler(model, |m, ctx| async move {
            let result = m.instance_view(ctx.as_ref()).await;
            page_response(m.name(), result)
        }),
    );
    web.handle_route(
        Method::Delete,
        &format!("{base}/:id/view"),
        model_handler(model, |m, ctx| async move { m.delete_ajax(ctx.as_ref()).await }),
    );

    let add = model_handler(model, |m, ctx| async move {
        let result = m.add_form(ctx.as_ref()).await;
        page_response(m.name(), result)
    });
    web.handle_route(Method::Get, &format!("{base}/add"), Arc::clone(&add));
    web.handle_route(Method::Post, &format!("{base}/add"), add);

    let edit = model_handler(model, |m, ctx| async move {
        let result = m.edit_form(ctx.as_ref()).await;
        page_response(m.name(), result)
    });
    web.handle_route(Method::Get, &format!("{base}/:id/edit"), Arc::clone(&edit));
    web.handle_route(Method::Post, &format!("{base}/:id/edit"), edit);

    web.handle_route(
        Method::Get,
        &format!("{base}/search"),
        model_handler(model, |m, ctx| async move { m.search_ajax(ctx.as_ref()).await }),
    );
    web.handle_route(
        Method::Post,
        &format!("{base}/bulk-delete"),
        model_handler(model, |m, ctx| async move { m.bulk_delete_ajax(ctx.as_ref()).await }),
    );
}
