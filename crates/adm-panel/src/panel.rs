//! Panel root
//!
//! The [`Panel`] owns the configuration and the collaborators shared by
//! every app and model. Apps register through [`Panel::register_app`];
//! models through [`App::register_model`](crate::App::register_model).

use crate::app::App;
use crate::audit::{AuditSink, TracingAuditSink};
use crate::config::PanelConfig;
use crate::integrator::{AllowAll, DataIntegrator, PermissionChecker};
use crate::request::WebIntegrator;
use crate::template::{BasicTemplateRenderer, TemplateRenderer};
use adm_schema::{humanize, is_url_safe, RegistrationError};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Collaborators shared by every handler
pub(crate) struct Services {
    pub(crate) config: PanelConfig,
    pub(crate) web: Arc<dyn WebIntegrator>,
    pub(crate) permissions: Arc<dyn PermissionChecker>,
    pub(crate) audit: Arc<dyn AuditSink>,
    pub(crate) renderer: Arc<dyn TemplateRenderer>,
    /// App name to display name, in registration order
    pub(crate) apps: RwLock<IndexMap<String, String>>,
}

/// Builder for [`Panel`]
pub struct PanelBuilder {
    config: PanelConfig,
    web: Arc<dyn WebIntegrator>,
    data: Arc<dyn DataIntegrator>,
    permissions: Arc<dyn PermissionChecker>,
    audit: Arc<dyn AuditSink>,
    renderer: Arc<dyn TemplateRenderer>,
}

impl PanelBuilder {
    #[must_use]
    pub fn config(mut self, config: PanelConfig) -> Self {
        self.config = config;
        self
    }

    /// Permission authority; defaults to [`AllowAll`]
    #[must_use]
    pub fn permissions(mut self, permissions: Arc<dyn PermissionChecker>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Audit sink; defaults to [`TracingAuditSink`]
    #[must_use]
    pub fn audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Template engine; defaults to [`BasicTemplateRenderer`]
    #[must_use]
    pub fn renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    #[must_use]
    pub fn build(self) -> Panel {
        Panel {
            services: Arc::new(Services {
                config: self.config,
                web: self.web,
                permissions: self.permissions,
                audit: self.audit,
                renderer: self.renderer,
                apps: RwLock::new(IndexMap::new()),
            }),
            data: self.data,
            apps: IndexMap::new(),
        }
    }
}

/// Admin panel: apps grouping registered models
pub struct Panel {
    services: Arc<Services>,
    data: Arc<dyn DataIntegrator>,
    apps: IndexMap<String, App>,
}

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("config", &self.services.config)
            .field("apps", &self.apps.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Panel {
    /// Start building a panel over a web binding and a default data integrator
    #[must_use]
    pub fn builder(web: Arc<dyn WebIntegrator>, data: Arc<dyn DataIntegrator>) -> PanelBuilder {
        PanelBuilder {
            config: PanelConfig::default(),
            web,
            data,
            permissions: Arc::new(AllowAll),
            audit: Arc::new(TracingAuditSink),
            renderer: Arc::new(BasicTemplateRenderer),
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PanelConfig {
        &self.services.config
    }

    /// Register an app and its page route
    ///
    /// `display_name` defaults to the humanized name; `data` overrides the
    /// panel's data integrator for every model of the app.
    ///
    /// # Errors
    /// [`RegistrationError::NotUrlSafe`] or [`RegistrationError::DuplicateApp`].
    pub fn register_app(
        &mut self,
        name: &str,
        display_name: Option<&str>,
        data: Option<Arc<dyn DataIntegrator>>,
    ) -> Result<&mut App, RegistrationError> {
        if !is_url_safe(name) {
            return Err(RegistrationError::NotUrlSafe(name.to_string()));
        }
        if self.apps.contains_key(name) {
            return Err(RegistrationError::DuplicateApp(name.to_string()));
        }

        let display_name = display_name.map_or_else(|| humanize(name), str::to_string);
        let data = data.unwrap_or_else(|| Arc::clone(&self.data));
        let app = App::new(name, &display_name, data, Arc::clone(&self.services));
        app.register_routes();
        self.services
            .apps
            .write()
            .insert(name.to_string(), display_name.clone());

        tracing::info!(app = name, "registered admin app");
        Ok(self.apps.entry(name.to_string()).or_insert(app))
    }

    #[must_use]
    pub fn app(&self, name: &str) -> Option<&App> {
        self.apps.get(name)
    }

    #[must_use]
    pub fn app_mut(&mut self, name: &str) -> Option<&mut App> {
        self.apps.get_mut(name)
    }

    /// Apps in registration order
    pub fn apps(&self) -> impl Iterator<Item = &App> {
        self.apps.values()
    }
}
