//! Admin Panel - registry and request pipeline
//!
//! Registers entities under apps, derives their routes and serves them:
//! - paginated, permission-filtered listing with search
//! - instance detail page
//! - add/edit forms with validation
//! - JSON search, delete and bulk delete
//! - navigation bar and readable-app sidebar in every page context
//!
//! Persistence, routing, permissions, templates and audit storage are
//! collaborators behind traits ([`DataIntegrator`], [`WebIntegrator`],
//! [`PermissionChecker`], [`TemplateRenderer`], [`AuditSink`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use adm_panel::{Panel, PanelConfig};
//!
//! let mut panel = Panel::builder(web, data)
//!     .config(PanelConfig::new().with_prefix("/admin"))
//!     .build();
//! let app = panel.register_app("people", None, None)?;
//! app.register_model(&Persona, None)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod ajax;
pub mod app;
pub mod audit;
pub mod config;
pub mod error;
pub mod forms;
pub mod instance;
pub mod integrator;
pub mod listing;
pub mod model;
pub mod nav;
pub mod panel;
pub mod request;
pub mod template;

pub use app::App;
pub use audit::{AuditEvent, AuditLevel, AuditSink, MemoryAuditLog, TracingAuditSink};
pub use config::{PanelConfig, MIN_INSTANCES_PER_PAGE};
pub use error::{
    status, AuditError, ConfigError, IntegratorError, PanelError, PermissionError, RenderError,
    RequestError,
};
pub use integrator::{
    AllowAll, DataIntegrator, PermissionAction, PermissionChecker, PermissionRequest, Record,
};
pub use listing::{Instance, ListPage, PageWindow, Pagination, Permissions};
pub use model::Model;
pub use nav::{NavBarGenerator, NavBarGenerators, NavBarItem};
pub use panel::{Panel, PanelBuilder};
pub use request::{Handler, JsonResponse, Method, RequestContext, Response, ResponseBody, WebIntegrator};
pub use template::{BasicTemplateRenderer, TemplateRenderer};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
