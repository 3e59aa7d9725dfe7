//! Sample entity and a wired-up panel harness

use crate::memory::MemoryDataIntegrator;
use crate::permissions::RulePermissions;
use crate::request::{RecordingRouter, TestRequest};
use adm_form::{validation_fn, ValidationFn, ValueKind};
use adm_panel::{
    AuditError, AuditEvent, AuditSink, MemoryAuditLog, Model, Panel, PanelConfig, Record,
    RenderError, RequestContext, Response, TemplateRenderer,
};
use adm_schema::{AdminModel, FieldDescriptor, ModelDescriptor};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

/// App every harness registers
pub const APP: &str = "people";

/// Person record exercising every field kind and most directives
#[derive(Debug, Clone, Copy, Default)]
pub struct Persona;

impl AdminModel for Persona {
    fn descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::new("Persona")
            .field(FieldDescriptor::new("ID", ValueKind::Integer).directives("addForm:exclude;editForm:exclude"))
            .field(
                FieldDescriptor::new("Name", ValueKind::Text)
                    .directives("required;minLength:2;maxLength:64;placeholder:Full name"),
            )
            .field(FieldDescriptor::new("Email", ValueKind::Text).directives("required;regex:^[^@ ]+@[^@ ]+$"))
            .field(
                FieldDescriptor::new("Age", ValueKind::Integer)
                    .optional()
                    .directives("min:0;max:150;initial:18"),
            )
            .field(
                FieldDescriptor::new("Score", ValueKind::Float)
                    .optional()
                    .directives("listDisplay:exclude;min:0"),
            )
            .field(FieldDescriptor::new("Active", ValueKind::Boolean).directives("initial:true;search:exclude"))
            .field(FieldDescriptor::new("Token", ValueKind::Identifier).directives(
                "listDisplay:exclude;listFetch:exclude;search:exclude;view:exclude;addForm:exclude;editForm:exclude",
            ))
            .field(
                FieldDescriptor::new("Notes", ValueKind::Text)
                    .optional()
                    .directives("displayName:Remarks;listDisplay:exclude"),
            )
    }

    fn validation_functions(&self) -> Vec<ValidationFn> {
        vec![validation_fn(|values| {
            Ok(match values.get("Name") {
                Some(name) if name.eq_ignore_ascii_case("admin") => vec!["name 'admin' is reserved".to_string()],
                _ => Vec::new(),
            })
        })]
    }
}

/// Stored persona row
#[must_use]
pub fn persona_record(id: i64) -> Record {
    let value = json!({
        "ID": id,
        "Name": format!("Persona {id}"),
        "Email": format!("persona{id}@example.com"),
        "Age": 20 + id,
        "Score": 1.5,
        "Active": id % 2 == 0,
        "Token": uuid::Uuid::new_v4().to_string(),
        "Notes": null,
    });
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

/// Renderer that hands back its context as JSON and remembers the last call
#[derive(Debug, Default)]
pub struct CapturingRenderer {
    last: Mutex<Option<(String, Value)>>,
}

impl CapturingRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Template name of the last render
    #[must_use]
    pub fn last_template(&self) -> Option<String> {
        self.last.lock().as_ref().map(|(t, _)| t.clone())
    }

    /// Context of the last render
    #[must_use]
    pub fn last_context(&self) -> Option<Value> {
        self.last.lock().as_ref().map(|(_, c)| c.clone())
    }
}

impl TemplateRenderer for CapturingRenderer {
    fn render(&self, template: &str, context: &Value) -> Result<String, RenderError> {
        *self.last.lock() = Some((template.to_string(), context.clone()));
        Ok(serde_json::to_string(context)?)
    }
}

/// Audit sink that rejects every event
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingAuditSink;

#[async_trait]
impl AuditSink for FailingAuditSink {
    async fn record(&self, _ctx: &dyn RequestContext, _event: AuditEvent) -> Result<(), AuditError> {
        Err(AuditError("audit store offline".into()))
    }
}

/// Builder for [`TestPanel`]
#[derive(Debug, Default)]
pub struct TestPanelBuilder {
    config: PanelConfig,
    permissions: Option<RulePermissions>,
    failing_audit: bool,
}

impl TestPanelBuilder {
    #[must_use]
    pub fn config(mut self, config: PanelConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn permissions(mut self, permissions: RulePermissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Swap the audit log for [`FailingAuditSink`]
    #[must_use]
    pub fn failing_audit(mut self) -> Self {
        self.failing_audit = true;
        self
    }

    /// Build the panel and register [`Persona`] under [`APP`]
    ///
    /// # Panics
    /// If registration fails.
    #[must_use]
    pub fn build(self) -> TestPanel {
        let router = Arc::new(RecordingRouter::new());
        let data = Arc::new(MemoryDataIntegrator::new());
        let permissions = Arc::new(self.permissions.unwrap_or_default());
        let audit = Arc::new(MemoryAuditLog::new());
        let renderer = Arc::new(CapturingRenderer::new());

        let sink: Arc<dyn AuditSink> = if self.failing_audit {
            Arc::new(FailingAuditSink)
        } else {
            audit.clone()
        };
        let mut panel = Panel::builder(router.clone(), data.clone())
            .config(self.config)
            .permissions(permissions.clone())
            .audit(sink)
            .renderer(renderer.clone())
            .build();
        let model = panel
            .register_app(APP, None, None)
            .expect("register app")
            .register_model(&Persona, None)
            .expect("register persona");

        TestPanel {
            panel,
            router,
            data,
            permissions,
            audit,
            renderer,
            model,
        }
    }
}

/// Panel with in-memory collaborators and [`Persona`] registered
#[derive(Debug)]
pub struct TestPanel {
    pub panel: Panel,
    pub router: Arc<RecordingRouter>,
    pub data: Arc<MemoryDataIntegrator>,
    pub permissions: Arc<RulePermissions>,
    pub audit: Arc<MemoryAuditLog>,
    pub renderer: Arc<CapturingRenderer>,
    pub model: Arc<Model>,
}

impl TestPanel {
    #[must_use]
    pub fn builder() -> TestPanelBuilder {
        TestPanelBuilder::default()
    }

    /// Allow-all harness with default config
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Insert personas with ids `1..=count`
    pub fn seed(&self, count: i64) {
        for id in 1..=count {
            self.data.insert(self.model.schema(), persona_record(id));
        }
    }

    /// Model list path, e.g. `/admin/a/people/Persona`
    #[must_use]
    pub fn list_path(&self) -> String {
        self.model.full_link()
    }

    /// Dispatch `request` to `path` relative to the model list path
    ///
    /// # Panics
    /// If no route matches.
    pub async fn send(&self, suffix: &str, request: TestRequest) -> Response {
        let path = format!("{}{suffix}", self.list_path());
        self.router
            .dispatch(&path, request)
            .await
            .unwrap_or_else(|| panic!("no route for {path}"))
    }
}

impl Default for TestPanel {
    fn default() -> Self {
        Self::new()
    }
}
