//! Registration tests: apps, models, routes and the app page.

use adm_form::ValueKind;
use adm_panel::{status, AllowAll, Method, Panel, PanelConfig, TracingAuditSink};
use adm_schema::{FieldDescriptor, ModelDescriptor, RegistrationError};
use adm_test_utils::{MemoryDataIntegrator, Persona, RecordingRouter, RulePermissions, TestPanel, TestRequest, APP};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::Arc;

fn bare_panel() -> (Panel, Arc<RecordingRouter>) {
    let router = Arc::new(RecordingRouter::new());
    let panel = Panel::builder(router.clone(), Arc::new(MemoryDataIntegrator::new()))
        .permissions(Arc::new(AllowAll))
        .audit(Arc::new(TracingAuditSink))
        .build();
    (panel, router)
}

/// Every model route is installed under the panel prefix.
#[test]
fn registration_installs_model_routes() {
    let harness = TestPanel::new();
    let base = "/admin/a/people/Persona";

    let routes = harness.router.routes();
    let expected = vec![
        (Method::Get, "/admin/a/people".to_string()),
        (Method::Get, base.to_string()),
        (Method::Get, format!("{base}/:id/view")),
        (Method::Delete, format!("{base}/:id/view")),
        (Method::Get, format!("{base}/add")),
        (Method::Post, format!("{base}/add")),
        (Method::Get, format!("{base}/:id/edit")),
        (Method::Post, format!("{base}/:id/edit")),
        (Method::Get, format!("{base}/search")),
        (Method::Post, format!("{base}/bulk-delete")),
    ];
    assert_eq!(routes, expected);
}

/// A second registration of the same entity name fails and changes nothing.
#[test]
fn duplicate_model_is_rejected() {
    let mut harness = TestPanel::new();
    let routes_before = harness.router.routes().len();

    let app = harness.panel.app_mut(APP).expect("app registered");
    let err = app.register_model(&Persona, None).unwrap_err();

    assert!(matches!(err, RegistrationError::DuplicateEntity { ref model, .. } if model == "Persona"));
    assert!(err.is_conflict());
    assert_eq!(app.model_count(), 1);
    assert_eq!(harness.router.routes().len(), routes_before);
}

#[test]
fn duplicate_and_unsafe_app_names_are_rejected() {
    let (mut panel, _) = bare_panel();
    panel.register_app("people", None, None).expect("first app");

    let dup = panel.register_app("people", None, None).unwrap_err();
    assert_eq!(dup, RegistrationError::DuplicateApp("people".into()));

    let unsafe_name = panel.register_app("people app", None, None).unwrap_err();
    assert_eq!(unsafe_name, RegistrationError::NotUrlSafe("people app".into()));
    assert_eq!(panel.apps().count(), 1);
}

/// A model with an invalid directive installs nothing.
#[test]
fn failed_registration_leaves_no_trace() {
    let (mut panel, router) = bare_panel();
    let app = panel.register_app("shop", Some("Shop"), None).expect("app");
    let routes_before = router.routes().len();

    let broken = ModelDescriptor::new("Item")
        .field(FieldDescriptor::new("ID", ValueKind::Integer))
        .field(FieldDescriptor::new("Label", ValueKind::Text).directives("listDisplay:maybe"));
    let err = app.register_model(&broken, None).unwrap_err();

    assert!(matches!(err, RegistrationError::Field { ref field, .. } if field == "Label"));
    assert_eq!(app.model_count(), 0);
    assert_eq!(router.routes().len(), routes_before);
}

#[test]
fn app_display_name_defaults_to_humanized_name() {
    let (mut panel, _) = bare_panel();
    let app = panel.register_app("user_accounts", None, None).expect("app");
    assert_eq!(app.display_name(), "User Accounts");
    assert_eq!(app.full_link(), "/admin/a/user_accounts");
}

#[test]
fn custom_prefix_flows_into_links() {
    let harness = TestPanel::builder()
        .config(PanelConfig::new().with_prefix("backoffice/"))
        .build();
    assert_eq!(harness.list_path(), "/backoffice/a/people/Persona");
    assert_eq!(harness.model.full_add_link(), "/backoffice/a/people/Persona/add");
}

#[tokio::test]
async fn app_page_lists_readable_models() {
    let harness = TestPanel::new();
    let response = harness
        .router
        .dispatch("/admin/a/people", TestRequest::get())
        .await
        .expect("app route");

    assert_eq!(response.status, status::OK);
    let context = harness.renderer.last_context().expect("rendered");
    let models = context["models"].as_array().expect("models array");
    assert_eq!(models.len(), 1);
    assert_eq!(models[0]["name"], Value::from("Persona"));
    assert_eq!(harness.audit.len(), 1);
}

/// Models the caller cannot read are hidden from the app page.
#[tokio::test]
async fn app_page_hides_unreadable_models() {
    let harness = TestPanel::builder()
        .permissions(RulePermissions::allow_all().deny_model(adm_panel::PermissionAction::Read))
        .build();
    let response = harness
        .router
        .dispatch("/admin/a/people", TestRequest::get())
        .await
        .expect("app route");

    assert_eq!(response.status, status::OK);
    let context = harness.renderer.last_context().expect("rendered");
    assert_eq!(context["models"], Value::Array(Vec::new()));
}

#[tokio::test]
async fn app_page_requires_app_read() {
    let harness = TestPanel::builder()
        .permissions(RulePermissions::allow_all().deny_app_read())
        .build();
    let response = harness
        .router
        .dispatch("/admin/a/people", TestRequest::get())
        .await
        .expect("app route");

    assert_eq!(response.status, status::FORBIDDEN);
    assert!(response.html_body().unwrap_or_default().starts_with("Code: 403. Error:"));
    assert!(harness.audit.is_empty());
}
