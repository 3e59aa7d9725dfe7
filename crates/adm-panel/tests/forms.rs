//! Add and edit form tests.

use adm_panel::{status, AuditLevel, PermissionAction};
use adm_test_utils::{RulePermissions, TestPanel, TestRequest};
use pretty_assertions::assert_eq;
use serde_json::Value;

fn valid_submission() -> TestRequest {
    TestRequest::post()
        .form("Name", "Grace Hopper")
        .form("Email", "grace@example.com")
        .form("Age", "85")
        .form("Score", "")
        .form("Active", "true")
        .form("Notes", "")
}

fn form_html(harness: &TestPanel) -> String {
    harness
        .renderer
        .last_context()
        .and_then(|c| c["form_html"].as_str().map(str::to_string))
        .expect("form rendered")
}

/// Directive initials appear in a fresh add form; excluded fields do not.
#[tokio::test]
async fn add_form_shows_initials() {
    let harness = TestPanel::new();

    let response = harness.send("/add", TestRequest::get()).await;
    assert_eq!(response.status, status::OK);
    assert_eq!(harness.renderer.last_template().as_deref(), Some("form"));

    let html = form_html(&harness);
    assert!(html.contains("value=\"18\""), "{html}");
    assert!(html.contains("checked"));
    assert!(html.contains("placeholder=\"Full name\""));
    assert!(html.contains("Remarks"));
    assert!(!html.contains("name=\"ID\""));
    assert!(!html.contains("name=\"Token\""));
}

#[tokio::test]
async fn valid_add_creates_and_redirects() {
    let harness = TestPanel::new();

    let response = harness.send("/add", valid_submission()).await;

    assert_eq!(response.status, status::SEE_OTHER);
    assert_eq!(response.location, Some(harness.list_path()));
    let rows = harness.data.rows(harness.model.schema());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["ID"], Value::from(1));
    assert_eq!(rows[0]["Name"], Value::from("Grace Hopper"));
    assert_eq!(rows[0]["Age"], Value::from(85));
    assert_eq!(rows[0]["Score"], Value::Null);

    let events = harness.audit.events_of(AuditLevel::InstanceAdd);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].subject, "1");
}

/// A missing required field re-renders with 422 and never reaches the store.
#[tokio::test]
async fn missing_required_field_is_rejected() {
    let harness = TestPanel::new();

    let response = harness
        .send("/add", TestRequest::post().form("Email", "grace@example.com"))
        .await;

    assert_eq!(response.status, status::UNPROCESSABLE_ENTITY);
    assert_eq!(harness.data.writes(), 0);
    assert!(form_html(&harness).contains("This field is required."));
    let context = harness.renderer.last_context().expect("rendered");
    assert_eq!(context["error_count"], Value::from(1));
}

#[tokio::test]
async fn lower_bound_rejects_negative_age() {
    let harness = TestPanel::new();

    let response = harness
        .send(
            "/add",
            TestRequest::post()
                .form("Name", "Grace Hopper")
                .form("Email", "grace@example.com")
                .form("Age", "-1"),
        )
        .await;

    assert_eq!(response.status, status::UNPROCESSABLE_ENTITY);
    assert_eq!(harness.data.count(harness.model.schema()), 0);
    assert!(form_html(&harness).contains("value=\"-1\""));
}

#[tokio::test]
async fn submitted_values_survive_rerender() {
    let harness = TestPanel::new();

    let response = harness
        .send(
            "/add",
            TestRequest::post().form("Name", "X").form("Email", "not-an-email"),
        )
        .await;

    assert_eq!(response.status, status::UNPROCESSABLE_ENTITY);
    let html = form_html(&harness);
    assert!(html.contains("value=\"X\""));
    assert!(html.contains("value=\"not-an-email\""));
    assert!(html.contains("is-invalid"));
}

/// Entity-level validation runs after the widgets pass.
#[tokio::test]
async fn validation_function_blocks_reserved_name() {
    let harness = TestPanel::new();

    let response = harness
        .send(
            "/add",
            TestRequest::post().form("Name", "admin").form("Email", "root@example.com"),
        )
        .await;

    assert_eq!(response.status, status::UNPROCESSABLE_ENTITY);
    assert!(form_html(&harness).contains("is reserved"));
    assert_eq!(harness.data.writes(), 0);
}

#[tokio::test]
async fn add_requires_model_add() {
    let harness = TestPanel::builder()
        .permissions(RulePermissions::allow_all().deny_model(PermissionAction::Add))
        .build();

    assert_eq!(harness.send("/add", TestRequest::get()).await.status, status::FORBIDDEN);
    assert_eq!(harness.send("/add", valid_submission()).await.status, status::FORBIDDEN);
    assert_eq!(harness.data.writes(), 0);
}

/// The record is written before the audit fails; the client still sees 500.
#[tokio::test]
async fn audit_failure_after_add_is_a_server_error() {
    let harness = TestPanel::builder().failing_audit().build();

    let response = harness.send("/add", valid_submission()).await;

    assert_eq!(response.status, status::INTERNAL_SERVER_ERROR);
    assert_eq!(harness.data.count(harness.model.schema()), 1);
}

#[tokio::test]
async fn edit_form_prefills_stored_values() {
    let harness = TestPanel::new();
    harness.seed(1);

    let response = harness.send("/1/edit", TestRequest::get()).await;

    assert_eq!(response.status, status::OK);
    let html = form_html(&harness);
    assert!(html.contains("value=\"Persona 1\""));
    assert!(html.contains("value=\"21\""));
    assert!(!html.contains("value=\"18\""));
}

#[tokio::test]
async fn edit_updates_and_redirects() {
    let harness = TestPanel::new();
    harness.seed(2);

    let response = harness
        .send(
            "/2/edit",
            TestRequest::post()
                .form("Name", "Renamed")
                .form("Email", "renamed@example.com")
                .form("Active", "on"),
        )
        .await;

    assert_eq!(response.status, status::SEE_OTHER);
    assert_eq!(response.location, Some(harness.list_path()));
    let rows = harness.data.rows(harness.model.schema());
    assert_eq!(rows[1]["Name"], Value::from("Renamed"));
    assert_eq!(rows[1]["Active"], Value::from(true));
    assert_eq!(rows[0]["Name"], Value::from("Persona 1"));

    let events = harness.audit.events_of(AuditLevel::InstanceEdit);
    assert_eq!(events[0].subject, "2");
}

#[tokio::test]
async fn edit_errors() {
    let harness = TestPanel::builder()
        .permissions(RulePermissions::allow_all().deny_instance(PermissionAction::Update, 1i64))
        .build();
    harness.seed(2);

    assert_eq!(harness.send("/1/edit", TestRequest::get()).await.status, status::FORBIDDEN);
    assert_eq!(harness.send("/7/edit", TestRequest::get()).await.status, status::NOT_FOUND);
    assert_eq!(
        harness.send("/1/edit", valid_submission()).await.status,
        status::FORBIDDEN
    );
    assert_eq!(harness.data.writes(), 0);
}
