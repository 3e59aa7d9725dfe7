//! Listing and instance view tests.

use adm_form::FieldValue;
use adm_panel::{status, AuditLevel, PanelConfig, PermissionAction};
use adm_test_utils::{RulePermissions, TestPanel, TestRequest};
use pretty_assertions::assert_eq;
use serde_json::Value;

fn ids(page: &adm_panel::ListPage) -> Vec<FieldValue> {
    page.instances.iter().map(|i| i.id.clone()).collect()
}

/// 25 rows at 10 per page give 3 pages; the last one holds 5.
#[tokio::test]
async fn pages_round_up() {
    let harness = TestPanel::new();
    harness.seed(25);

    let page = harness
        .model
        .list_page(&TestRequest::get().query("page", 3))
        .await
        .expect("list page");

    assert_eq!(page.total_count, 25);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.current_page, 3);
    assert_eq!(page.instances.len(), 5);
    assert_eq!(page.instances[0].id, FieldValue::Integer(21));
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
    let harness = TestPanel::new();
    harness.seed(25);

    let page = harness
        .model
        .list_page(&TestRequest::get().query("page", 4))
        .await
        .expect("list page");

    assert!(page.instances.is_empty());
    assert_eq!(page.total_count, 25);
    assert_eq!(page.total_pages, 3);
}

/// Page sizes below the floor are raised to 10; zero falls back to the default.
#[tokio::test]
async fn page_size_is_floored() {
    let harness = TestPanel::builder()
        .config(PanelConfig::new().with_default_instances_per_page(20))
        .build();
    harness.seed(30);

    let small = harness
        .model
        .list_page(&TestRequest::get().query("perPage", 5))
        .await
        .expect("list page");
    assert_eq!(small.per_page, 10);
    assert_eq!(small.instances.len(), 10);

    let zero = harness
        .model
        .list_page(&TestRequest::get().query("perPage", 0))
        .await
        .expect("list page");
    assert_eq!(zero.per_page, 20);
    assert_eq!(zero.total_pages, 2);
}

/// An instance the caller cannot read is neither listed nor counted.
#[tokio::test]
async fn unreadable_instances_are_filtered_before_counting() {
    let harness = TestPanel::builder()
        .permissions(RulePermissions::allow_all().deny_instance(PermissionAction::Read, 2i64))
        .build();
    harness.seed(11);

    let page = harness.model.list_page(&TestRequest::get()).await.expect("list page");

    assert_eq!(page.total_count, 10);
    assert_eq!(page.total_pages, 1);
    assert!(!ids(&page).contains(&FieldValue::Integer(2)));
}

#[tokio::test]
async fn row_permissions_reflect_the_checker() {
    let harness = TestPanel::builder()
        .permissions(
            RulePermissions::allow_all()
                .deny_instance(PermissionAction::Update, 1i64)
                .deny_instance(PermissionAction::Delete, 2i64),
        )
        .build();
    harness.seed(2);

    let page = harness.model.list_page(&TestRequest::get()).await.expect("list page");
    let first = &page.instances[0].permissions;
    let second = &page.instances[1].permissions;
    assert!(first.read && !first.update && first.delete);
    assert!(second.read && second.update && !second.delete);
}

/// Only list-fetch fields come back from the store.
#[tokio::test]
async fn listing_fetches_projected_fields() {
    let harness = TestPanel::new();
    harness.seed(1);

    let page = harness.model.list_page(&TestRequest::get()).await.expect("list page");
    let mut keys: Vec<&str> = page.instances[0].data.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["Active", "Age", "Email", "ID", "Name"]);
}

#[tokio::test]
async fn search_term_filters_rows() {
    let harness = TestPanel::new();
    harness.seed(12);

    let page = harness
        .model
        .list_page(&TestRequest::get().query("search", "persona 3"))
        .await
        .expect("list page");

    assert_eq!(ids(&page), vec![FieldValue::Integer(3)]);
    assert_eq!(page.search.as_deref(), Some("persona 3"));
}

/// Without model-read permission the store is never touched.
#[tokio::test]
async fn model_read_denial_skips_the_store() {
    let harness = TestPanel::builder()
        .permissions(RulePermissions::allow_all().deny_model(PermissionAction::Read))
        .build();
    harness.seed(3);

    let response = harness.send("", TestRequest::get()).await;

    assert_eq!(response.status, status::FORBIDDEN);
    assert_eq!(harness.data.reads(), 0);
    assert!(harness.audit.is_empty());
}

#[tokio::test]
async fn list_view_renders_and_audits() {
    let harness = TestPanel::new();
    harness.seed(3);

    let response = harness.send("", TestRequest::get()).await;
    assert_eq!(response.status, status::OK);
    assert_eq!(harness.renderer.last_template().as_deref(), Some("model"));

    let context = harness.renderer.last_context().expect("rendered");
    assert_eq!(context["page"]["total_count"], Value::from(3));
    let columns: Vec<&str> = context["columns"]
        .as_array()
        .expect("columns")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(columns, vec!["ID", "Name", "Email", "Age", "Active"]);

    let events = harness.audit.events_of(AuditLevel::ListView);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].subject, "people | Persona");
}

/// A failing audit sink fails the request even though data was read.
#[tokio::test]
async fn audit_failure_is_a_server_error() {
    let harness = TestPanel::builder().failing_audit().build();
    harness.seed(2);

    let response = harness.send("", TestRequest::get()).await;

    assert_eq!(response.status, status::INTERNAL_SERVER_ERROR);
    assert!(harness.data.reads() > 0);
}

#[tokio::test]
async fn store_failure_is_a_server_error() {
    let harness = TestPanel::new();
    harness.data.set_failing(true);

    let response = harness.send("", TestRequest::get()).await;
    assert_eq!(response.status, status::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn instance_view_shows_view_fields() {
    let harness = TestPanel::new();
    harness.seed(2);

    let response = harness.send("/2/view", TestRequest::get()).await;
    assert_eq!(response.status, status::OK);

    let context = harness.renderer.last_context().expect("rendered");
    let fields = context["fields"].as_array().expect("fields");
    let name = fields.iter().find(|f| f["name"] == "Name").expect("Name shown");
    assert_eq!(name["value"], Value::from("Persona 2"));
    assert!(fields.iter().all(|f| f["name"] != "Token"));
    assert_eq!(context["edit_link"], Value::from("/admin/a/people/Persona/2/edit"));

    let events = harness.audit.events_of(AuditLevel::InstanceView);
    assert_eq!(events[0].subject, "2");
}

#[tokio::test]
async fn instance_view_errors() {
    let harness = TestPanel::builder()
        .permissions(RulePermissions::allow_all().deny_instance(PermissionAction::Read, 1i64))
        .build();
    harness.seed(1);

    assert_eq!(harness.send("/1/view", TestRequest::get()).await.status, status::FORBIDDEN);
    assert_eq!(harness.send("/99/view", TestRequest::get()).await.status, status::NOT_FOUND);
    assert_eq!(harness.send("/abc/view", TestRequest::get()).await.status, status::BAD_REQUEST);
}
