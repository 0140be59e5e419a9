//! HTTP endpoint integration tests
//!
//! Covers:
//! - laboratory and computer management over HTTP
//! - legacy request shapes (wrapped `data`, string specs, integer codes)
//! - the status change, report and resolution flow end to end
//! - summary emails with a recording notifier

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

mod common;
use common::{
    create_test_db, delete, get, post, send, test_app, test_app_with_notifier, token,
    RecordingNotifier,
};

use labtrack::services::security::Role;

async fn add_lab(app: &axum::Router, admin: &str, name: &str) -> i64 {
    let (status, body) = post(
        app,
        "/add_laboratory",
        admin,
        json!({"data": {"lab_name": name, "location": "Room 101"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn add_computer(app: &axum::Router, admin: &str, lab_id: i64, name: &str) -> String {
    let (status, body) = post(
        app,
        "/computer",
        admin,
        json!({"data": {
            "pc_name": name,
            "lab_id": lab_id.to_string(),
            "specs": {
                "monitor": {"name": "Dell P2419H", "serial": "S1"},
                "mouse": "M-77"
            },
            "other_parts": [{"name": "Webcam", "serial": "W1"}]
        }}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    body["computer_id"].as_str().unwrap().to_string()
}

fn find_part<'a>(statuses: &'a Value, computer_id: &str, part: &str) -> &'a Value {
    statuses
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["computer_id"] == computer_id && p["part"] == part)
        .unwrap_or_else(|| panic!("part {} not listed", part))
}

// ----------------------------------------------------------------------------
// Laboratories
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_lab_lifecycle() {
    let app = test_app(create_test_db().await);
    let admin = token(Role::Admin);

    let lab_id = add_lab(&app, &admin, "Computer Lab 1").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/edit_lab/{}", lab_id),
        Some(&admin),
        Some(json!({"lab_name": "Computer Lab 2", "location": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Computer Lab 2");
    assert!(body["location"].is_null());

    let (_, labs) = get(&app, "/get_laboratory", &admin).await;
    assert_eq!(labs[0]["lab_name"], "Computer Lab 2");
    assert_eq!(labs[0]["lab_id"], lab_id);
    assert_eq!(labs[0]["pc_count"], 0);

    let (status, _) = delete(&app, &format!("/delete_lab/{}", lab_id), &admin).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = delete(&app, &format!("/delete_lab/{}", lab_id), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lab_validation_and_conflict() {
    let app = test_app(create_test_db().await);
    let admin = token(Role::Admin);
    add_lab(&app, &admin, "Lab 1").await;

    let (status, body) = post(&app, "/add_laboratory", &admin, json!({"data": {"lab_name": ""}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, _) = post(&app, "/add_laboratory", &admin, json!({"lab_name": "Lab 1"})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = post(&app, "/add_laboratory", &admin, json!({"nothing": true})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

// ----------------------------------------------------------------------------
// Computers
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_register_and_list_computer() {
    let app = test_app(create_test_db().await);
    let admin = token(Role::Admin);
    let lab_id = add_lab(&app, &admin, "Lab 1").await;
    let pc = add_computer(&app, &admin, lab_id, "PC-01").await;

    let (status, computers) = get(&app, "/get_computers", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(computers[0]["id"], pc.as_str());
    assert_eq!(computers[0]["pc_name"], "PC-01");
    assert_eq!(computers[0]["lab_name"], "Lab 1");
    // Legacy string entries become the serial, named after the category
    assert_eq!(computers[0]["specs"]["mouse"]["name"], "mouse");
    assert_eq!(computers[0]["specs"]["mouse"]["serial"], "M-77");

    let (_, statuses) = get(&app, "/get_computer_statuses", &admin).await;
    assert_eq!(statuses.as_array().unwrap().len(), 3);
    let monitor = find_part(&statuses, &pc, "monitor");
    assert_eq!(monitor["status"], 1);
    assert_eq!(monitor["status_label"], "operational");
    assert_eq!(monitor["type"], "standard");

    let (_, others) = get(&app, "/get_other_part_status", &admin).await;
    assert_eq!(others.as_array().unwrap().len(), 1);
    assert_eq!(others[0]["name"], "Webcam");
    assert_eq!(others[0]["category"], "other");

    let (_, labs) = get(&app, "/get_laboratory", &admin).await;
    assert_eq!(labs[0]["pc_count"], 1);
}

#[tokio::test]
async fn test_register_computer_legacy_string_specs() {
    let app = test_app(create_test_db().await);
    let admin = token(Role::Admin);
    let lab_id = add_lab(&app, &admin, "Lab 1").await;

    let (status, body) = post(
        &app,
        "/computer",
        &admin,
        json!({"data": {
            "pc_name": "PC-02",
            "lab_id": lab_id,
            "specs": "{\"keyboard\": {\"name\": \"K120\", \"serial\": \"K1\"}}",
            "other_parts": "not a list"
        }}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["parts"].as_array().unwrap().len(), 1);
    assert_eq!(body["parts"][0]["name"], "K120");
}

#[tokio::test]
async fn test_register_computer_errors() {
    let app = test_app(create_test_db().await);
    let admin = token(Role::Admin);
    let lab_id = add_lab(&app, &admin, "Lab 1").await;
    add_computer(&app, &admin, lab_id, "PC-01").await;

    let (status, _) = post(
        &app,
        "/computer",
        &admin,
        json!({"data": {"pc_name": "PC-01", "lab_id": lab_id, "specs": {}}}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = post(
        &app,
        "/computer",
        &admin,
        json!({"data": {"pc_name": "PC-09", "lab_id": 999}}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(
        &app,
        "/computer",
        &admin,
        json!({"data": {"pc_name": "PC-10", "lab_id": lab_id, "specs": [1, 2]}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bulk_register_reports_skipped_names() {
    let app = test_app(create_test_db().await);
    let admin = token(Role::Admin);
    let lab_id = add_lab(&app, &admin, "Lab 1").await;
    add_computer(&app, &admin, lab_id, "PC-01").await;

    let (status, body) = post(
        &app,
        "/computer/bulk",
        &admin,
        json!({"data": [
            {"pc_name": "PC-01", "lab_id": lab_id},
            {"pc_name": "PC-02", "lab_id": lab_id, "specs": {"monitor": {"name": "Dell"}}}
        ]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["inserted"].as_array().unwrap().len(), 1);
    assert_eq!(body["inserted"][0]["pc_name"], "PC-02");
    assert_eq!(body["skipped_duplicates"], json!(["PC-01"]));

    let (status, _) = post(&app, "/computer/bulk", &admin, json!({"data": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_edit_and_delete_computer() {
    let app = test_app(create_test_db().await);
    let admin = token(Role::Admin);
    let lab_id = add_lab(&app, &admin, "Lab 1").await;
    let pc = add_computer(&app, &admin, lab_id, "PC-01").await;

    let (status, _) = post(
        &app,
        &format!("/update_edit_data/{}", pc),
        &admin,
        json!({
            "pc_name": "PC-01B",
            "specs": {"monitor": {"name": "Samsung", "serial": "S9"}},
            "other_parts": []
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, statuses) = get(&app, "/get_computer_statuses", &admin).await;
    let monitor = find_part(&statuses, &pc, "monitor");
    assert_eq!(monitor["name"], "Samsung");
    assert_eq!(monitor["serial_number"], "S9");
    let (_, others) = get(&app, "/get_other_part_status", &admin).await;
    assert!(others.as_array().unwrap().is_empty());

    let (status, _) = delete(&app, &format!("/delete_computer/{}", pc), &admin).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(
        &app,
        &format!("/update_edit_data/{}", pc),
        &admin,
        json!({"pc_name": "again"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ----------------------------------------------------------------------------
// Status, reports and resolutions
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_status_report_resolution_flow() {
    let app = test_app(create_test_db().await);
    let admin = token(Role::Admin);
    let technician = token(Role::Technician);
    let lab_id = add_lab(&app, &admin, "Lab 1").await;
    let pc = add_computer(&app, &admin, lab_id, "PC-01").await;

    // Integer computer id and legacy status code
    let (status, body) = post(
        &app,
        "/update_computer_status",
        &technician,
        json!({"com_id": pc.parse::<i64>().unwrap(), "part": "monitor", "status": 3, "serial": "S2"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["part"]["status"], 3);
    assert_eq!(body["report"]["state"], "created");
    let report_id = body["report"]["detail"].as_i64().unwrap();

    let (_, reports) = get(&app, "/get_admin_computer_reports", &admin).await;
    assert_eq!(reports.as_array().unwrap().len(), 1);
    assert_eq!(
        reports[0]["issue_description"],
        "Monitor Serial updated to S2. Monitor is damaged"
    );
    assert_eq!(reports[0]["submitted_by"], "technician@lab.edu");
    assert_eq!(reports[0]["pc_name"], "PC-01");
    assert_eq!(reports[0]["lab_name"], "Lab 1");
    assert_eq!(reports[0]["status"], "pending");

    let (status, body) = post(
        &app,
        "/submit_technician_report",
        &technician,
        json!({"report_id": report_id.to_string(), "action_taken": "Replaced panel", "status": "operational"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["report_status"], "resolved");
    assert_eq!(body["part_sync"]["state"], "updated");

    let (_, reports) = get(&app, "/get_admin_computer_reports", &admin).await;
    assert_eq!(reports.as_array().unwrap().len(), 1);
    assert_eq!(reports[0]["status"], "resolved");

    let (_, statuses) = get(&app, "/get_computer_statuses", &admin).await;
    assert_eq!(find_part(&statuses, &pc, "monitor")["status"], 1);

    let (_, logs) = get(&app, "/get_technician_logs", &admin).await;
    assert_eq!(logs[0]["report_id"], report_id);
    assert_eq!(logs[0]["technician_name"], "technician@lab.edu");
    assert_eq!(logs[0]["status"], "operational");
    assert!(logs[0]["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_status_is_bad_request() {
    let app = test_app(create_test_db().await);
    let admin = token(Role::Admin);
    let lab_id = add_lab(&app, &admin, "Lab 1").await;
    let pc = add_computer(&app, &admin, lab_id, "PC-01").await;

    let (status, body) = post(
        &app,
        "/update_computer_status",
        &admin,
        json!({"com_id": pc, "part": "monitor", "status": "on fire"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("on fire"));

    let (status, _) = post(
        &app,
        "/update_computer_status",
        &admin,
        json!({"com_id": "00000000", "part": "monitor", "status": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_status_update() {
    let app = test_app(create_test_db().await);
    let admin = token(Role::Admin);
    let lab_id = add_lab(&app, &admin, "Lab 1").await;
    let pc = add_computer(&app, &admin, lab_id, "PC-01").await;

    let mut statuses = serde_json::Map::new();
    statuses.insert(
        pc.clone(),
        json!({
            "monitor": {"status": "missing"},
            "Webcam": {"status": 2, "notes": "No picture"}
        }),
    );
    let (status, body) = post(
        &app,
        "/update_computer_status_bulk",
        &admin,
        json!({ "statuses": statuses }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["changes"].as_array().unwrap().len(), 2);
    assert_eq!(body["failed_reports"], 0);

    let (_, reports) = get(&app, "/get_admin_computer_reports", &admin).await;
    let descriptions: Vec<_> = reports
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["issue_description"].as_str().unwrap().to_string())
        .collect();
    assert!(descriptions.contains(&"Monitor is missing".to_string()));
    assert!(descriptions.contains(&"Webcam is not operational. No picture".to_string()));

    let (status, _) = post(
        &app,
        "/update_computer_status_bulk",
        &admin,
        json!({"statuses": {}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_manual_report_and_delete_all() {
    let app = test_app(create_test_db().await);
    let admin = token(Role::Admin);
    let dean = token(Role::Dean);
    let lab_id = add_lab(&app, &admin, "Lab 1").await;
    let pc = add_computer(&app, &admin, lab_id, "PC-01").await;

    let (status, body) = post(
        &app,
        "/add_report",
        &dean,
        json!({"data": {"computer_id": pc, "item": "mouse", "notes": "Scroll wheel stuck"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let report_id = body["id"].as_i64().unwrap();

    let (_, reports) = get(&app, "/get_admin_computer_reports", &admin).await;
    assert_eq!(reports[0]["id"], report_id);
    assert_eq!(reports[0]["part_name"], "mouse");
    assert_eq!(reports[0]["submitted_by"], "dean@lab.edu");

    let (status, _) = post(
        &app,
        "/add_report",
        &dean,
        json!({"computer_id": "00000000", "part_name": "mouse", "issue_description": "x"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(&app, "/delete_report/abc", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = delete(&app, "/delete_report/ALL", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);

    let (_, reports) = get(&app, "/get_admin_computer_reports", &admin).await;
    assert!(reports.as_array().unwrap().is_empty());

    let (status, _) = delete(&app, &format!("/delete_report/{}", report_id), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ----------------------------------------------------------------------------
// Summary emails
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_report_email_is_sent_to_requested_address() {
    let notifier = Arc::new(RecordingNotifier::default());
    let app = test_app_with_notifier(create_test_db().await, notifier.clone());
    let itsd = token(Role::Itsd);

    let (status, body) = post(
        &app,
        "/send_report_email",
        &itsd,
        json!({
            "title": "Weekly",
            "summary": [{"part_name": "monitor", "status": "pending"}],
            "position": "ITSD",
            "userEmail": "dean@lab.edu",
            "userName": "Dean"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], true);
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Lab Report Summary: Weekly");
    assert_eq!(sent[0].recipients, vec!["dean@lab.edu".to_string()]);
    assert_eq!(sent[0].template, "report.html");
}

#[tokio::test]
async fn test_technician_email_defaults_to_caller() {
    let notifier = Arc::new(RecordingNotifier::default());
    let app = test_app_with_notifier(create_test_db().await, notifier.clone());
    let technician = token(Role::Technician);

    let (status, body) = post(
        &app,
        "/technician_send_report_email",
        &technician,
        json!({"data": {"title": "Fixes", "issue_report": [{"action_taken": "Reseated RAM"}]}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], true);
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent[0].subject, "Technician Report: Fixes");
    assert_eq!(sent[0].recipients, vec!["technician@lab.edu".to_string()]);
    assert_eq!(sent[0].template, "technician.html");
}

#[tokio::test]
async fn test_email_errors() {
    let notifier = Arc::new(RecordingNotifier {
        fail_with: Some("SMTP down".to_string()),
        ..Default::default()
    });
    let app = test_app_with_notifier(create_test_db().await, notifier);
    let admin = token(Role::Admin);

    let (status, _) = post(
        &app,
        "/send_report_email",
        &admin,
        json!({"title": "Empty", "summary": []}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(
        &app,
        "/send_report_email",
        &admin,
        json!({"title": "Weekly", "summary": [{"id": 1}]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], false);
    assert_eq!(body["error"], "SMTP down");

    // Without a configured provider nothing is sent
    let app = test_app(create_test_db().await);
    let (status, body) = post(
        &app,
        "/technician_send_report_email",
        &admin,
        json!({"data": {"title": "t", "issue_report": [{"id": 1}]}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], false);
}
