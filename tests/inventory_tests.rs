//! Laboratory and computer inventory integration tests
//!
//! Covers:
//! - lab CRUD and computer counts
//! - duplicate names within a lab
//! - bulk registration skipping duplicates
//! - editing a computer (rename, spec upsert, custom part replacement)
//! - deleting a lab removes its computers but keeps their reports

mod common;
use common::{create_test_db, custom, seed_computer, seed_lab, spec};

use labtrack::error::AppError;
use labtrack::models::PartKind;
use labtrack::services::computers::{self, ComputerEdit, NewComputer};
use labtrack::services::labs;
use labtrack::services::parts;
use labtrack::services::reports::{self, NewReport};

fn new_computer(name: &str, lab_id: i64) -> NewComputer {
    NewComputer {
        name: name.to_string(),
        lab_id,
        specs: vec![spec("monitor", "Dell", "S1")],
        other_parts: vec![],
    }
}

// ----------------------------------------------------------------------------
// Laboratories
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_labs_list_with_computer_counts() {
    let db = create_test_db().await;
    let busy = seed_lab(&db, "Lab A").await;
    seed_lab(&db, "Lab B").await;
    seed_computer(&db, busy, "PC-01").await;
    seed_computer(&db, busy, "PC-02").await;

    let listed = labs::list_labs(&db).await.unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "Lab A");
    assert_eq!(listed[0].pc_count, 2);
    assert_eq!(listed[1].name, "Lab B");
    assert_eq!(listed[1].pc_count, 0);
}

#[tokio::test]
async fn test_duplicate_lab_name_conflicts() {
    let db = create_test_db().await;
    seed_lab(&db, "Lab A").await;
    let other = seed_lab(&db, "Lab B").await;

    let created = labs::create_lab(&db, "  Lab A ", None).await;
    assert!(matches!(created, Err(AppError::Conflict(_))));

    let renamed = labs::update_lab(&db, other, "Lab A", None).await;
    assert!(matches!(renamed, Err(AppError::Conflict(_))));

    let blank = labs::create_lab(&db, "   ", None).await;
    assert!(matches!(blank, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_update_missing_lab_is_not_found() {
    let db = create_test_db().await;

    let result = labs::update_lab(&db, 99, "Lab Z", None).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = labs::delete_lab(&db, 99).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_lab_keeps_reports() {
    let db = create_test_db().await;
    let lab = seed_lab(&db, "Lab A").await;
    let pc = seed_computer(&db, lab, "PC-01").await;
    reports::create_report(
        &db,
        NewReport::pending(pc.as_str(), "monitor", "Flickers", "System"),
    )
    .await
    .unwrap();

    labs::delete_lab(&db, lab).await.unwrap();

    assert!(labs::list_labs(&db).await.unwrap().is_empty());
    assert!(computers::list_computers(&db).await.unwrap().is_empty());
    assert!(parts::list_parts(&db, None, None).await.unwrap().is_empty());

    let listed = reports::list_reports_with_context(&db).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].pc_name, "Unknown");
}

// ----------------------------------------------------------------------------
// Computers
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_register_computer_creates_parts() {
    let db = create_test_db().await;
    let lab = seed_lab(&db, "Lab A").await;

    let registered = computers::register_computer(
        &db,
        NewComputer {
            name: "PC-01".to_string(),
            lab_id: lab,
            specs: vec![spec("monitor", "Dell", "S1"), spec("mouse", "HP", "M1")],
            other_parts: vec![custom("Webcam", None)],
        },
    )
    .await
    .unwrap();

    assert_eq!(registered.id.len(), 8);
    assert_eq!(registered.parts.len(), 3);

    let listed = computers::list_computers(&db).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].lab_name.as_deref(), Some("Lab A"));
    assert_eq!(listed[0].specs["monitor"]["serial"], "S1");
    assert_eq!(listed[0].other_parts[0]["name"], "Webcam");
}

#[tokio::test]
async fn test_register_into_missing_lab_is_not_found() {
    let db = create_test_db().await;

    let result = computers::register_computer(&db, new_computer("PC-01", 7)).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_duplicate_computer_name_in_lab_conflicts() {
    let db = create_test_db().await;
    let lab = seed_lab(&db, "Lab A").await;
    let other_lab = seed_lab(&db, "Lab B").await;
    seed_computer(&db, lab, "PC-01").await;

    let duplicate = computers::register_computer(&db, new_computer("PC-01", lab)).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // Same name in another lab is fine
    computers::register_computer(&db, new_computer("PC-01", other_lab))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bulk_registration_skips_duplicates() {
    let db = create_test_db().await;
    let lab = seed_lab(&db, "Lab A").await;
    seed_computer(&db, lab, "PC-01").await;

    let result = computers::register_many(
        &db,
        vec![
            new_computer("PC-01", lab),
            new_computer("PC-02", lab),
            new_computer("PC-02", lab),
            new_computer("PC-03", lab),
        ],
    )
    .await
    .unwrap();

    let inserted: Vec<_> = result.inserted.iter().map(|c| c.pc_name.as_str()).collect();
    assert_eq!(inserted, vec!["PC-02", "PC-03"]);
    assert_eq!(result.skipped_duplicates, vec!["PC-01", "PC-02"]);
    assert_eq!(computers::list_computers(&db).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_update_computer_replaces_custom_parts() {
    let db = create_test_db().await;
    let lab = seed_lab(&db, "Lab A").await;
    let pc = seed_computer(&db, lab, "PC-01").await;
    parts::replace_custom_parts(&db, &pc, &[custom("Webcam", None)])
        .await
        .unwrap();

    computers::update_computer(
        &db,
        &pc,
        ComputerEdit {
            name: Some("PC-01A".to_string()),
            specs: vec![spec("monitor", "Samsung", "S7"), spec("gpu", "GT 1030", "G1")],
            other_parts: Some(vec![custom("Headset", Some("H1"))]),
        },
    )
    .await
    .unwrap();

    let listed = computers::list_computers(&db).await.unwrap();
    assert_eq!(listed[0].name, "PC-01A");

    let monitor = parts::get_part(&db, &pc, "monitor").await.unwrap().unwrap();
    assert_eq!(monitor.name, "Samsung");
    assert_eq!(monitor.serial_number.as_deref(), Some("S7"));
    assert!(parts::get_part(&db, &pc, "gpu").await.unwrap().is_some());
    assert!(parts::get_part(&db, &pc, "mouse").await.unwrap().is_some());

    let custom_parts = parts::list_parts(&db, Some(&pc), Some(PartKind::Custom))
        .await
        .unwrap();
    assert_eq!(custom_parts.len(), 1);
    assert_eq!(custom_parts[0].name, "Headset");
}

#[tokio::test]
async fn test_update_without_other_parts_keeps_them() {
    let db = create_test_db().await;
    let lab = seed_lab(&db, "Lab A").await;
    let pc = seed_computer(&db, lab, "PC-01").await;
    parts::replace_custom_parts(&db, &pc, &[custom("Webcam", None)])
        .await
        .unwrap();

    computers::update_computer(&db, &pc, ComputerEdit::default())
        .await
        .unwrap();

    let custom_parts = parts::list_parts(&db, Some(&pc), Some(PartKind::Custom))
        .await
        .unwrap();
    assert_eq!(custom_parts.len(), 1);
}

#[tokio::test]
async fn test_delete_missing_computer_is_not_found() {
    let db = create_test_db().await;

    let result = computers::delete_computer(&db, "12345678").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
