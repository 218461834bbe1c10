//! Persistence gateway tests against on-disk SQLite databases.

use std::thread;

use tempfile::{tempdir, TempDir};

use student_db_core::config::DbConfig;
use student_db_core::error::DbError;
use student_db_core::migrations;
use student_db_core::{NewStudent, StudentGateway};

fn open_temp() -> (TempDir, DbConfig, StudentGateway) {
    let dir = tempdir().unwrap();
    let config = DbConfig {
        pool_max_size: 4,
        ..DbConfig::new(format!(
            "sqlite://{}",
            dir.path().join("students.db").display()
        ))
    };
    let gateway = StudentGateway::open(&config).unwrap();
    (dir, config, gateway)
}

#[test]
fn test_insert_then_fetch_roundtrip() {
    let (_dir, _config, gateway) = open_temp();

    let id = gateway.insert(&NewStudent::new("Ada", 30, "A")).unwrap();
    let student = gateway.fetch_by_id(id).unwrap();

    assert_eq!(student.id, id);
    assert_eq!(student.name, "Ada");
    assert_eq!(student.age, 30);
    assert_eq!(student.grade, "A");
}

#[test]
fn test_update_overwrites_all_fields() {
    let (_dir, _config, gateway) = open_temp();
    let id = gateway.insert(&NewStudent::new("Ada", 30, "A")).unwrap();
    let before = gateway.fetch_by_id(id).unwrap();

    let updated = gateway
        .update(id, &NewStudent::new("Grace", 31, "A+"))
        .unwrap();
    assert_eq!(updated.name, "Grace");
    assert_eq!(updated.age, 31);
    assert_eq!(updated.grade, "A+");
    assert_eq!(updated.created_at, before.created_at);

    assert_eq!(gateway.fetch_by_id(id).unwrap(), updated);
}

#[test]
fn test_deleted_id_no_longer_resolves() {
    let (_dir, _config, gateway) = open_temp();
    let id = gateway.insert(&NewStudent::new("Ada", 30, "A")).unwrap();

    gateway.delete(id).unwrap();

    assert!(matches!(
        gateway.fetch_by_id(id),
        Err(DbError::NotFound { id: missing }) if missing == id
    ));
    assert!(matches!(
        gateway.update(id, &NewStudent::new("Ada", 31, "B")),
        Err(DbError::NotFound { .. })
    ));
    assert!(matches!(gateway.delete(id), Err(DbError::NotFound { .. })));
}

#[test]
fn test_ids_are_never_reused() {
    let (_dir, _config, gateway) = open_temp();
    let first = gateway.insert(&NewStudent::new("Ada", 30, "A")).unwrap();
    let second = gateway.insert(&NewStudent::new("Bob", 22, "C")).unwrap();
    gateway.delete(second).unwrap();

    let third = gateway.insert(&NewStudent::new("Cy", 19, "B")).unwrap();
    assert!(first < second);
    assert!(third > second);
}

#[test]
fn test_list_reflects_creates_and_deletes() {
    let (_dir, _config, gateway) = open_temp();

    let ids: Vec<_> = (0..5)
        .map(|i| {
            gateway
                .insert(&NewStudent::new(format!("Student {}", i), 18 + i, "B"))
                .unwrap()
        })
        .collect();
    gateway.delete(ids[1]).unwrap();
    gateway.delete(ids[3]).unwrap();
    gateway
        .update(ids[4], &NewStudent::new("Renamed", 40, "A"))
        .unwrap();

    let students = gateway.fetch_all().unwrap();
    assert_eq!(students.len(), 3);
    assert_eq!(gateway.count().unwrap(), 3);

    let listed: Vec<_> = students.iter().map(|s| s.id).collect();
    assert_eq!(listed, vec![ids[0], ids[2], ids[4]]);
    assert_eq!(students[2].name, "Renamed");
    assert_eq!(students[2].age, 40);
}

#[test]
fn test_created_at_follows_insertion_order() {
    let (_dir, _config, gateway) = open_temp();
    for i in 0..10 {
        gateway
            .insert(&NewStudent::new(format!("S{}", i), 20, "A"))
            .unwrap();
    }

    let students = gateway.fetch_all().unwrap();
    for pair in students.windows(2) {
        assert!(pair[0].id < pair[1].id);
        assert!(pair[0].created_at <= pair[1].created_at);
    }
}

#[test]
fn test_reopen_keeps_data_and_skips_migrations() {
    let (_dir, config, gateway) = open_temp();
    let id = gateway.insert(&NewStudent::new("Ada", 30, "A")).unwrap();
    drop(gateway);

    let status = migrations::inspect(&config).unwrap();
    assert_eq!(status.current, migrations::latest_version());
    assert_eq!(status.pending(), 0);

    let reopened = StudentGateway::open(&config).unwrap();
    assert_eq!(
        reopened.schema_version().unwrap(),
        migrations::latest_version()
    );
    assert_eq!(reopened.fetch_by_id(id).unwrap().name, "Ada");
}

#[test]
fn test_concurrent_inserts_get_distinct_ids() {
    let (_dir, _config, gateway) = open_temp();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let gateway = gateway.clone();
            thread::spawn(move || {
                (0..10)
                    .map(|i| {
                        gateway
                            .insert(&NewStudent::new(format!("T{}-{}", t, i), 20, "A"))
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<_> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 40);
    assert_eq!(gateway.count().unwrap(), 40);
}

#[test]
fn test_invalid_records_are_not_stored() {
    let (_dir, _config, gateway) = open_temp();
    let id = gateway.insert(&NewStudent::new("Ada", 30, "A")).unwrap();

    let err = gateway
        .update(id, &NewStudent::new("", 30, "A"))
        .unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));
    assert_eq!(gateway.fetch_by_id(id).unwrap().name, "Ada");
}

#[test]
fn test_student_serializes_with_timestamp() {
    let (_dir, _config, gateway) = open_temp();
    let id = gateway.insert(&NewStudent::new("Ada", 30, "A")).unwrap();
    let student = gateway.fetch_by_id(id).unwrap();

    let json = serde_json::to_value(&student).unwrap();
    assert_eq!(json["name"], "Ada");
    assert!(json["created_at"].is_string());
}
