//! Tests for the JSON employee and chart stores

use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use orgchart::domain::{ChartData, ChartDocument, DepartmentFilter, EmployeeRecord, NodeRecord};
use orgchart::infrastructure::stores::{JsonChartStore, JsonEmployeeStore};
use orgchart::infrastructure::traits::{ChartStore, EmployeeStore, RealFileSystem, StoreError};

fn employee(id: &str, dept: &str) -> EmployeeRecord {
    EmployeeRecord {
        employee_id: id.into(),
        full_name: format!("Person {id}"),
        department: dept.into(),
        ..Default::default()
    }
}

fn document(id: &str, owner: &str, age_minutes: i64) -> ChartDocument {
    let at = Utc::now() - Duration::minutes(age_minutes);
    ChartDocument {
        id: id.into(),
        name: format!("Chart {id}"),
        description: String::new(),
        owner: owner.into(),
        is_public: false,
        data: ChartData::default(),
        created_at: at,
        updated_at: at,
    }
}

fn employee_store(dir: &TempDir) -> JsonEmployeeStore {
    JsonEmployeeStore::new(Arc::new(RealFileSystem), dir.path())
}

fn chart_store(dir: &TempDir) -> JsonChartStore {
    JsonChartStore::new(Arc::new(RealFileSystem), dir.path())
}

// ============================================================
// JsonEmployeeStore
// ============================================================

#[test]
fn given_replaced_dataset_when_listing_by_department_then_only_matches_return() {
    let dir = TempDir::new().unwrap();
    let store = employee_store(&dir);

    store
        .replace_all(vec![employee("1", "Eng"), employee("2", "Ops"), employee("3", "Eng")])
        .unwrap();

    let eng: Vec<String> = store
        .list_employees(&DepartmentFilter::Department("Eng".into()))
        .unwrap()
        .into_iter()
        .map(|r| r.employee_id)
        .collect();
    assert_eq!(eng, vec!["1", "3"]);
    assert!(store.path().exists());
}

#[test]
fn given_existing_record_when_upserting_then_it_is_replaced_in_place() {
    let dir = TempDir::new().unwrap();
    let store = employee_store(&dir);
    store
        .replace_all(vec![employee("1", "Eng"), employee("2", "Eng")])
        .unwrap();

    let inserted = store
        .upsert(EmployeeRecord {
            job_title: "Manager".into(),
            ..employee("1", "Ops")
        })
        .unwrap();

    assert!(!inserted);
    let all = store.list_employees(&DepartmentFilter::All).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].department, "Ops");
    assert_eq!(all[0].job_title, "Manager");
}

#[test]
fn given_new_record_when_upserting_then_it_is_appended() {
    let dir = TempDir::new().unwrap();
    let store = employee_store(&dir);

    assert!(store.upsert(employee("9", "Eng")).unwrap());

    assert_eq!(store.list_employees(&DepartmentFilter::All).unwrap().len(), 1);
}

#[test]
fn given_blank_id_when_upserting_then_invalid_id() {
    let dir = TempDir::new().unwrap();
    let store = employee_store(&dir);

    let result = store.upsert(employee("  ", "Eng"));

    assert!(matches!(result, Err(StoreError::InvalidId(_))));
}

#[test]
fn given_record_when_deleting_twice_then_second_delete_reports_nothing() {
    let dir = TempDir::new().unwrap();
    let store = employee_store(&dir);
    store.replace_all(vec![employee("1", "Eng")]).unwrap();

    assert!(store.delete(" 1 ").unwrap());
    assert!(!store.delete("1").unwrap());
    assert!(store.list_employees(&DepartmentFilter::All).unwrap().is_empty());
}

#[test]
fn given_stored_records_when_reloaded_then_fields_survive() {
    let dir = TempDir::new().unwrap();
    let record = EmployeeRecord {
        joining_date: Some("2024-03-05".into()),
        last_working_day: Some("31/12/2024".into()),
        line_manager_raw: "42: Alice".into(),
        is_direct_report: orgchart::domain::DirectReport::No,
        ..employee("7", "Eng")
    };
    employee_store(&dir).replace_all(vec![record.clone()]).unwrap();

    let loaded = employee_store(&dir)
        .list_employees(&DepartmentFilter::All)
        .unwrap();

    assert_eq!(loaded, vec![record]);
}

// ============================================================
// JsonChartStore
// ============================================================

#[test]
fn given_charts_when_listing_then_newest_update_comes_first() {
    let dir = TempDir::new().unwrap();
    let store = chart_store(&dir);
    store.put_chart(&document("old", "alice", 60)).unwrap();
    store.put_chart(&document("new", "bob", 1)).unwrap();
    store.put_chart(&document("mid", "alice", 30)).unwrap();

    let ids: Vec<String> = store
        .list_charts()
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();

    assert_eq!(ids, vec!["new", "mid", "old"]);
}

#[test]
fn given_no_charts_dir_when_listing_then_empty() {
    let dir = TempDir::new().unwrap();
    assert!(chart_store(&dir).list_charts().unwrap().is_empty());
}

#[test]
fn given_chart_when_replacing_data_then_metadata_is_kept_and_timestamp_moves() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let store = chart_store(&dir);
    let original = document("c1", "alice", 10);
    store.put_chart(&original).unwrap();
    let data = ChartData {
        nodes: vec![NodeRecord {
            id: "1".into(),
            display_name: Some("Boss".into()),
            ..NodeRecord::default()
        }],
    };

    // Act
    store.put_chart_data("c1", &data).unwrap();

    // Assert
    let stored = store.get_chart("c1").unwrap().unwrap();
    assert_eq!(stored.data, data);
    assert_eq!(stored.owner, "alice");
    assert_eq!(stored.created_at, original.created_at);
    assert!(stored.updated_at > original.updated_at);
    assert_eq!(stored.summary().node_count, 1);
}

#[test]
fn given_missing_chart_when_replacing_data_then_not_found() {
    let dir = TempDir::new().unwrap();
    let store = chart_store(&dir);

    let result = store.put_chart_data("ghost", &ChartData::default());

    assert!(matches!(result, Err(StoreError::NotFound(id)) if id == "ghost"));
}

#[test]
fn given_unsafe_chart_id_when_writing_then_invalid_id() {
    let dir = TempDir::new().unwrap();
    let store = chart_store(&dir);

    let result = store.put_chart(&document("a/b", "alice", 0));

    assert!(matches!(result, Err(StoreError::InvalidId(_))));
}

#[test]
fn given_chart_when_deleting_then_file_is_removed() {
    let dir = TempDir::new().unwrap();
    let store = chart_store(&dir);
    store.put_chart(&document("c1", "alice", 0)).unwrap();

    assert!(store.delete_chart("c1").unwrap());
    assert!(!store.delete_chart("c1").unwrap());
    assert!(store.get_chart("c1").unwrap().is_none());
}

#[test]
fn given_corrupt_chart_file_when_listing_then_other_charts_are_listed() {
    let dir = TempDir::new().unwrap();
    let store = chart_store(&dir);
    store.put_chart(&document("good", "alice", 0)).unwrap();
    std::fs::write(dir.path().join("charts").join("bad.json"), "[1, 2").unwrap();

    let listed = store.list_charts().unwrap();

    let ids: Vec<&str> = listed.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["good"]);
}

#[test]
fn given_corrupt_chart_file_when_getting_it_then_malformed() {
    let dir = TempDir::new().unwrap();
    let store = chart_store(&dir);
    std::fs::create_dir_all(dir.path().join("charts")).unwrap();
    std::fs::write(dir.path().join("charts").join("bad.json"), "[1, 2").unwrap();

    let result = store.get_chart("bad");

    assert!(matches!(result, Err(StoreError::Malformed { .. })));
}
