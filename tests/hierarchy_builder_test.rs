//! Tests for the hierarchy builder

use chrono::NaiveDate;
use rstest::rstest;

use orgchart::domain::{
    build_hierarchy, BuildOptions, DepartmentFilter, DirectReport, EmployeeRecord, Node,
    NodeBody, NodeGraph, Tag,
};
use orgchart::util::testing::employee;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

fn options() -> BuildOptions {
    BuildOptions::new(today())
}

fn find<'a>(nodes: &'a [Node], id: &str) -> &'a Node {
    nodes
        .iter()
        .find(|n| n.id == id)
        .unwrap_or_else(|| panic!("node {id} missing"))
}

fn sorted_by_id(mut nodes: Vec<Node>) -> Vec<Node> {
    nodes.sort_by(|a, b| a.id.cmp(&b.id));
    nodes
}

// ============================================================
// Person nodes and department groups
// ============================================================

#[test]
fn given_boss_and_two_reports_when_building_then_reports_share_one_department_group() {
    // Arrange
    let records = vec![
        employee("1", "", "Eng"),
        employee("2", "1: Boss", "Eng"),
        employee("3", "1: Boss", "Eng"),
    ];

    // Act
    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options());

    // Assert
    assert_eq!(find(&nodes, "1").parent_id, None);
    assert_eq!(find(&nodes, "2").parent_id.as_deref(), Some("1"));
    assert_eq!(find(&nodes, "3").parent_id.as_deref(), Some("1"));

    let under_boss: Vec<_> = nodes.iter().filter(|n| n.id == "dept:Eng:1").collect();
    assert_eq!(under_boss.len(), 1, "one group per (department, manager)");
    let group = under_boss[0];
    assert!(group.is_group());
    assert!(group.tags.contains(&Tag::Group));
    assert_eq!(group.parent_id.as_deref(), Some("1"));
    assert_eq!(group.display_name(), "Eng");

    assert_eq!(find(&nodes, "2").group_id.as_deref(), Some("dept:Eng:1"));
    assert_eq!(find(&nodes, "3").group_id.as_deref(), Some("dept:Eng:1"));
}

#[test]
fn given_records_when_building_then_persons_precede_groups_in_input_order() {
    let records = vec![
        employee("7", "", "Ops"),
        employee("5", "7", "Ops"),
        employee("6", "7", "Eng"),
    ];

    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options());

    let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["7", "5", "6", "dept:Ops:", "dept:Ops:7", "dept:Eng:7"]);
}

#[rstest]
#[case("00042: Alice", Some("42"))]
#[case("42: Alice", Some("42"))]
#[case("42", Some("42"))]
#[case("  42  ", Some("42"))]
#[case("0", None)]
#[case("000: Nobody", None)]
#[case("", None)]
fn given_manager_reference_when_building_then_parent_is_normalized(
    #[case] raw: &str,
    #[case] expected: Option<&str>,
) {
    let records = vec![employee("100", raw, "Eng")];

    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options());

    assert_eq!(find(&nodes, "100").parent_id.as_deref(), expected);
}

#[test]
fn given_manager_spelled_differently_when_building_then_one_group_is_created() {
    let records = vec![
        employee("2", "00042: Alice", "Eng"),
        employee("3", "42", "Eng"),
    ];

    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options());

    let groups: Vec<&str> = nodes
        .iter()
        .filter(|n| n.is_group())
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(groups, vec!["dept:Eng:42"]);
}

#[test]
fn given_self_managed_record_when_building_then_it_is_a_root() {
    let records = vec![employee("9", "9: Me", "Eng")];

    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options());

    assert_eq!(find(&nodes, "9").parent_id, None);
    assert!(NodeGraph::from_nodes(nodes).is_ok());
}

// ============================================================
// Indirect reports
// ============================================================

#[test]
fn given_indirect_report_when_building_then_group_is_marked_indirect() {
    let records = vec![EmployeeRecord {
        is_direct_report: DirectReport::No,
        ..employee("5", "42: Alice", "Eng")
    }];

    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options());

    let group = find(&nodes, "dept:Eng:i-42");
    assert!(group.tags.contains(&Tag::IndirectGroup));
    assert!(group.is_indirect_group());
    assert_eq!(group.parent_id.as_deref(), Some("42"));

    let person = find(&nodes, "5");
    assert_eq!(person.parent_id.as_deref(), Some("42"));
    assert_eq!(person.group_id.as_deref(), Some("dept:Eng:i-42"));
}

#[rstest]
#[case(DirectReport::Yes)]
#[case(DirectReport::Unspecified)]
fn given_report_not_marked_indirect_when_building_then_group_is_direct(
    #[case] direct: DirectReport,
) {
    let records = vec![EmployeeRecord {
        is_direct_report: direct,
        ..employee("5", "42", "Eng")
    }];

    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options());

    let group = find(&nodes, "dept:Eng:42");
    assert!(!group.is_indirect_group());
}

#[test]
fn given_direct_and_indirect_reports_of_same_manager_when_building_then_two_groups() {
    let records = vec![
        employee("5", "42", "Eng"),
        EmployeeRecord {
            is_direct_report: DirectReport::No,
            ..employee("6", "42", "Eng")
        },
    ];

    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options());

    assert!(nodes.iter().any(|n| n.id == "dept:Eng:42"));
    assert!(nodes.iter().any(|n| n.id == "dept:Eng:i-42"));
}

// ============================================================
// Tags and images
// ============================================================

#[test]
fn given_open_requisition_when_building_then_headcount_tag_and_placeholder_image() {
    let records = vec![EmployeeRecord {
        employment_type: "hc_open".into(),
        ..employee("77", "1", "Eng")
    }];

    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options());

    let node = find(&nodes, "77");
    assert!(node.tags.contains(&Tag::HeadcountOpen));
    assert_eq!(node.image_ref(), Some("/headcount_open.png"));
}

#[test]
fn given_image_base_url_when_building_then_person_image_is_derived_from_id() {
    let records = vec![employee("12", "", "Eng")];
    let options = BuildOptions {
        image_base_url: Some("https://img.example.com/staff/".into()),
        ..options()
    };

    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options);

    assert_eq!(
        find(&nodes, "12").image_ref(),
        Some("https://img.example.com/staff/12.jpg")
    );
}

#[rstest]
#[case(0, true)]
#[case(30, true)]
#[case(60, true)]
#[case(61, false)]
#[case(-1, false)]
fn given_joining_date_when_building_then_probation_tag_follows_window(
    #[case] days_ago: i64,
    #[case] expected: bool,
) {
    let joined = today() - chrono::Duration::days(days_ago);
    let records = vec![EmployeeRecord {
        joining_date: Some(joined.format("%Y-%m-%d").to_string()),
        ..employee("1", "", "Eng")
    }];

    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options());

    assert_eq!(find(&nodes, "1").tags.contains(&Tag::Probation), expected);
}

#[test]
fn given_excel_serial_joining_date_when_building_then_display_date_is_formatted() {
    let records = vec![EmployeeRecord {
        joining_date: Some("45356".into()),
        ..employee("1", "", "Eng")
    }];

    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options());

    match &find(&nodes, "1").body {
        NodeBody::Person(p) => assert_eq!(p.joining_date.as_deref(), Some("05/03/2024")),
        NodeBody::Group(_) => panic!("expected a person node"),
    }
}

#[test]
fn given_missing_joining_date_when_building_then_no_probation_tag() {
    let records = vec![employee("1", "", "Eng")];

    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options());

    assert!(!find(&nodes, "1").tags.contains(&Tag::Probation));
}

// ============================================================
// Filtering and edge cases
// ============================================================

#[test]
fn given_blank_employee_id_when_building_then_row_is_skipped() {
    let records = vec![employee("   ", "1", "Eng"), employee("2", "", "Eng")];

    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options());

    let persons: Vec<&str> = nodes
        .iter()
        .filter(|n| !n.is_group())
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(persons, vec!["2"]);
}

#[test]
fn given_department_filter_when_manager_outside_department_then_parent_dangles() {
    let records = vec![employee("1", "", "Eng"), employee("2", "1", "Ops")];

    let nodes = build_hierarchy(
        &records,
        &DepartmentFilter::Department("Ops".into()),
        &options(),
    );

    assert!(nodes.iter().all(|n| n.id != "1"));
    assert_eq!(find(&nodes, "2").parent_id.as_deref(), Some("1"));

    let graph = NodeGraph::from_nodes(nodes).unwrap();
    let roots: Vec<&str> = graph.roots().iter().map(|n| n.id.as_str()).collect();
    assert!(roots.contains(&"2"), "dangling parent makes an implicit root");
}

#[test]
fn given_no_records_when_building_then_no_nodes() {
    let nodes = build_hierarchy(&[], &DepartmentFilter::All, &options());
    assert!(nodes.is_empty());
}

#[test]
fn given_same_input_when_building_twice_then_output_is_identical() {
    let records = vec![
        employee("1", "", "Eng"),
        employee("2", "1", "Eng"),
        EmployeeRecord {
            is_direct_report: DirectReport::No,
            ..employee("3", "1", "Ops")
        },
    ];

    let first = build_hierarchy(&records, &DepartmentFilter::All, &options());
    let second = build_hierarchy(&records, &DepartmentFilter::All, &options());

    assert_eq!(first, second);
}

#[test]
fn given_reordered_input_when_building_then_same_node_set() {
    let records = vec![
        employee("1", "", "Eng"),
        employee("2", "1", "Eng"),
        employee("3", "1", "Ops"),
        employee("4", "2", "Eng"),
    ];
    let mut reversed = records.clone();
    reversed.reverse();

    let forward = build_hierarchy(&records, &DepartmentFilter::All, &options());
    let backward = build_hierarchy(&reversed, &DepartmentFilter::All, &options());

    assert_eq!(sorted_by_id(forward), sorted_by_id(backward));
}

#[test]
fn given_built_hierarchy_when_loaded_into_graph_then_no_node_parents_itself() {
    let records = vec![
        employee("1", "1", "Eng"),
        employee("2", "1", "Eng"),
        employee("3", "2", "Eng"),
    ];

    let nodes = build_hierarchy(&records, &DepartmentFilter::All, &options());

    assert!(nodes
        .iter()
        .all(|n| n.parent_id.as_deref() != Some(n.id.as_str())));
    assert!(NodeGraph::from_nodes(nodes).is_ok());
}
