//! Tests for ForestBuilder and the arena trees it produces

use rstest::rstest;

use orgchart::domain::{
    DomainError, ForestBuilder, GroupDetails, LinkPreference, Node, NodeGraph, PersonDetails,
};

fn person(id: &str, parent: Option<&str>, group: Option<&str>) -> Node {
    Node::person(
        id,
        PersonDetails {
            display_name: format!("Person {id}"),
            title: "Engineer".into(),
            ..PersonDetails::default()
        },
    )
    .with_parent(parent.map(String::from))
    .with_group(group.map(String::from))
}

fn group(id: &str, parent: Option<&str>, indirect: bool) -> Node {
    Node::group(
        id,
        GroupDetails {
            display_name: "Eng".into(),
            title: "Department".into(),
            ..GroupDetails::default()
        },
        indirect,
    )
    .with_parent(parent.map(String::from))
}

/// Boss 1 with reports 2 and 3 in box `dept:Eng:1`, and an indirect box for 4.
fn chart() -> NodeGraph {
    NodeGraph::from_nodes(vec![
        person("1", None, None),
        person("2", Some("1"), Some("dept:Eng:1")),
        person("3", Some("1"), Some("dept:Eng:1")),
        person("4", Some("1"), Some("dept:Eng:i-1")),
        group("dept:Eng:1", Some("1"), false),
        group("dept:Eng:i-1", Some("1"), true),
    ])
    .unwrap()
}

fn children_of_root(tree: &orgchart::domain::TreeArena) -> Vec<String> {
    let root = tree.root().unwrap();
    tree.get_node(root)
        .unwrap()
        .children
        .iter()
        .map(|&idx| tree.get_node(idx).unwrap().data.id.clone())
        .collect()
}

// ============================================================
// Link preference
// ============================================================

#[test]
fn given_manager_preference_when_building_then_reports_hang_under_manager() {
    let forest = ForestBuilder::new(LinkPreference::Manager)
        .build(&chart())
        .unwrap();

    assert_eq!(forest.len(), 1);
    let tree = &forest[0];
    assert_eq!(tree.root_data().unwrap().id, "1");
    assert_eq!(
        children_of_root(tree),
        vec!["2", "3", "4", "dept:Eng:1", "dept:Eng:i-1"]
    );
    assert_eq!(tree.depth(), 2);
}

#[test]
fn given_group_preference_when_building_then_reports_nest_inside_boxes() {
    let forest = ForestBuilder::new(LinkPreference::Group)
        .build(&chart())
        .unwrap();

    assert_eq!(forest.len(), 1);
    let tree = &forest[0];
    assert_eq!(children_of_root(tree), vec!["dept:Eng:1", "dept:Eng:i-1"]);
    assert_eq!(tree.depth(), 3);
    assert_eq!(tree.leaf_nodes(), vec!["2", "3", "4"]);
}

#[test]
fn given_group_missing_from_graph_when_preferring_groups_then_manager_link_is_used() {
    let graph = NodeGraph::from_nodes(vec![
        person("1", None, None),
        person("2", Some("1"), Some("dept:Gone:1")),
    ])
    .unwrap();

    let forest = ForestBuilder::new(LinkPreference::Group).build(&graph).unwrap();

    assert_eq!(forest.len(), 1);
    assert_eq!(children_of_root(&forest[0]), vec!["2"]);
}

// ============================================================
// Roots and cycles
// ============================================================

#[rstest]
#[case(LinkPreference::Manager)]
#[case(LinkPreference::Group)]
fn given_dangling_parents_when_building_then_each_becomes_a_root(
    #[case] preference: LinkPreference,
) {
    let graph = NodeGraph::from_nodes(vec![
        person("a", Some("ghost"), None),
        person("b", Some("a"), None),
        person("c", Some("elsewhere"), None),
    ])
    .unwrap();

    let forest = ForestBuilder::new(preference).build(&graph).unwrap();

    let roots: Vec<&str> = forest
        .iter()
        .map(|t| t.root_data().unwrap().id.as_str())
        .collect();
    assert_eq!(roots, vec!["a", "c"]);
    assert_eq!(forest[0].len(), 2);
}

#[test]
fn given_two_node_cycle_when_building_then_cycle_detected() {
    let graph = NodeGraph::from_nodes(vec![
        person("root", None, None),
        person("a", Some("b"), None),
        person("b", Some("a"), None),
    ])
    .unwrap();

    let result = ForestBuilder::default().build(&graph);

    assert!(matches!(result, Err(DomainError::CycleDetected { .. })));
}

#[test]
fn given_empty_graph_when_building_then_no_trees() {
    let forest = ForestBuilder::default().build(&NodeGraph::new()).unwrap();
    assert!(forest.is_empty());
}

// ============================================================
// Rendering
// ============================================================

#[test]
fn given_tree_when_rendered_then_labels_appear_in_order() {
    let forest = ForestBuilder::new(LinkPreference::Group)
        .build(&chart())
        .unwrap();

    let text = forest[0].to_termtree().to_string();

    let boss = text.find("Person 1 - Engineer [1]").unwrap();
    let dept = text.find("Eng - Department [dept:Eng:1]").unwrap();
    let report = text.find("Person 2 - Engineer [2]").unwrap();
    assert!(boss < dept && dept < report);
    assert!(text.contains("[dept:Eng:i-1] (indirect)"));
}
