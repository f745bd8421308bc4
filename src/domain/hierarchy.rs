//! Hierarchy builder: flat employee records to chart nodes.
//!
//! Pure and deterministic: the same records, options and date always give
//! the same nodes. Person nodes come first in input order, then one group
//! node per distinct department key in first-seen order.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::domain::employee::{
    format_display_date, is_probation, DepartmentFilter, DepartmentGroupKey, EmployeeRecord,
};
use crate::domain::node::{
    GroupDetails, Node, PersonDetails, Tag, DEFAULT_HEADCOUNT_OPEN_IMAGE,
};

pub const DEFAULT_PROBATION_DAYS: i64 = 60;

/// Inputs that are not part of the records themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Reference date for the probation window.
    pub today: NaiveDate,
    pub probation_days: i64,
    /// Person image is `<base><employeeId>.jpg` when set.
    pub image_base_url: Option<String>,
    pub headcount_open_image: String,
}

impl BuildOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            probation_days: DEFAULT_PROBATION_DAYS,
            image_base_url: None,
            headcount_open_image: DEFAULT_HEADCOUNT_OPEN_IMAGE.to_string(),
        }
    }
}

/// Build the node list for the records selected by `filter`.
#[instrument(level = "debug", skip(records, options), fields(records = records.len()))]
pub fn build_hierarchy(
    records: &[EmployeeRecord],
    filter: &DepartmentFilter,
    options: &BuildOptions,
) -> Vec<Node> {
    let mut persons = Vec::new();
    let mut group_order: Vec<DepartmentGroupKey> = Vec::new();
    let mut seen_groups: HashSet<String> = HashSet::new();

    for record in records.iter().filter(|r| filter.matches(r)) {
        let Some(id) = record.id() else {
            debug!("skipping record without employee id");
            continue;
        };

        let manager = record.manager_key();
        let key = DepartmentGroupKey::new(
            &record.department,
            manager.clone(),
            record.is_direct_report,
        );
        let group_id = key.node_id();

        // A record naming itself as manager is a root, not a self-loop.
        let parent_id = manager.map(|m| m.to_string()).filter(|m| m != id);
        persons.push(
            person_node(id, record, options)
                .with_parent(parent_id)
                .with_group(Some(group_id.clone())),
        );

        // First writer wins; the key already encodes department and manager.
        if seen_groups.insert(group_id) {
            group_order.push(key);
        }
    }

    let group_count = group_order.len();
    let nodes: Vec<Node> = persons
        .into_iter()
        .chain(group_order.into_iter().map(group_node))
        .collect();
    debug!(
        "built {} nodes ({} department groups)",
        nodes.len(),
        group_count
    );
    nodes
}

fn person_node(id: &str, record: &EmployeeRecord, options: &BuildOptions) -> Node {
    let joining = record.joining();
    let joining_date = match joining {
        Some(date) => Some(format_display_date(date)),
        None => record
            .joining_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
    };

    let headcount_open = record.is_headcount_open();
    let image_ref = if headcount_open {
        Some(options.headcount_open_image.clone())
    } else {
        options
            .image_base_url
            .as_ref()
            .map(|base| format!("{}{}.jpg", base, id))
    };

    let mut node = Node::person(
        id,
        PersonDetails {
            display_name: record.full_name.clone(),
            title: record.job_title.clone(),
            image_ref,
            department: record.department.clone(),
            business_unit: record.business_unit.clone(),
            category: record.employment_category.clone(),
            location: record.location.clone(),
            description: record.employment_type.clone(),
            joining_date,
        },
    );
    if headcount_open {
        node.tags.insert(Tag::HeadcountOpen);
    }
    if joining.is_some_and(|date| is_probation(date, options.today, options.probation_days)) {
        node.tags.insert(Tag::Probation);
    }
    node
}

/// The group hangs off the real manager; indirectness is carried by its tag.
fn group_node(key: DepartmentGroupKey) -> Node {
    let manager_id = key.manager.as_ref().map(|m| m.to_string());
    let description = format!(
        "Dept under manager {}",
        manager_id.as_deref().unwrap_or("none")
    );
    Node::group(
        key.node_id(),
        GroupDetails {
            display_name: key.department.clone(),
            title: "Department".to_string(),
            department: key.department.clone(),
            description,
        },
        key.indirect,
    )
    .with_parent(manager_id)
}
