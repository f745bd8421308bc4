//! Flat JSON form of chart nodes, as exchanged with the chart document store.
//!
//! Reading is lenient: legacy field names, string-encoded tag lists and
//! empty-string parent pointers are accepted. Writing always produces the
//! canonical camelCase shape with `tags` as an array.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{
    AnnotationTable, Geometry, GroupDetails, Node, NodeBody, PersonDetails, TableContent, Tag,
    Tags,
};

/// One flat node object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    #[serde(deserialize_with = "id_value")]
    pub id: String,
    #[serde(default, alias = "pid", deserialize_with = "link_value")]
    pub parent_id: Option<String>,
    #[serde(default, alias = "stpid", deserialize_with = "link_value")]
    pub group_parent_id: Option<String>,
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, alias = "img", alias = "image", skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default, alias = "dept", skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, alias = "bu", alias = "BU", skip_serializing_if = "Option::is_none")]
    pub business_unit: Option<String>,
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "joining_date", skip_serializing_if = "Option::is_none")]
    pub joining_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_data: Option<TableContent>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A decoded record: hierarchy node or annotation table.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEntry {
    Node(Node),
    Table(AnnotationTable),
}

/// Keys starting with `_` are bookkeeping and never persisted.
pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with('_')
}

fn public_fields(extra: BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    extra
        .into_iter()
        .filter(|(k, _)| !is_reserved_key(k))
        .collect()
}

impl NodeRecord {
    pub fn is_reserved(&self) -> bool {
        is_reserved_key(&self.id)
    }

    pub fn into_entry(self) -> DomainResult<ChartEntry> {
        if self.id.trim().is_empty() {
            return Err(DomainError::validation("id", "node record without id"));
        }
        let extra = public_fields(self.extra);

        if self.tags.contains(&Tag::DescriptionTable) {
            let defaults = (100.0, 100.0, 300.0, 300.0);
            return Ok(ChartEntry::Table(AnnotationTable {
                id: self.id,
                tags: self.tags,
                geometry: Geometry {
                    x: self.x.unwrap_or(defaults.0),
                    y: self.y.unwrap_or(defaults.1),
                    w: self.w.unwrap_or(defaults.2),
                    h: self.h.unwrap_or(defaults.3),
                },
                content: self.table_data.unwrap_or_default(),
                extra,
            }));
        }

        let body = if self.tags.is_group() {
            NodeBody::Group(GroupDetails {
                display_name: self.display_name.unwrap_or_default(),
                title: self.title.unwrap_or_default(),
                department: self.department.unwrap_or_default(),
                description: self.description.unwrap_or_default(),
            })
        } else {
            NodeBody::Person(PersonDetails {
                display_name: self.display_name.unwrap_or_default(),
                title: self.title.unwrap_or_default(),
                image_ref: self.image_ref.filter(|s| !s.is_empty()),
                department: self.department.unwrap_or_default(),
                business_unit: self.business_unit.unwrap_or_default(),
                category: self.category.unwrap_or_default(),
                location: self.location.unwrap_or_default(),
                description: self.description.unwrap_or_default(),
                joining_date: self.joining_date.filter(|s| !s.is_empty()),
            })
        };

        let mut parent_id = self.parent_id;
        if parent_id.as_deref() == Some(self.id.as_str()) {
            debug!("dropping self-parent link on {}", self.id);
            parent_id = None;
        }
        let mut group_id = self.group_parent_id;
        if group_id.as_deref() == Some(self.id.as_str()) {
            debug!("dropping self-group link on {}", self.id);
            group_id = None;
        }

        Ok(ChartEntry::Node(Node {
            id: self.id,
            parent_id,
            group_id,
            tags: self.tags,
            body,
            extra,
        }))
    }
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        let mut record = NodeRecord {
            id: node.id.clone(),
            parent_id: node.parent_id.clone(),
            group_parent_id: node.group_id.clone(),
            tags: node.tags.clone(),
            extra: public_fields(node.extra.clone()),
            ..NodeRecord::default()
        };
        match &node.body {
            NodeBody::Person(p) => {
                record.display_name = Some(p.display_name.clone());
                record.title = Some(p.title.clone());
                record.image_ref = p.image_ref.clone();
                record.department = Some(p.department.clone());
                record.business_unit = Some(p.business_unit.clone());
                record.category = Some(p.category.clone());
                record.location = Some(p.location.clone());
                record.description = Some(p.description.clone());
                record.joining_date = p.joining_date.clone();
            }
            NodeBody::Group(g) => {
                record.display_name = Some(g.display_name.clone());
                record.title = Some(g.title.clone());
                record.department = Some(g.department.clone());
                record.description = Some(g.description.clone());
            }
        }
        record
    }
}

impl From<&AnnotationTable> for NodeRecord {
    fn from(table: &AnnotationTable) -> Self {
        NodeRecord {
            id: table.id.clone(),
            tags: table.tags.clone(),
            x: Some(table.geometry.x),
            y: Some(table.geometry.y),
            w: Some(table.geometry.w),
            h: Some(table.geometry.h),
            table_data: Some(table.content.clone()),
            extra: public_fields(table.extra.clone()),
            ..NodeRecord::default()
        }
    }
}

fn tag_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,;|]").unwrap())
}

/// Tags stored as a string: either a JSON-encoded array or a delimited list.
pub fn parse_legacy_tags(raw: &str) -> Tags {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
            return items.iter().filter_map(|s| Tag::parse(s)).collect();
        }
    }
    tag_separator()
        .split(trimmed)
        .filter_map(Tag::parse)
        .collect()
}

fn id_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "node id must be a string or number, got {}",
            other
        ))),
    }
}

fn link_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "parent link must be a string, got {}",
                other
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_record_shape_is_understood() {
        let json = r#"{
            "id": 17, "pid": "", "stpid": "dept:Eng:1", "name": "Bob",
            "img": "bob.jpg", "tags": "[\"emp\",\"Emp_probation\"]",
            "dept": "Eng", "orig_pid": "1", "_internal": true
        }"#;
        let record: NodeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "17");
        assert_eq!(record.parent_id, None);

        let ChartEntry::Node(node) = record.into_entry().unwrap() else {
            panic!("expected hierarchy node");
        };
        assert_eq!(node.group_id.as_deref(), Some("dept:Eng:1"));
        assert!(node.tags.contains(&Tag::Probation));
        assert_eq!(node.image_ref(), Some("bob.jpg"));
        assert!(node.extra.contains_key("orig_pid"));
        assert!(!node.extra.contains_key("_internal"));
    }

    #[test]
    fn delimited_tag_string_is_split() {
        let tags = parse_legacy_tags("group; vip");
        assert!(tags.contains(&Tag::Group));
        assert!(tags.contains(&Tag::Custom("vip".into())));
    }

    #[test]
    fn table_record_gets_default_geometry() {
        let json = r#"{"id": "desc_table_1", "tags": ["description_table"]}"#;
        let record: NodeRecord = serde_json::from_str(json).unwrap();
        let ChartEntry::Table(table) = record.into_entry().unwrap() else {
            panic!("expected table");
        };
        assert_eq!(table.geometry.x, 100.0);
        assert_eq!(table.geometry.h, 300.0);
        assert_eq!(table.content, TableContent::default());
    }
}
