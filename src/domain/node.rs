//! Chart node model.
//!
//! A chart is made of hierarchy nodes (persons and department groups), which
//! share identity and parent links, plus free-floating annotation tables that
//! carry geometry instead of links.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::domain::error::{DomainError, DomainResult};

/// Placeholder image for open requisitions.
pub const DEFAULT_HEADCOUNT_OPEN_IMAGE: &str = "/headcount_open.png";

/// Well-known node markers; anything else is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Group,
    IndirectGroup,
    HeadcountOpen,
    Probation,
    DescriptionTable,
    Custom(String),
}

impl Tag {
    /// Parse a single marker. Legacy spellings are mapped, and the legacy
    /// plain-employee marker `emp` carries no information.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();
        match value {
            "" | "emp" => None,
            "group" => Some(Tag::Group),
            "indirect_group" => Some(Tag::IndirectGroup),
            "headcount_open" => Some(Tag::HeadcountOpen),
            "probation" | "Emp_probation" => Some(Tag::Probation),
            "description_table" => Some(Tag::DescriptionTable),
            other => Some(Tag::Custom(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Tag::Group => "group",
            Tag::IndirectGroup => "indirect_group",
            Tag::HeadcountOpen => "headcount_open",
            Tag::Probation => "probation",
            Tag::DescriptionTable => "description_table",
            Tag::Custom(s) => s,
        }
    }

    pub fn is_group_marker(&self) -> bool {
        matches!(self, Tag::Group | Tag::IndirectGroup)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of tags; insertion order is kept for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<Tag>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: Tag) {
        if !self.0.contains(&tag) {
            self.0.push(tag);
        }
    }

    pub fn remove(&mut self, tag: &Tag) {
        self.0.retain(|t| t != tag);
    }

    pub fn contains(&self, tag: &Tag) -> bool {
        self.0.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_group(&self) -> bool {
        self.0.iter().any(Tag::is_group_marker)
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

impl Serialize for Tags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(Tag::as_str))
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => Tags::new(),
            Some(Value::String(s)) => crate::domain::wire::parse_legacy_tags(&s),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .filter_map(Tag::parse)
                .collect(),
            Some(other) => {
                return Err(serde::de::Error::custom(format!(
                    "tags must be an array or string, got {}",
                    other
                )))
            }
        })
    }
}

/// Descriptive fields of an employee (or vacancy) box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDetails {
    pub display_name: String,
    pub title: String,
    pub image_ref: Option<String>,
    pub department: String,
    pub business_unit: String,
    pub category: String,
    pub location: String,
    pub description: String,
    pub joining_date: Option<String>,
}

/// Descriptive fields of a synthetic department container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDetails {
    pub display_name: String,
    pub title: String,
    pub department: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeBody {
    Person(PersonDetails),
    Group(GroupDetails),
}

/// A hierarchy node.
///
/// `parent_id` is the authoritative structural link; `group_id` records
/// membership in a department box. A link to an id absent from the graph
/// makes the node an implicit root.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub parent_id: Option<String>,
    pub group_id: Option<String>,
    pub tags: Tags,
    pub body: NodeBody,
    /// Fields this crate does not interpret, kept for round-tripping.
    pub extra: BTreeMap<String, Value>,
}

impl Node {
    pub fn person(id: impl Into<String>, details: PersonDetails) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            group_id: None,
            tags: Tags::new(),
            body: NodeBody::Person(details),
            extra: BTreeMap::new(),
        }
    }

    pub fn group(id: impl Into<String>, details: GroupDetails, indirect: bool) -> Self {
        let marker = if indirect { Tag::IndirectGroup } else { Tag::Group };
        Self {
            id: id.into(),
            parent_id: None,
            group_id: None,
            tags: [marker].into_iter().collect(),
            body: NodeBody::Group(details),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_group(mut self, group_id: Option<String>) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn is_group(&self) -> bool {
        matches!(self.body, NodeBody::Group(_))
    }

    pub fn is_indirect_group(&self) -> bool {
        self.is_group() && self.tags.contains(&Tag::IndirectGroup)
    }

    pub fn display_name(&self) -> &str {
        match &self.body {
            NodeBody::Person(p) => &p.display_name,
            NodeBody::Group(g) => &g.display_name,
        }
    }

    pub fn title(&self) -> &str {
        match &self.body {
            NodeBody::Person(p) => &p.title,
            NodeBody::Group(g) => &g.title,
        }
    }

    pub fn department(&self) -> &str {
        match &self.body {
            NodeBody::Person(p) => &p.department,
            NodeBody::Group(g) => &g.department,
        }
    }

    pub fn image_ref(&self) -> Option<&str> {
        match &self.body {
            NodeBody::Person(p) => p.image_ref.as_deref(),
            NodeBody::Group(_) => None,
        }
    }

    /// One-line label for text output.
    pub fn label(&self) -> String {
        let name = self.display_name();
        let title = self.title();
        let mut label = if title.is_empty() {
            format!("{} [{}]", name, self.id)
        } else {
            format!("{} - {} [{}]", name, title, self.id)
        };
        if self.is_indirect_group() {
            label.push_str(" (indirect)");
        }
        label
    }
}

/// Node templates offered by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Department,
    Employee,
    OpenHeadcount,
}

impl TemplateKind {
    pub fn id_prefix(self) -> &'static str {
        match self {
            TemplateKind::Department => "dept",
            TemplateKind::Employee => "emp",
            TemplateKind::OpenHeadcount => "vacant",
        }
    }

    /// Fresh node with this template's default fields.
    pub fn instantiate(self, id: String, parent_id: Option<String>) -> Node {
        let node = match self {
            TemplateKind::Department => Node::group(
                id,
                GroupDetails {
                    display_name: "New Department".into(),
                    title: "Department".into(),
                    ..GroupDetails::default()
                },
                false,
            ),
            TemplateKind::Employee => Node::person(
                id,
                PersonDetails {
                    display_name: "New Employee".into(),
                    title: "Position".into(),
                    ..PersonDetails::default()
                },
            ),
            TemplateKind::OpenHeadcount => {
                let mut node = Node::person(
                    id,
                    PersonDetails {
                        display_name: "Vacant Position".into(),
                        title: "Open Headcount".into(),
                        image_ref: Some(DEFAULT_HEADCOUNT_OPEN_IMAGE.into()),
                        description: "Open headcount position".into(),
                        ..PersonDetails::default()
                    },
                );
                node.tags.insert(Tag::HeadcountOpen);
                node
            }
        };
        node.with_parent(parent_id)
    }
}

/// Partial update of a hierarchy node. `None` leaves a field untouched.
///
/// Structural links are deliberately absent; they change only through
/// reparenting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePatch {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub title: Option<String>,
    /// An empty string clears the image.
    pub image_ref: Option<String>,
    pub department: Option<String>,
    pub business_unit: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub joining_date: Option<String>,
}

impl NodePatch {
    pub fn rename(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Copy descriptive fields of a matching reference node into the patch.
    /// Empty reference values keep whatever the patch already had.
    pub fn autofill_from(mut self, reference: &Node) -> Self {
        fn pick(current: Option<String>, candidate: &str) -> Option<String> {
            if candidate.is_empty() {
                current
            } else {
                Some(candidate.to_string())
            }
        }
        self.display_name = pick(self.display_name, reference.display_name());
        self.title = pick(self.title, reference.title());
        self.image_ref = pick(self.image_ref, reference.image_ref().unwrap_or_default());
        self.department = pick(self.department, reference.department());
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Some(id) = &self.id {
            validate_id(id)?;
        }
        if let Some(name) = &self.display_name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("displayName", "must not be empty"));
            }
        }
        Ok(())
    }

    /// Apply the descriptive fields (never the id).
    /// Person-only fields are ignored on group nodes.
    pub(crate) fn apply_fields(&self, node: &mut Node) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        match &mut node.body {
            NodeBody::Person(p) => {
                set(&mut p.display_name, &self.display_name);
                set(&mut p.title, &self.title);
                if let Some(image) = &self.image_ref {
                    p.image_ref = (!image.is_empty()).then(|| image.clone());
                }
                set(&mut p.department, &self.department);
                set(&mut p.business_unit, &self.business_unit);
                set(&mut p.category, &self.category);
                set(&mut p.location, &self.location);
                set(&mut p.description, &self.description);
                if let Some(date) = &self.joining_date {
                    p.joining_date = (!date.is_empty()).then(|| date.clone());
                }
            }
            NodeBody::Group(g) => {
                set(&mut g.display_name, &self.display_name);
                set(&mut g.title, &self.title);
                set(&mut g.department, &self.department);
                set(&mut g.description, &self.description);
            }
        }
    }
}

/// Ids must be non-blank and must not use the reserved `_` prefix.
pub fn validate_id(id: &str) -> DomainResult<()> {
    if id.trim().is_empty() {
        return Err(DomainError::validation("id", "must not be empty"));
    }
    if id.starts_with('_') {
        return Err(DomainError::validation(
            "id",
            format!("'{}' uses the reserved '_' prefix", id),
        ));
    }
    Ok(())
}

// ============================================================
// Annotation tables
// ============================================================

/// Position and size of a floating panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 500.0,
            y: 300.0,
            w: 300.0,
            h: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableContent {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl Default for TableContent {
    fn default() -> Self {
        Self {
            headers: vec!["Item".into(), "Description".into()],
            rows: vec![
                vec!["A".into(), "Desc A".into()],
                vec!["B".into(), "Desc B".into()],
            ],
        }
    }
}

/// Free-floating annotation panel; outside the parent hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationTable {
    pub id: String,
    pub tags: Tags,
    pub geometry: Geometry,
    pub content: TableContent,
    pub extra: BTreeMap<String, Value>,
}

impl AnnotationTable {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tags: [Tag::DescriptionTable].into_iter().collect(),
            geometry: Geometry::default(),
            content: TableContent::default(),
            extra: BTreeMap::new(),
        }
    }
}

pub const TABLE_ID_PREFIX: &str = "desc_table";
