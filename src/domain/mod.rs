//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod employee;
pub mod entities;
pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod node;
pub mod wire;

pub use arena::{NodeData, PreOrder, TreeArena, TreeNode};
pub use builder::{ForestBuilder, LinkPreference};
pub use employee::{
    DepartmentFilter, DepartmentGroupKey, DirectReport, EmployeeRecord, ManagerKey,
};
pub use entities::{ChartData, ChartDocument, ChartSummary};
pub use error::{DomainError, DomainResult};
pub use graph::{Direction, NodeGraph, ReparentOutcome, TablePatch};
pub use hierarchy::{build_hierarchy, BuildOptions};
pub use node::{
    AnnotationTable, Geometry, GroupDetails, Node, NodeBody, NodePatch, PersonDetails,
    TableContent, Tag, Tags, TemplateKind,
};
pub use wire::{ChartEntry, NodeRecord};
