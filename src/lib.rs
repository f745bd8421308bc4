//! orgchart: org chart hierarchies from HR employee records, and editable
//! chart snapshots.
//!
//! Layers, innermost first:
//! - [`domain`]: records, keys, the node graph and the hierarchy builder
//! - [`application`]: services over the store traits
//! - [`infrastructure`]: JSON stores, TTL cache, service wiring
//! - [`cli`]: command line

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
