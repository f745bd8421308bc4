//! Domain entities: persisted chart documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::wire::NodeRecord;

/// Flat node payload of a chart document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default, alias = "data")]
    pub nodes: Vec<NodeRecord>,
}

/// A user-customized chart snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDocument {
    #[serde(alias = "orgchart_id")]
    pub id: String,
    #[serde(alias = "orgchart_name")]
    pub name: String,
    #[serde(default, alias = "describe")]
    pub description: String,
    /// Username of the creator
    #[serde(alias = "username")]
    pub owner: String,
    /// Public charts are visible to every user
    #[serde(default, alias = "is_public")]
    pub is_public: bool,
    #[serde(default, alias = "org_data")]
    pub data: ChartData,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

impl ChartDocument {
    pub fn is_visible_to(&self, username: &str) -> bool {
        self.is_public || self.owner == username
    }

    pub fn summary(&self) -> ChartSummary {
        ChartSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            owner: self.owner.clone(),
            is_public: self.is_public,
            node_count: self.data.nodes.len(),
            updated_at: self.updated_at,
        }
    }
}

/// Listing view of a chart document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner: String,
    pub is_public: bool,
    pub node_count: usize,
    pub updated_at: DateTime<Utc>,
}
