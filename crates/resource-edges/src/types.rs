//! Edge records
//!
//! An edge is a directed `(source, target, relation)` triple scoped by a
//! namespace. The store knows nothing about what the keys mean.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A directed edge between two composite keys.
///
/// At most one edge exists per `(namespace, source_id, target_id)`.
///
/// # Example
///
/// ```
/// use resource_edges::Edge;
///
/// let edge = Edge::new("RESOURCE", "application:a1", "user:u1", "owner");
/// assert!(!edge.id.is_empty());
/// assert_eq!(edge.endpoints(), ("RESOURCE", "application:a1", "user:u1"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Edge {
    /// Unique edge id
    pub id: String,

    /// Namespace the edge belongs to
    pub namespace: String,

    /// Source key
    pub source_id: String,

    /// Target key
    pub target_id: String,

    /// Relation carried by the edge
    pub relation: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Edge {
    /// Create a new edge with a fresh UUID v7 id.
    pub fn new(
        namespace: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(),
            namespace: namespace.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation: relation.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The unique key of the edge inside the store.
    pub fn endpoints(&self) -> (&str, &str, &str) {
        (&self.namespace, &self.source_id, &self.target_id)
    }

    /// Check whether the edge connects the given endpoints.
    pub fn connects(&self, namespace: &str, source_id: &str, target_id: &str) -> bool {
        self.namespace == namespace && self.source_id == source_id && self.target_id == target_id
    }
}
