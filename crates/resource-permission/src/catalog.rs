//! Resource catalog
//!
//! Read-only view of the resource metadata that affects permission
//! resolution: which organization owns a resource and which public flags it
//! carries. Resource documents themselves are managed elsewhere.

use std::collections::HashMap;

use async_trait::async_trait;
use resource_rbac::ResourceType;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::PermissionResult;

/// Visibility metadata of one resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceVisibility {
    /// Resource ID
    pub resource_id: String,

    /// Owning organization, if known
    pub organization_id: Option<String>,

    /// Reachable through a public link
    pub public_to_all: bool,

    /// Listed on the marketplace
    pub public_to_marketplace: bool,

    /// Shown on an agency profile
    pub agency_profile: bool,
}

impl ResourceVisibility {
    /// Create private visibility for a resource owned by an organization.
    pub fn new(resource_id: impl Into<String>, organization_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            organization_id: Some(organization_id.into()),
            ..Default::default()
        }
    }

    /// Mark the resource public to everyone holding the link.
    pub fn public_to_all(mut self) -> Self {
        self.public_to_all = true;
        self
    }

    /// Mark the resource as listed on the marketplace.
    pub fn public_to_marketplace(mut self) -> Self {
        self.public_to_marketplace = true;
        self
    }

    /// Mark the resource as shown on an agency profile.
    pub fn agency_profile(mut self) -> Self {
        self.agency_profile = true;
        self
    }
}

/// Resource metadata lookups.
#[async_trait]
pub trait ResourceCatalog: Send + Sync {
    /// Describe many resources of one type in a single call.
    ///
    /// Unknown ids are absent from the result.
    async fn describe(
        &self,
        resource_type: ResourceType,
        resource_ids: &[String],
    ) -> PermissionResult<HashMap<String, ResourceVisibility>>;
}

/// In-memory catalog.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    resources: RwLock<HashMap<(ResourceType, String), ResourceVisibility>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a resource.
    pub async fn insert(&self, resource_type: ResourceType, visibility: ResourceVisibility) {
        let key = (resource_type, visibility.resource_id.clone());
        self.resources.write().await.insert(key, visibility);
    }

    /// Forget a resource.
    pub async fn remove(&self, resource_type: ResourceType, resource_id: &str) {
        self.resources
            .write()
            .await
            .remove(&(resource_type, resource_id.to_string()));
    }
}

#[async_trait]
impl ResourceCatalog for MemoryCatalog {
    async fn describe(
        &self,
        resource_type: ResourceType,
        resource_ids: &[String],
    ) -> PermissionResult<HashMap<String, ResourceVisibility>> {
        let resources = self.resources.read().await;
        Ok(resource_ids
            .iter()
            .filter_map(|id| {
                resources
                    .get(&(resource_type, id.clone()))
                    .map(|v| (id.clone(), v.clone()))
            })
            .collect())
    }
}
