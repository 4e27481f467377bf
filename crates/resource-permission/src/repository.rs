//! Permission repository
//!
//! Maps grants to and from edges of the generic edge store. Every grant is
//! one edge in the [`RESOURCE_NAMESPACE`]:
//!
//! ```text
//! source_id = "<resource type>:<resource id>"
//! target_id = "<holder type>:<holder id>"
//! relation  = "<role value>"
//! ```
//!
//! This encoding is shared with existing stored data and must not change.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use resource_edges::{Edge, EdgeStore};
use resource_rbac::resources::split_key;
use resource_rbac::{ResourceHolder, ResourcePermission, ResourceRole, ResourceType};

use crate::error::PermissionResult;

/// Edge namespace holding every resource grant.
pub const RESOURCE_NAMESPACE: &str = "RESOURCE";

/// Grants keyed by raw resource id.
pub type PermissionMap = HashMap<String, Vec<ResourcePermission>>;

/// Repository of stored grants.
pub struct PermissionRepository {
    store: Arc<dyn EdgeStore>,
}

impl std::fmt::Debug for PermissionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionRepository")
            .field("namespace", &RESOURCE_NAMESPACE)
            .finish()
    }
}

impl PermissionRepository {
    /// Create a repository on top of an edge store.
    pub fn new(store: Arc<dyn EdgeStore>) -> Self {
        Self { store }
    }

    /// Get the stored grants of many resources in a single round trip.
    ///
    /// Resources without grants are absent from the result.
    pub async fn get_by_resource_type_and_resource_ids(
        &self,
        resource_type: ResourceType,
        resource_ids: &[String],
    ) -> PermissionResult<PermissionMap> {
        if resource_ids.is_empty() {
            return Ok(PermissionMap::new());
        }

        let source_ids: Vec<String> = resource_ids
            .iter()
            .map(|id| resource_type.join(id))
            .collect();
        let edges = self
            .store
            .get_by_source_ids(RESOURCE_NAMESPACE, &source_ids)
            .await?;

        let mut result = PermissionMap::new();
        for permission in edges.iter().filter_map(from_edge) {
            result
                .entry(permission.resource_id.clone())
                .or_default()
                .push(permission);
        }
        Ok(result)
    }

    /// Get the stored grants of one resource, in storage order.
    pub async fn get_by_resource_type_and_resource_id(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> PermissionResult<Vec<ResourcePermission>> {
        let edges = self
            .store
            .get_by_source_id(RESOURCE_NAMESPACE, &resource_type.join(resource_id))
            .await?;
        Ok(edges.iter().filter_map(from_edge).collect())
    }

    /// Get the grant a single holder has on a resource.
    pub async fn get_by_resource_and_holder(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
        holder: ResourceHolder,
        holder_id: &str,
    ) -> PermissionResult<Option<ResourcePermission>> {
        let edge = self
            .store
            .get_by_endpoints(
                RESOURCE_NAMESPACE,
                &resource_type.join(resource_id),
                &holder.join(holder_id),
            )
            .await?;
        Ok(edge.as_ref().and_then(from_edge))
    }

    /// Get a grant by its storage id.
    pub async fn get_by_id(&self, permission_id: &str) -> PermissionResult<Option<ResourcePermission>> {
        let edge = self.store.get_by_id(permission_id).await?;
        Ok(edge
            .filter(|e| e.namespace == RESOURCE_NAMESPACE)
            .as_ref()
            .and_then(from_edge))
    }

    /// Grant one role to several users and groups at once.
    ///
    /// Writes one edge per holder. Returns the number of grants applied.
    /// Zero means nothing was applied: either there was nothing to grant, in
    /// which case no write is issued, or the store rejected the batch, which
    /// is logged and never surfaces as an error.
    pub async fn insert_batch_permission(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
        user_ids: &[String],
        group_ids: &[String],
        role: ResourceRole,
    ) -> PermissionResult<usize> {
        let holders = unique(user_ids)
            .into_iter()
            .map(|id| (ResourceHolder::User, id))
            .chain(
                unique(group_ids)
                    .into_iter()
                    .map(|id| (ResourceHolder::Group, id)),
            );
        let edges: Vec<Edge> = holders
            .map(|(holder, holder_id)| {
                to_edge(&ResourcePermission::new(
                    resource_type,
                    resource_id,
                    holder,
                    holder_id,
                    role,
                ))
            })
            .collect();

        if edges.is_empty() {
            return Ok(0);
        }

        let requested = edges.len();
        match self.store.batch_add(edges).await {
            Ok(applied) => {
                tracing::debug!(
                    resource_type = %resource_type,
                    resource_id = %resource_id,
                    role = %role,
                    requested,
                    applied,
                    "Batch grant applied"
                );
                Ok(applied)
            }
            Err(e) => {
                tracing::warn!(
                    resource_type = %resource_type,
                    resource_id = %resource_id,
                    requested,
                    error = %e,
                    "Batch grant failed"
                );
                Ok(0)
            }
        }
    }

    /// Grant a role to one holder.
    ///
    /// Returns `false` when the store failed to apply the grant; the caller
    /// may retry.
    pub async fn add_permission(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
        holder: ResourceHolder,
        holder_id: &str,
        role: ResourceRole,
    ) -> PermissionResult<bool> {
        let permission = ResourcePermission::new(resource_type, resource_id, holder, holder_id, role);
        match self.store.add(to_edge(&permission)).await {
            Ok(applied) => Ok(applied),
            Err(e) => {
                tracing::warn!(
                    resource_type = %resource_type,
                    resource_id = %resource_id,
                    holder = %holder,
                    holder_id = %holder_id,
                    error = %e,
                    "Grant not applied"
                );
                Ok(false)
            }
        }
    }

    /// Change the role of a stored grant.
    pub async fn update_role_by_id(
        &self,
        permission_id: &str,
        role: ResourceRole,
    ) -> PermissionResult<bool> {
        Ok(self.store.update_by_id(permission_id, role.value()).await?)
    }

    /// Revoke a grant by its storage id.
    pub async fn remove_by_id(&self, permission_id: &str) -> PermissionResult<bool> {
        Ok(self.store.remove_by_id(permission_id).await?)
    }

    /// Revoke the grant a holder has on a resource.
    pub async fn remove_permission_by(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
        holder: ResourceHolder,
        holder_id: &str,
    ) -> PermissionResult<bool> {
        Ok(self
            .store
            .remove_by_endpoints(
                RESOURCE_NAMESPACE,
                &resource_type.join(resource_id),
                &holder.join(holder_id),
            )
            .await?)
    }
}

fn unique(ids: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect()
}

fn to_edge(permission: &ResourcePermission) -> Edge {
    Edge::new(
        RESOURCE_NAMESPACE,
        permission.source_key(),
        permission.target_key(),
        permission.resource_role.value(),
    )
}

fn from_edge(edge: &Edge) -> Option<ResourcePermission> {
    let decoded = split_key(&edge.source_id).and_then(|(type_token, resource_id)| {
        let resource_type = ResourceType::parse(type_token)?;
        let (holder_token, holder_id) = split_key(&edge.target_id)?;
        let holder = ResourceHolder::parse(holder_token)?;
        let role = ResourceRole::parse(&edge.relation)?;
        Some(
            ResourcePermission::new(resource_type, resource_id, holder, holder_id, role)
                .with_id(edge.id.clone())
                .with_created_at(edge.created_at),
        )
    });

    if decoded.is_none() {
        tracing::warn!(
            edge_id = %edge.id,
            source_id = %edge.source_id,
            target_id = %edge.target_id,
            relation = %edge.relation,
            "Skipping undecodable grant edge"
        );
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_edges::MemoryEdgeStore;

    fn repository() -> (Arc<MemoryEdgeStore>, PermissionRepository) {
        let store = Arc::new(MemoryEdgeStore::new());
        let repo = PermissionRepository::new(store.clone());
        (store, repo)
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_add_permission_persists_edge_encoding() {
        let (store, repo) = repository();
        let applied = repo
            .add_permission(
                ResourceType::Application,
                "app-1",
                ResourceHolder::User,
                "u1",
                ResourceRole::Editor,
            )
            .await
            .unwrap();
        assert!(applied);

        let edges = store
            .get_by_source_id(RESOURCE_NAMESPACE, "application:app-1")
            .await
            .unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target_id, "user:u1");
        assert_eq!(edges[0].relation, "editor");
    }

    #[tokio::test]
    async fn test_insert_batch_expands_holders() {
        let (_, repo) = repository();
        let applied = repo
            .insert_batch_permission(
                ResourceType::Bundle,
                "b1",
                &ids(&["u1", "u2"]),
                &ids(&["g1"]),
                ResourceRole::Editor,
            )
            .await
            .unwrap();
        assert_eq!(applied, 3);

        let grants = repo
            .get_by_resource_type_and_resource_id(ResourceType::Bundle, "b1")
            .await
            .unwrap();
        let holders: Vec<(ResourceHolder, &str, ResourceRole)> = grants
            .iter()
            .map(|g| (g.resource_holder, g.resource_holder_id.as_str(), g.resource_role))
            .collect();
        assert_eq!(
            holders,
            vec![
                (ResourceHolder::User, "u1", ResourceRole::Editor),
                (ResourceHolder::User, "u2", ResourceRole::Editor),
                (ResourceHolder::Group, "g1", ResourceRole::Editor),
            ]
        );
    }

    #[tokio::test]
    async fn test_insert_batch_empty_is_noop() {
        let (store, repo) = repository();
        let applied = repo
            .insert_batch_permission(ResourceType::Bundle, "b1", &[], &[], ResourceRole::Owner)
            .await
            .unwrap();
        assert_eq!(applied, 0);
        assert_eq!(store.stats().await.writes, 0);
    }

    #[tokio::test]
    async fn test_regrant_updates_role_in_place() {
        let (_, repo) = repository();
        for role in [ResourceRole::Viewer, ResourceRole::Owner] {
            repo.add_permission(
                ResourceType::Datasource,
                "ds",
                ResourceHolder::Group,
                "g1",
                role,
            )
            .await
            .unwrap();
        }
        let grants = repo
            .get_by_resource_type_and_resource_id(ResourceType::Datasource, "ds")
            .await
            .unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].resource_role, ResourceRole::Owner);
    }

    #[tokio::test]
    async fn test_batched_lookup_groups_by_resource_id() {
        let (store, repo) = repository();
        for (app, user) in [("a", "u1"), ("a", "u2"), ("b", "u1"), ("a:x", "u3")] {
            repo.add_permission(
                ResourceType::Application,
                app,
                ResourceHolder::User,
                user,
                ResourceRole::Viewer,
            )
            .await
            .unwrap();
        }
        // Same raw id under another type must not leak in.
        repo.add_permission(
            ResourceType::Datasource,
            "a",
            ResourceHolder::User,
            "u9",
            ResourceRole::Owner,
        )
        .await
        .unwrap();

        let reads_before = store.stats().await.reads;
        let map = repo
            .get_by_resource_type_and_resource_ids(
                ResourceType::Application,
                &ids(&["a", "b", "a:x", "c"]),
            )
            .await
            .unwrap();
        assert_eq!(store.stats().await.reads, reads_before + 1);

        assert_eq!(map["a"].len(), 2);
        assert_eq!(map["b"].len(), 1);
        assert_eq!(map["a:x"][0].resource_holder_id, "u3");
        assert!(!map.contains_key("c"));
    }

    #[tokio::test]
    async fn test_add_permission_degrades_on_write_failure() {
        let (store, repo) = repository();
        store.set_fail_writes(true);
        let applied = repo
            .add_permission(
                ResourceType::Application,
                "a",
                ResourceHolder::User,
                "u1",
                ResourceRole::Owner,
            )
            .await
            .unwrap();
        assert!(!applied);
    }

    #[tokio::test]
    async fn test_insert_batch_degrades_on_write_failure() {
        let (store, repo) = repository();
        store.set_fail_writes(true);

        let applied = repo
            .insert_batch_permission(
                ResourceType::Application,
                "a",
                &ids(&["u1"]),
                &[],
                ResourceRole::Owner,
            )
            .await
            .unwrap();
        assert_eq!(applied, 0);
        assert_eq!(store.stats().await.writes, 1);

        let grants = repo
            .get_by_resource_type_and_resource_id(ResourceType::Application, "a")
            .await
            .unwrap();
        assert!(grants.is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_propagates() {
        let (store, repo) = repository();
        store.set_fail_reads(true);
        let result = repo
            .get_by_resource_type_and_resource_ids(ResourceType::Application, &ids(&["a"]))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_undecodable_edges_are_skipped() {
        let (store, repo) = repository();
        store
            .add(Edge::new(RESOURCE_NAMESPACE, "application:a", "user:u1", "superuser"))
            .await
            .unwrap();
        store
            .add(Edge::new(RESOURCE_NAMESPACE, "application:a", "user:u2", "viewer"))
            .await
            .unwrap();

        let grants = repo
            .get_by_resource_type_and_resource_id(ResourceType::Application, "a")
            .await
            .unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].resource_holder_id, "u2");
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let (_, repo) = repository();
        repo.add_permission(
            ResourceType::Application,
            "a",
            ResourceHolder::User,
            "u1",
            ResourceRole::Viewer,
        )
        .await
        .unwrap();
        let grant = repo
            .get_by_resource_and_holder(ResourceType::Application, "a", ResourceHolder::User, "u1")
            .await
            .unwrap()
            .unwrap();

        assert!(repo.update_role_by_id(&grant.id, ResourceRole::Editor).await.unwrap());
        let updated = repo.get_by_id(&grant.id).await.unwrap().unwrap();
        assert_eq!(updated.resource_role, ResourceRole::Editor);

        assert!(repo
            .remove_permission_by(ResourceType::Application, "a", ResourceHolder::User, "u1")
            .await
            .unwrap());
        assert!(repo.get_by_id(&grant.id).await.unwrap().is_none());
        assert!(!repo.remove_by_id(&grant.id).await.unwrap());
    }
}
