//! Permission service
//!
//! Entry point for permission checks. Dispatches to the handler registered
//! for the resource type of the requested action, and reduces the matched
//! grants to the answers callers need: a filter, the strongest role, or a
//! pass/fail check.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use resource_edges::MemoryEdgeStore;
//! use resource_org::MemoryDirectory;
//! use resource_permission::{EngineConfig, MemoryCatalog, ResourcePermissionService};
//! use resource_rbac::ResourceAction;
//!
//! async fn example() -> Result<(), resource_permission::PermissionError> {
//!     let directory = Arc::new(MemoryDirectory::new());
//!     let service = ResourcePermissionService::try_from_parts(
//!         EngineConfig::from_env(),
//!         Arc::new(MemoryEdgeStore::new()),
//!         Arc::new(MemoryCatalog::new()),
//!         directory.clone(),
//!         directory,
//!     )?;
//!
//!     let result = service
//!         .check_resource_permission_with_error(
//!             Some("user-1"),
//!             "app-1",
//!             ResourceAction::ReadApplications,
//!         )
//!         .await;
//!     assert!(result.is_err());
//!     Ok(())
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use resource_edges::EdgeStore;
use resource_org::{GroupMembership, OrgMembership};
use resource_rbac::permissions::strongest;
use resource_rbac::{
    RequestType, ResourceAction, ResourceHolder, ResourcePermission, ResourceRole, ResourceType,
};
use serde::{Deserialize, Serialize};

use crate::catalog::ResourceCatalog;
use crate::config::EngineConfig;
use crate::error::{PermissionError, PermissionResult};
use crate::handler::{
    is_public_grant, ApplicationPermissionHandler, BundlePermissionHandler, ChannelResolver,
    DatasourcePermissionHandler, ResourcePermissionHandler,
};
use crate::repository::{PermissionMap, PermissionRepository};

/// Outcome of a single permission status check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPermissionStatus {
    /// The caller may perform the action
    pub has_permission: bool,

    /// Strongest matching role, if any
    pub role: Option<ResourceRole>,

    /// The caller was not signed in
    pub anonymous_access: bool,

    /// Access comes from a public link, marketplace listing or agency
    /// profile rather than a grant
    pub public_access: bool,
}

/// Permission service facade.
pub struct ResourcePermissionService {
    repository: Arc<PermissionRepository>,
    handlers: HashMap<ResourceType, Arc<dyn ResourcePermissionHandler>>,
}

impl std::fmt::Debug for ResourcePermissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&str> = self.handlers.keys().map(ResourceType::as_str).collect();
        types.sort_unstable();
        f.debug_struct("ResourcePermissionService")
            .field("handlers", &types)
            .finish()
    }
}

impl ResourcePermissionService {
    /// Create a service from a repository and a set of handlers.
    ///
    /// A later handler for the same resource type replaces an earlier one.
    pub fn new(
        repository: Arc<PermissionRepository>,
        handlers: Vec<Arc<dyn ResourcePermissionHandler>>,
    ) -> Self {
        let handlers = handlers
            .into_iter()
            .map(|h| (h.resource_type(), h))
            .collect();
        Self {
            repository,
            handlers,
        }
    }

    /// Create a service with the handlers for every resource type.
    pub fn from_parts(
        config: EngineConfig,
        store: Arc<dyn EdgeStore>,
        catalog: Arc<dyn ResourceCatalog>,
        groups: Arc<dyn GroupMembership>,
        orgs: Arc<dyn OrgMembership>,
    ) -> Self {
        let repository = Arc::new(PermissionRepository::new(store));
        let resolver = Arc::new(ChannelResolver::new(
            repository.clone(),
            catalog,
            groups,
            orgs,
            Arc::new(config),
        ));

        let handlers: Vec<Arc<dyn ResourcePermissionHandler>> = vec![
            Arc::new(ApplicationPermissionHandler::new(resolver.clone())),
            Arc::new(DatasourcePermissionHandler::new(resolver.clone())),
            Arc::new(BundlePermissionHandler::new(resolver)),
        ];
        Self::new(repository, handlers)
    }

    /// Create a service after validating the configuration.
    pub fn try_from_parts(
        config: EngineConfig,
        store: Arc<dyn EdgeStore>,
        catalog: Arc<dyn ResourceCatalog>,
        groups: Arc<dyn GroupMembership>,
        orgs: Arc<dyn OrgMembership>,
    ) -> PermissionResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, store, catalog, groups, orgs))
    }

    fn handler(
        &self,
        resource_type: ResourceType,
    ) -> PermissionResult<&Arc<dyn ResourcePermissionHandler>> {
        self.handlers.get(&resource_type).ok_or_else(|| {
            tracing::error!(
                resource_type = %resource_type,
                "No permission handler registered"
            );
            PermissionError::InvalidPermissionOperation(resource_type)
        })
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Get every matching grant per resource for a regular request.
    pub async fn get_all_matching_permissions(
        &self,
        user_id: Option<&str>,
        resource_ids: &[String],
        action: ResourceAction,
    ) -> PermissionResult<PermissionMap> {
        self.get_all_matching_permissions_for_request(
            user_id,
            resource_ids,
            action,
            RequestType::Normal,
        )
        .await
    }

    /// Get every matching grant per resource for a given request type.
    pub async fn get_all_matching_permissions_for_request(
        &self,
        user_id: Option<&str>,
        resource_ids: &[String],
        action: ResourceAction,
        request_type: RequestType,
    ) -> PermissionResult<PermissionMap> {
        self.handler(action.resource_type())?
            .get_all_matching_permissions(user_id, resource_ids, action, request_type)
            .await
    }

    /// Keep the resources the caller may perform `action` on, in input order.
    pub async fn filter_resource_with_permission(
        &self,
        user_id: Option<&str>,
        resource_ids: &[String],
        action: ResourceAction,
    ) -> PermissionResult<Vec<String>> {
        let matched = self
            .get_all_matching_permissions(user_id, resource_ids, action)
            .await?;

        let mut seen = HashSet::new();
        Ok(resource_ids
            .iter()
            .filter(|id| matched.get(*id).is_some_and(|g| !g.is_empty()))
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect())
    }

    /// Get the strongest matching grant per resource.
    ///
    /// Resources without a match are absent.
    pub async fn get_max_matching_permissions(
        &self,
        user_id: Option<&str>,
        resource_ids: &[String],
        action: ResourceAction,
    ) -> PermissionResult<HashMap<String, ResourcePermission>> {
        let matched = self
            .get_all_matching_permissions(user_id, resource_ids, action)
            .await?;
        Ok(reduce_to_strongest(matched))
    }

    /// Get the strongest matching grant on one resource.
    pub async fn get_max_matching_permission(
        &self,
        user_id: Option<&str>,
        resource_id: &str,
        action: ResourceAction,
    ) -> PermissionResult<Option<ResourcePermission>> {
        let mut max = self
            .get_max_matching_permissions(user_id, &[resource_id.to_string()], action)
            .await?;
        Ok(max.remove(resource_id))
    }

    /// Check that every resource has at least one matching grant.
    pub async fn have_all_enough_permissions(
        &self,
        user_id: Option<&str>,
        resource_ids: &[String],
        action: ResourceAction,
    ) -> PermissionResult<bool> {
        let max = self
            .get_max_matching_permissions(user_id, resource_ids, action)
            .await?;
        Ok(resource_ids.iter().all(|id| max.contains_key(id)))
    }

    /// Fail with [`PermissionError::NotAuthorized`] unless a grant matches.
    pub async fn check_resource_permission_with_error(
        &self,
        user_id: Option<&str>,
        resource_id: &str,
        action: ResourceAction,
    ) -> PermissionResult<()> {
        self.check_and_return_max_permission(user_id, resource_id, action)
            .await
            .map(|_| ())
    }

    /// Get the strongest matching grant, or fail with
    /// [`PermissionError::NotAuthorized`].
    pub async fn check_and_return_max_permission(
        &self,
        user_id: Option<&str>,
        resource_id: &str,
        action: ResourceAction,
    ) -> PermissionResult<ResourcePermission> {
        match self
            .get_max_matching_permission(user_id, resource_id, action)
            .await?
        {
            Some(permission) => Ok(permission),
            None => {
                tracing::debug!(
                    resource_type = %action.resource_type(),
                    resource_id = %resource_id,
                    user_id = user_id.unwrap_or_default(),
                    action = action.as_str(),
                    "Permission denied"
                );
                Err(PermissionError::not_authorized(
                    action.resource_type(),
                    resource_id,
                ))
            }
        }
    }

    /// Describe the caller's access to one resource for a request type.
    pub async fn check_user_permission_status(
        &self,
        user_id: Option<&str>,
        resource_id: &str,
        action: ResourceAction,
        request_type: RequestType,
    ) -> PermissionResult<UserPermissionStatus> {
        let matched = self
            .get_all_matching_permissions_for_request(
                user_id,
                &[resource_id.to_string()],
                action,
                request_type,
            )
            .await?;
        let best = matched
            .get(resource_id)
            .and_then(|grants| strongest(grants));

        Ok(UserPermissionStatus {
            has_permission: best.is_some(),
            role: best.map(|p| p.resource_role),
            anonymous_access: user_id.is_none(),
            public_access: best.is_some_and(is_public_grant),
        })
    }

    // ------------------------------------------------------------------
    // Grant management
    // ------------------------------------------------------------------

    /// Grant one role to several users and groups. Returns the number of
    /// grants applied.
    pub async fn insert_batch_permission(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
        user_ids: &[String],
        group_ids: &[String],
        role: ResourceRole,
    ) -> PermissionResult<usize> {
        self.repository
            .insert_batch_permission(resource_type, resource_id, user_ids, group_ids, role)
            .await
    }

    /// Grant a role to one holder.
    pub async fn add_permission(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
        holder: ResourceHolder,
        holder_id: &str,
        role: ResourceRole,
    ) -> PermissionResult<bool> {
        self.repository
            .add_permission(resource_type, resource_id, holder, holder_id, role)
            .await
    }

    /// Grant a role to a user.
    pub async fn add_permission_to_user(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
        user_id: &str,
        role: ResourceRole,
    ) -> PermissionResult<bool> {
        self.add_permission(resource_type, resource_id, ResourceHolder::User, user_id, role)
            .await
    }

    /// Grant a role to a group.
    pub async fn add_permission_to_group(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
        group_id: &str,
        role: ResourceRole,
    ) -> PermissionResult<bool> {
        self.add_permission(resource_type, resource_id, ResourceHolder::Group, group_id, role)
            .await
    }

    /// Change the role of a stored grant.
    pub async fn update_role_by_id(
        &self,
        permission_id: &str,
        role: ResourceRole,
    ) -> PermissionResult<bool> {
        self.repository.update_role_by_id(permission_id, role).await
    }

    /// Revoke a grant by id.
    pub async fn remove_by_id(&self, permission_id: &str) -> PermissionResult<bool> {
        self.repository.remove_by_id(permission_id).await
    }

    /// Revoke the grant a holder has on a resource.
    pub async fn remove_permission_by(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
        holder: ResourceHolder,
        holder_id: &str,
    ) -> PermissionResult<bool> {
        self.repository
            .remove_permission_by(resource_type, resource_id, holder, holder_id)
            .await
    }

    /// Get a stored grant by id.
    pub async fn get_by_id(&self, permission_id: &str) -> PermissionResult<Option<ResourcePermission>> {
        self.repository.get_by_id(permission_id).await
    }

    /// Get the stored grants of one resource.
    pub async fn get_by_resource_type_and_resource_id(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> PermissionResult<Vec<ResourcePermission>> {
        self.repository
            .get_by_resource_type_and_resource_id(resource_type, resource_id)
            .await
    }

    /// Get the stored grants of many resources.
    pub async fn get_by_resource_type_and_resource_ids(
        &self,
        resource_type: ResourceType,
        resource_ids: &[String],
    ) -> PermissionResult<PermissionMap> {
        self.repository
            .get_by_resource_type_and_resource_ids(resource_type, resource_ids)
            .await
    }

    /// Get the grant stored directly for a user, ignoring group grants.
    pub async fn get_user_assigned_permission(
        &self,
        user_id: &str,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> PermissionResult<Option<ResourcePermission>> {
        self.repository
            .get_by_resource_and_holder(resource_type, resource_id, ResourceHolder::User, user_id)
            .await
    }

    /// Access the underlying repository.
    pub fn repository(&self) -> &Arc<PermissionRepository> {
        &self.repository
    }
}

fn reduce_to_strongest(matched: PermissionMap) -> HashMap<String, ResourcePermission> {
    matched
        .into_iter()
        .filter_map(|(id, grants)| strongest(&grants).cloned().map(|best| (id, best)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_edges::MemoryEdgeStore;
    use resource_org::MemoryDirectory;

    use crate::catalog::MemoryCatalog;

    fn service() -> ResourcePermissionService {
        let directory = Arc::new(MemoryDirectory::new());
        ResourcePermissionService::from_parts(
            EngineConfig::default(),
            Arc::new(MemoryEdgeStore::new()),
            Arc::new(MemoryCatalog::new()),
            directory.clone(),
            directory,
        )
    }

    #[test]
    fn test_reduce_drops_empty_entries() {
        let mut matched = PermissionMap::new();
        matched.insert("a".to_string(), vec![]);
        matched.insert(
            "b".to_string(),
            vec![ResourcePermission::new(
                ResourceType::Bundle,
                "b",
                ResourceHolder::User,
                "u",
                ResourceRole::Viewer,
            )],
        );
        let max = reduce_to_strongest(matched);
        assert_eq!(max.len(), 1);
        assert!(max.contains_key("b"));
    }

    #[tokio::test]
    async fn test_missing_handler_is_invalid_operation() {
        let repository = Arc::new(PermissionRepository::new(Arc::new(MemoryEdgeStore::new())));
        let service = ResourcePermissionService::new(repository, vec![]);

        let err = service
            .get_all_matching_permissions(
                Some("u1"),
                &["a".to_string()],
                ResourceAction::ReadApplications,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PermissionError::InvalidPermissionOperation(ResourceType::Application)
        ));
    }

    #[tokio::test]
    async fn test_status_reports_stored_grant() {
        let service = service();
        service
            .add_permission_to_user(ResourceType::Application, "a", "u1", ResourceRole::Editor)
            .await
            .unwrap();

        let status = service
            .check_user_permission_status(
                Some("u1"),
                "a",
                ResourceAction::ReadApplications,
                RequestType::Normal,
            )
            .await
            .unwrap();
        assert_eq!(
            status,
            UserPermissionStatus {
                has_permission: true,
                role: Some(ResourceRole::Editor),
                anonymous_access: false,
                public_access: false,
            }
        );

        let status = service
            .check_user_permission_status(
                None,
                "a",
                ResourceAction::ReadApplications,
                RequestType::Normal,
            )
            .await
            .unwrap();
        assert!(!status.has_permission);
        assert!(status.anonymous_access);
        assert_eq!(status.role, None);
    }

    #[tokio::test]
    async fn test_status_separates_public_from_implicit_ownership() {
        use crate::catalog::ResourceVisibility;
        use resource_org::{OrganizationMember, OrganizationRole};

        let directory = Arc::new(MemoryDirectory::new());
        let catalog = Arc::new(MemoryCatalog::new());
        let service = ResourcePermissionService::from_parts(
            EngineConfig::default(),
            Arc::new(MemoryEdgeStore::new()),
            catalog.clone(),
            directory.clone(),
            directory.clone(),
        );
        catalog
            .insert(
                ResourceType::Application,
                ResourceVisibility::new("a", "org1").public_to_all(),
            )
            .await;
        directory
            .add_org_member(OrganizationMember::new("org1", "admin", OrganizationRole::Admin))
            .await;

        let admin = service
            .check_user_permission_status(
                Some("admin"),
                "a",
                ResourceAction::ReadApplications,
                RequestType::Normal,
            )
            .await
            .unwrap();
        assert_eq!(admin.role, Some(ResourceRole::Owner));
        assert!(!admin.public_access);

        let visitor = service
            .check_user_permission_status(
                Some("visitor"),
                "a",
                ResourceAction::ReadApplications,
                RequestType::Normal,
            )
            .await
            .unwrap();
        assert_eq!(visitor.role, Some(ResourceRole::Viewer));
        assert!(visitor.public_access);

        let system = service
            .check_user_permission_status(
                Some("visitor"),
                "#JS_CODE",
                ResourceAction::UseDatasources,
                RequestType::Normal,
            )
            .await
            .unwrap();
        assert!(system.has_permission);
        assert!(!system.public_access);
    }

    #[tokio::test]
    async fn test_user_assigned_permission_ignores_groups() {
        let service = service();
        service
            .add_permission_to_group(ResourceType::Bundle, "b", "g1", ResourceRole::Owner)
            .await
            .unwrap();
        assert!(service
            .get_user_assigned_permission("u1", ResourceType::Bundle, "b")
            .await
            .unwrap()
            .is_none());

        service
            .add_permission_to_user(ResourceType::Bundle, "b", "u1", ResourceRole::Viewer)
            .await
            .unwrap();
        let assigned = service
            .get_user_assigned_permission("u1", ResourceType::Bundle, "b")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(assigned.resource_role, ResourceRole::Viewer);
    }
}
