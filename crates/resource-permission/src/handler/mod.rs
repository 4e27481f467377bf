//! Resource type handlers
//!
//! One handler per [`ResourceType`] resolves the grants that let a caller
//! perform an action on a batch of resources. Every handler composes the
//! same channels through [`ChannelResolver`]:
//!
//! ```text
//! anonymous caller     ─→ anonymous channel
//! authenticated caller ─→ stored grants ┬─ merged per resource id
//!                         public access ┤
//!                         org admin     ┘
//! ```
//!
//! Handlers differ only in the public rule they plug in and in how they
//! pre-partition ids (system datasources never reach storage).

mod application;
mod bundle;
mod datasource;

pub use application::ApplicationPermissionHandler;
pub use bundle::BundlePermissionHandler;
pub use datasource::DatasourcePermissionHandler;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use resource_org::{GroupMembership, OrgMembership, OrganizationRole};
use resource_rbac::{
    RequestType, ResourceAction, ResourceHolder, ResourcePermission, ResourceRole, ResourceType,
    ANONYMOUS_USER_ID,
};

use crate::catalog::{ResourceCatalog, ResourceVisibility};
use crate::config::{EngineConfig, WorkspaceMode};
use crate::error::{PermissionError, PermissionResult};
use crate::repository::{PermissionMap, PermissionRepository};

/// Decides whether a resource is publicly reachable for a request.
///
/// Arguments are the resource metadata, the request type, whether the caller
/// is anonymous, and the engine configuration.
pub type PublicRule = fn(&ResourceVisibility, RequestType, bool, &EngineConfig) -> bool;

/// Per resource type permission resolution.
#[async_trait]
pub trait ResourcePermissionHandler: Send + Sync {
    /// Resource type served by this handler.
    fn resource_type(&self) -> ResourceType;

    /// Get every grant that lets the caller perform `action` on each resource.
    ///
    /// `user_id` is `None` for an anonymous caller. Resources without any
    /// matching grant may be absent from the map.
    async fn get_all_matching_permissions(
        &self,
        user_id: Option<&str>,
        resource_ids: &[String],
        action: ResourceAction,
        request_type: RequestType,
    ) -> PermissionResult<PermissionMap>;
}

/// Shared channel composition used by every handler.
#[derive(Clone)]
pub struct ChannelResolver {
    repository: Arc<PermissionRepository>,
    catalog: Arc<dyn ResourceCatalog>,
    groups: Arc<dyn GroupMembership>,
    orgs: Arc<dyn OrgMembership>,
    config: Arc<EngineConfig>,
}

impl std::fmt::Debug for ChannelResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChannelResolver {
    /// Create a resolver over the engine collaborators.
    pub fn new(
        repository: Arc<PermissionRepository>,
        catalog: Arc<dyn ResourceCatalog>,
        groups: Arc<dyn GroupMembership>,
        orgs: Arc<dyn OrgMembership>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            repository,
            catalog,
            groups,
            orgs,
            config,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve grants for a batch of resources.
    ///
    /// Without a `public_rule` the anonymous and public channels never match.
    pub async fn resolve(
        &self,
        resource_type: ResourceType,
        user_id: Option<&str>,
        resource_ids: &[String],
        action: ResourceAction,
        request_type: RequestType,
        public_rule: Option<PublicRule>,
    ) -> PermissionResult<PermissionMap> {
        if resource_ids.is_empty() {
            return Ok(PermissionMap::new());
        }

        match user_id {
            None => {
                self.anonymous_channel(resource_type, resource_ids, action, request_type, public_rule)
                    .await
            }
            Some(user_id) => {
                self.authenticated_channels(
                    resource_type,
                    user_id,
                    resource_ids,
                    action,
                    request_type,
                    public_rule,
                )
                .await
            }
        }
    }

    async fn anonymous_channel(
        &self,
        resource_type: ResourceType,
        resource_ids: &[String],
        action: ResourceAction,
        request_type: RequestType,
        public_rule: Option<PublicRule>,
    ) -> PermissionResult<PermissionMap> {
        let Some(rule) = public_rule else {
            return Ok(PermissionMap::new());
        };
        if !action.is_read_action() {
            return Ok(PermissionMap::new());
        }

        let visibility = self.catalog.describe(resource_type, resource_ids).await?;
        let mut result = PermissionMap::new();
        for (resource_id, vis) in &visibility {
            if rule(vis, request_type, true, &self.config) {
                push(
                    &mut result,
                    synthesize(resource_type, resource_id, ANONYMOUS_USER_ID, ResourceRole::Viewer),
                );
            }
        }

        tracing::debug!(
            resource_type = %resource_type,
            requested = resource_ids.len(),
            matched = result.len(),
            "Resolved anonymous access"
        );
        Ok(result)
    }

    async fn authenticated_channels(
        &self,
        resource_type: ResourceType,
        user_id: &str,
        resource_ids: &[String],
        action: ResourceAction,
        request_type: RequestType,
        public_rule: Option<PublicRule>,
    ) -> PermissionResult<PermissionMap> {
        let (stored, group_ids, org_roles, visibility) = tokio::try_join!(
            self.repository
                .get_by_resource_type_and_resource_ids(resource_type, resource_ids),
            async {
                self.groups
                    .get_user_group_ids(user_id)
                    .await
                    .map_err(PermissionError::from)
            },
            async {
                self.orgs
                    .get_user_org_roles(user_id)
                    .await
                    .map_err(PermissionError::from)
            },
            self.catalog.describe(resource_type, resource_ids),
        )?;

        let mut result = PermissionMap::new();

        for (resource_id, grants) in stored {
            if !self.passes_org_gate(visibility.get(&resource_id), &org_roles) {
                tracing::debug!(
                    resource_type = %resource_type,
                    resource_id = %resource_id,
                    user_id = %user_id,
                    "Ignoring grants outside the user's organizations"
                );
                continue;
            }
            grants
                .into_iter()
                .filter(|g| held_by(g, user_id, &group_ids))
                .filter(|g| action.can_be_accessed_by(g.resource_role))
                .for_each(|g| push(&mut result, g));
        }

        for (resource_id, vis) in &visibility {
            let is_org_admin = vis
                .organization_id
                .as_ref()
                .and_then(|org| org_roles.get(org))
                .is_some_and(OrganizationRole::is_admin);
            if is_org_admin {
                push(
                    &mut result,
                    synthesize(resource_type, resource_id, user_id, ResourceRole::Owner),
                );
            }
        }

        if let Some(rule) = public_rule {
            if action.is_read_action() {
                for (resource_id, vis) in &visibility {
                    if rule(vis, request_type, false, &self.config) {
                        push(
                            &mut result,
                            synthesize(resource_type, resource_id, user_id, ResourceRole::Viewer),
                        );
                    }
                }
            }
        }

        tracing::debug!(
            resource_type = %resource_type,
            user_id = %user_id,
            requested = resource_ids.len(),
            matched = result.len(),
            "Resolved permissions"
        );
        Ok(result)
    }

    fn passes_org_gate(
        &self,
        visibility: Option<&ResourceVisibility>,
        org_roles: &HashMap<String, OrganizationRole>,
    ) -> bool {
        match self.config.workspace_mode {
            WorkspaceMode::Enterprise => true,
            WorkspaceMode::Saas => visibility
                .and_then(|v| v.organization_id.as_ref())
                .map_or(true, |org| org_roles.contains_key(org)),
        }
    }
}

fn held_by(grant: &ResourcePermission, user_id: &str, group_ids: &HashSet<String>) -> bool {
    match grant.resource_holder {
        ResourceHolder::User => grant.resource_holder_id == user_id,
        ResourceHolder::Group => group_ids.contains(&grant.resource_holder_id),
    }
}

/// Build a grant that is resolved at runtime and never stored.
pub(crate) fn synthesize(
    resource_type: ResourceType,
    resource_id: &str,
    holder_id: &str,
    role: ResourceRole,
) -> ResourcePermission {
    ResourcePermission::new(resource_type, resource_id, ResourceHolder::User, holder_id, role)
}

/// Check whether a grant was produced by a public access rule.
///
/// Public rules are the only channels that synthesize `Viewer` grants;
/// organization admins and system datasources synthesize `Owner`.
pub(crate) fn is_public_grant(permission: &ResourcePermission) -> bool {
    permission.is_synthesized() && permission.resource_role == ResourceRole::Viewer
}

fn push(result: &mut PermissionMap, permission: ResourcePermission) {
    result
        .entry(permission.resource_id.clone())
        .or_default()
        .push(permission);
}
