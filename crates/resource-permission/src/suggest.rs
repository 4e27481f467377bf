//! Admin suggestions
//!
//! Names the people a user should ask for access to an application: its
//! direct owners first, then members of owner groups.

use std::collections::HashSet;
use std::sync::Arc;

use resource_org::{GroupMembership, User, UserDirectory};
use resource_rbac::{ResourceHolder, ResourceRole, ResourceType};

use crate::config::EngineConfig;
use crate::error::PermissionResult;
use crate::repository::PermissionRepository;

/// Suggests application admins.
pub struct SuggestAdminService {
    repository: Arc<PermissionRepository>,
    groups: Arc<dyn GroupMembership>,
    users: Arc<dyn UserDirectory>,
    config: Arc<EngineConfig>,
}

impl std::fmt::Debug for SuggestAdminService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestAdminService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SuggestAdminService {
    /// Create a suggestion service.
    pub fn new(
        repository: Arc<PermissionRepository>,
        groups: Arc<dyn GroupMembership>,
        users: Arc<dyn UserDirectory>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            repository,
            groups,
            users,
            config,
        }
    }

    /// Get up to `limit` admins of an application.
    ///
    /// Direct owners come first in grant order, followed by members of owner
    /// groups. Ids the user directory cannot resolve are dropped.
    pub async fn get_application_admin_users(
        &self,
        application_id: &str,
        limit: usize,
    ) -> PermissionResult<Vec<User>> {
        let admin_ids = self.get_suggest_admin_ids(application_id, limit).await?;
        if admin_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut users = self.users.get_by_ids(&admin_ids).await?;
        Ok(admin_ids.iter().filter_map(|id| users.remove(id)).collect())
    }

    /// Get the display names of an application's admins, space separated.
    pub async fn get_suggest_app_admin_names(&self, application_id: &str) -> PermissionResult<String> {
        let users = self
            .get_application_admin_users(application_id, self.config.admin_display_limit)
            .await?;
        Ok(users
            .iter()
            .map(|u| u.name.as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }

    async fn get_suggest_admin_ids(
        &self,
        application_id: &str,
        limit: usize,
    ) -> PermissionResult<Vec<String>> {
        let grants = self
            .repository
            .get_by_resource_type_and_resource_id(ResourceType::Application, application_id)
            .await?;

        let owners = grants
            .iter()
            .filter(|g| g.resource_role == ResourceRole::Owner);
        let mut admin_ids: Vec<String> = Vec::new();
        let mut owner_group_ids: Vec<&str> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for grant in owners {
            match grant.resource_holder {
                ResourceHolder::User => {
                    if seen.insert(grant.resource_holder_id.clone()) {
                        admin_ids.push(grant.resource_holder_id.clone());
                    }
                }
                ResourceHolder::Group => owner_group_ids.push(&grant.resource_holder_id),
            }
        }

        if admin_ids.len() >= limit {
            admin_ids.truncate(limit);
            return Ok(admin_ids);
        }

        for group_id in owner_group_ids {
            let members = self
                .groups
                .get_group_members(group_id, 1, self.config.admin_member_page_size)
                .await?;
            for member in members {
                if seen.insert(member.user_id.clone()) {
                    admin_ids.push(member.user_id);
                    if admin_ids.len() >= limit {
                        return Ok(admin_ids);
                    }
                }
            }
        }

        tracing::debug!(
            application_id = %application_id,
            admins = admin_ids.len(),
            limit,
            "Collected admin suggestions"
        );
        Ok(admin_ids)
    }
}
