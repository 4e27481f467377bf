//! Membership lookups
//!
//! Read-only contracts the permission engine uses to fan grants out to group
//! members, recognize organization admins and resolve user records. Storage
//! of memberships is owned elsewhere; [`MemoryDirectory`] backs tests and
//! single-process deployments.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::membership::{GroupMember, OrganizationMember, User};
use crate::roles::OrganizationRole;

/// Directory error types.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Backend unavailable or failed
    #[error("Directory backend error: {0}")]
    Backend(String),
}

/// Result type for directory lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Group membership lookups.
#[async_trait]
pub trait GroupMembership: Send + Sync {
    /// Get one page of a group's members. Pages start at 1.
    async fn get_group_members(
        &self,
        group_id: &str,
        page: usize,
        page_size: usize,
    ) -> DirectoryResult<Vec<GroupMember>>;

    /// Get the ids of every group the user belongs to.
    async fn get_user_group_ids(&self, user_id: &str) -> DirectoryResult<HashSet<String>>;
}

/// Organization membership lookups.
#[async_trait]
pub trait OrgMembership: Send + Sync {
    /// Get the user's role in every organization they belong to.
    async fn get_user_org_roles(
        &self,
        user_id: &str,
    ) -> DirectoryResult<HashMap<String, OrganizationRole>>;
}

/// User record lookups.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve user ids; unknown ids are absent from the result.
    async fn get_by_ids(&self, ids: &[String]) -> DirectoryResult<HashMap<String, User>>;
}

/// In-memory directory implementing every lookup contract.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: RwLock<HashMap<String, User>>,
    group_members: RwLock<Vec<GroupMember>>,
    org_members: RwLock<Vec<OrganizationMember>>,
    member_page_calls: AtomicU64,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a user.
    pub async fn add_user(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    /// Remove a user record, leaving memberships untouched.
    pub async fn remove_user(&self, user_id: &str) {
        self.users.write().await.remove(user_id);
    }

    /// Add a user to a group. Members are listed in the order they were added.
    pub async fn add_group_member(&self, member: GroupMember) {
        let mut members = self.group_members.write().await;
        if !members
            .iter()
            .any(|m| m.group_id == member.group_id && m.user_id == member.user_id)
        {
            members.push(member);
        }
    }

    /// Add a user to an organization, replacing an existing membership.
    pub async fn add_org_member(&self, member: OrganizationMember) {
        let mut members = self.org_members.write().await;
        members.retain(|m| {
            !(m.organization_id == member.organization_id && m.user_id == member.user_id)
        });
        members.push(member);
    }

    /// Number of group member pages served so far.
    pub fn member_page_calls(&self) -> u64 {
        self.member_page_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl GroupMembership for MemoryDirectory {
    async fn get_group_members(
        &self,
        group_id: &str,
        page: usize,
        page_size: usize,
    ) -> DirectoryResult<Vec<GroupMember>> {
        self.member_page_calls.fetch_add(1, Ordering::Relaxed);
        let skip = page.saturating_sub(1) * page_size;
        let members = self.group_members.read().await;
        Ok(members
            .iter()
            .filter(|m| m.group_id == group_id)
            .skip(skip)
            .take(page_size)
            .cloned()
            .collect())
    }

    async fn get_user_group_ids(&self, user_id: &str) -> DirectoryResult<HashSet<String>> {
        let members = self.group_members.read().await;
        Ok(members
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.group_id.clone())
            .collect())
    }
}

#[async_trait]
impl OrgMembership for MemoryDirectory {
    async fn get_user_org_roles(
        &self,
        user_id: &str,
    ) -> DirectoryResult<HashMap<String, OrganizationRole>> {
        let members = self.org_members.read().await;
        Ok(members
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| (m.organization_id.clone(), m.role))
            .collect())
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn get_by_ids(&self, ids: &[String]) -> DirectoryResult<HashMap<String, User>> {
        let users = self.users.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| users.get(id).map(|u| (id.clone(), u.clone())))
            .collect())
    }
}
