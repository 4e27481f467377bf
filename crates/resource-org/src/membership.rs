//! Membership domain models
//!
//! Users and the memberships linking users to groups and
//! organizations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::roles::{GroupRole, OrganizationRole};

/// A user as seen by the permission engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// User ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Avatar URL, if any
    pub avatar_url: Option<String>,
}

impl User {
    /// Creates a new user without an avatar.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar_url: None,
        }
    }

    /// Set the avatar URL.
    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

/// Group membership linking a user to a group.
///
/// # Examples
///
/// ```
/// use resource_org::{GroupMember, GroupRole};
///
/// let member = GroupMember::new("g1", "u1", GroupRole::Member);
/// assert_eq!(member.group_id, "g1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupMember {
    /// Group ID
    pub group_id: String,

    /// User ID
    pub user_id: String,

    /// Role within the group
    pub role: GroupRole,

    /// When the user joined
    pub joined_at: DateTime<Utc>,
}

impl GroupMember {
    /// Creates a new group membership joined now.
    pub fn new(group_id: impl Into<String>, user_id: impl Into<String>, role: GroupRole) -> Self {
        Self {
            group_id: group_id.into(),
            user_id: user_id.into(),
            role,
            joined_at: Utc::now(),
        }
    }
}

/// Organization membership linking a user to an organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrganizationMember {
    /// Organization ID
    pub organization_id: String,

    /// User ID
    pub user_id: String,

    /// Role within the organization
    pub role: OrganizationRole,

    /// When the user joined
    pub joined_at: DateTime<Utc>,
}

impl OrganizationMember {
    /// Creates a new organization membership joined now.
    pub fn new(
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        role: OrganizationRole,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            user_id: user_id.into(),
            role,
            joined_at: Utc::now(),
        }
    }

    /// Check if the member administers the organization.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
