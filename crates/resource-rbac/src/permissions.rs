//! # Permissions
//!
//! The grant record resolved by the engine. A grant ties one holder (user or
//! group) to one resource with a role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resources::{ResourceHolder, ResourceType};
use crate::roles::ResourceRole;

/// Holder id used for grants synthesized for callers that are not signed in.
pub const ANONYMOUS_USER_ID: &str = "anonymousId";

/// A grant of a role on a resource to a user or group.
///
/// Grants loaded from storage carry the storage id. Grants synthesized by the
/// engine (public access, system resources, organization admins) have an
/// empty id and are never persisted.
///
/// # Example
///
/// ```
/// use resource_rbac::{ResourceHolder, ResourcePermission, ResourceRole, ResourceType};
///
/// let grant = ResourcePermission::new(
///     ResourceType::Application,
///     "app-1",
///     ResourceHolder::User,
///     "user-1",
///     ResourceRole::Editor,
/// );
/// assert!(grant.owned_by_user());
/// assert!(grant.is_synthesized());
/// assert_eq!(grant.source_key(), "application:app-1");
/// assert_eq!(grant.target_key(), "user:user-1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourcePermission {
    /// Storage id; empty for synthesized grants.
    #[serde(default)]
    pub id: String,
    /// Type of the resource.
    pub resource_type: ResourceType,
    /// Raw resource id.
    pub resource_id: String,
    /// Kind of holder the grant is issued to.
    pub resource_holder: ResourceHolder,
    /// Raw user or group id.
    pub resource_holder_id: String,
    /// Granted role.
    pub resource_role: ResourceRole,
    /// When the grant was created.
    pub created_at: DateTime<Utc>,
}

impl ResourcePermission {
    /// Create a grant that has not been persisted yet.
    pub fn new(
        resource_type: ResourceType,
        resource_id: impl Into<String>,
        resource_holder: ResourceHolder,
        resource_holder_id: impl Into<String>,
        resource_role: ResourceRole,
    ) -> Self {
        Self {
            id: String::new(),
            resource_type,
            resource_id: resource_id.into(),
            resource_holder,
            resource_holder_id: resource_holder_id.into(),
            resource_role,
            created_at: Utc::now(),
        }
    }

    /// Set the storage id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Check if this grant is held by a user.
    pub fn owned_by_user(&self) -> bool {
        self.resource_holder == ResourceHolder::User
    }

    /// Check if this grant is held by a group.
    pub fn owned_by_group(&self) -> bool {
        self.resource_holder == ResourceHolder::Group
    }

    /// Check if this grant was produced by the engine rather than loaded.
    pub fn is_synthesized(&self) -> bool {
        self.id.is_empty()
    }

    /// Composite key of the resource (`"<type>:<resource_id>"`).
    pub fn source_key(&self) -> String {
        self.resource_type.join(&self.resource_id)
    }

    /// Composite key of the holder (`"<holder>:<holder_id>"`).
    pub fn target_key(&self) -> String {
        self.resource_holder.join(&self.resource_holder_id)
    }
}

/// Pick the strongest grant.
///
/// The highest role weight wins. Among equal weights, stored grants win over
/// synthesized ones, then the smallest id wins, so the choice is stable for
/// the same input regardless of order.
///
/// # Example
///
/// ```
/// use resource_rbac::permissions::strongest;
/// use resource_rbac::{ResourceHolder, ResourcePermission, ResourceRole, ResourceType};
///
/// let viewer = ResourcePermission::new(
///     ResourceType::Bundle, "b", ResourceHolder::User, "u", ResourceRole::Viewer,
/// );
/// let owner = ResourcePermission::new(
///     ResourceType::Bundle, "b", ResourceHolder::Group, "g", ResourceRole::Owner,
/// );
/// let grants = vec![viewer, owner];
/// assert_eq!(strongest(&grants).unwrap().resource_role, ResourceRole::Owner);
/// ```
pub fn strongest(permissions: &[ResourcePermission]) -> Option<&ResourcePermission> {
    permissions.iter().reduce(|best, candidate| {
        if outranks(candidate, best) {
            candidate
        } else {
            best
        }
    })
}

fn outranks(candidate: &ResourcePermission, current: &ResourcePermission) -> bool {
    let (cw, bw) = (candidate.resource_role.weight(), current.resource_role.weight());
    if cw != bw {
        return cw > bw;
    }
    match (candidate.is_synthesized(), current.is_synthesized()) {
        (false, true) => true,
        (true, false) => false,
        _ => candidate.id < current.id,
    }
}
