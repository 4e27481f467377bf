//! # Resource Roles
//!
//! Roles a holder can be granted on a single resource.
//! The hierarchy is: Viewer < Editor < Owner

use serde::{Deserialize, Serialize};

/// Role granted to a user or group on a resource.
///
/// The weight and value of each role are persisted as part of every grant,
/// so they must never be reordered or reused.
///
/// # Examples
///
/// ```
/// use resource_rbac::ResourceRole;
///
/// assert!(ResourceRole::Owner > ResourceRole::Editor);
/// assert_eq!(ResourceRole::Editor.weight(), 2);
/// assert_eq!(ResourceRole::parse("owner"), Some(ResourceRole::Owner));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceRole {
    /// Can view the resource
    Viewer = 1,

    /// Can view and modify the resource
    Editor = 2,

    /// Full control, including sharing and deletion
    Owner = 3,
}

impl ResourceRole {
    /// Stable integer weight used to pick the strongest grant.
    pub fn weight(&self) -> u8 {
        *self as u8
    }

    /// Persisted value token stored as the edge relation.
    pub fn value(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
            Self::Owner => "owner",
        }
    }

    /// Parse role from its persisted value (case-insensitive).
    ///
    /// # Returns
    ///
    /// `Some(ResourceRole)` if valid, `None` otherwise
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "editor" => Some(Self::Editor),
            "owner" => Some(Self::Owner),
            _ => None,
        }
    }

    /// Check whether this role is at least as strong as `other`.
    pub fn covers(&self, other: ResourceRole) -> bool {
        self.weight() >= other.weight()
    }

    /// Human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Viewer => "Viewer",
            Self::Editor => "Editor",
            Self::Owner => "Owner",
        }
    }

    /// All roles, weakest first.
    pub fn all() -> [ResourceRole; 3] {
        [Self::Viewer, Self::Editor, Self::Owner]
    }
}

impl std::fmt::Display for ResourceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.value())
    }
}
