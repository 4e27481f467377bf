//! Organization and group roles
//!
//! Roles a user holds in an organization or a group. These are membership
//! roles, distinct from the per-resource roles granted by the engine.

use serde::{Deserialize, Serialize};

/// User role within an organization.
///
/// The hierarchy is: Member < Admin < SuperAdmin
///
/// # Examples
///
/// ```
/// use resource_org::OrganizationRole;
///
/// assert!(OrganizationRole::Admin.is_admin());
/// assert!(!OrganizationRole::Member.is_admin());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationRole {
    /// Regular member
    Member = 0,

    /// Administers the organization and every resource in it
    Admin = 1,

    /// Platform-wide administrator
    SuperAdmin = 2,
}

impl OrganizationRole {
    /// Check if this role has admin privileges.
    ///
    /// # Returns
    ///
    /// `true` for Admin and SuperAdmin roles
    pub fn is_admin(&self) -> bool {
        *self >= OrganizationRole::Admin
    }

    /// Parse role from string representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use resource_org::OrganizationRole;
    ///
    /// assert_eq!(OrganizationRole::parse("admin"), Some(OrganizationRole::Admin));
    /// assert_eq!(OrganizationRole::parse("SUPER_ADMIN"), Some(OrganizationRole::SuperAdmin));
    /// assert_eq!(OrganizationRole::parse("owner"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "member" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            "super_admin" | "superadmin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl Default for OrganizationRole {
    fn default() -> Self {
        Self::Member
    }
}

/// User role within a group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    /// Regular member
    Member = 0,

    /// Manages the group's members
    Admin = 1,
}

impl GroupRole {
    /// Parse role from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "member" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }
}

impl Default for GroupRole {
    fn default() -> Self {
        Self::Member
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_role_hierarchy() {
        assert!(OrganizationRole::SuperAdmin > OrganizationRole::Admin);
        assert!(OrganizationRole::Admin > OrganizationRole::Member);
        assert!(OrganizationRole::SuperAdmin.is_admin());
    }

    #[test]
    fn test_organization_role_parse() {
        assert_eq!(
            OrganizationRole::parse("MEMBER"),
            Some(OrganizationRole::Member)
        );
        assert_eq!(
            OrganizationRole::parse("superadmin"),
            Some(OrganizationRole::SuperAdmin)
        );
        assert_eq!(OrganizationRole::parse("invalid"), None);
    }

    #[test]
    fn test_group_role_parse() {
        assert_eq!(GroupRole::parse("admin"), Some(GroupRole::Admin));
        assert_eq!(GroupRole::Member.as_str(), "member");
        assert_eq!(GroupRole::parse("owner"), None);
        assert_eq!(GroupRole::default(), GroupRole::Member);
    }
}
