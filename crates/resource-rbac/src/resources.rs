//! # Resource Types and Holders
//!
//! Defines the kinds of resources grants can be issued on and the kinds of
//! holders they can be issued to, together with the composite keys used to
//! persist them.

use serde::{Deserialize, Serialize};

/// Separator between the type token and the raw id in a composite key.
pub const KEY_SEPARATOR: char = ':';

/// Resource types that can carry grants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Low-code application.
    Application,
    /// Datasource used by application queries.
    Datasource,
    /// Bundle of applications.
    Bundle,
}

impl ResourceType {
    /// Get the persisted token of the resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Application => "application",
            ResourceType::Datasource => "datasource",
            ResourceType::Bundle => "bundle",
        }
    }

    /// Parse resource type from string representation.
    ///
    /// # Example
    ///
    /// ```
    /// use resource_rbac::ResourceType;
    ///
    /// assert_eq!(ResourceType::parse("application"), Some(ResourceType::Application));
    /// assert_eq!(ResourceType::parse("apps"), Some(ResourceType::Application));
    /// assert_eq!(ResourceType::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "application" | "applications" | "app" | "apps" => Some(ResourceType::Application),
            "datasource" | "datasources" => Some(ResourceType::Datasource),
            "bundle" | "bundles" => Some(ResourceType::Bundle),
            _ => None,
        }
    }

    /// Build the composite key `"<type>:<id>"` for a resource id.
    ///
    /// Identical raw ids of different resource types never collide.
    ///
    /// # Example
    ///
    /// ```
    /// use resource_rbac::ResourceType;
    ///
    /// assert_eq!(ResourceType::Bundle.join("b-1"), "bundle:b-1");
    /// ```
    pub fn join(&self, resource_id: &str) -> String {
        join_key(self.as_str(), resource_id)
    }

    /// Get all resource types.
    pub fn all() -> Vec<Self> {
        vec![
            ResourceType::Application,
            ResourceType::Datasource,
            ResourceType::Bundle,
        ]
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a grant is issued to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceHolder {
    /// A single user.
    User,
    /// A group; every member inherits the grant.
    Group,
}

impl ResourceHolder {
    /// Get the persisted token of the holder type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceHolder::User => "user",
            ResourceHolder::Group => "group",
        }
    }

    /// Parse holder type from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" | "users" => Some(ResourceHolder::User),
            "group" | "groups" => Some(ResourceHolder::Group),
            _ => None,
        }
    }

    /// Build the composite key `"<holder>:<id>"` for a holder id.
    pub fn join(&self, holder_id: &str) -> String {
        join_key(self.as_str(), holder_id)
    }
}

impl std::fmt::Display for ResourceHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn join_key(prefix: &str, id: &str) -> String {
    format!("{}{}{}", prefix, KEY_SEPARATOR, id)
}

/// Split a composite key into its type token and raw id.
///
/// Only the first separator is significant, so raw ids may themselves
/// contain `:`.
///
/// # Example
///
/// ```
/// use resource_rbac::resources::split_key;
///
/// assert_eq!(split_key("application:a:1"), Some(("application", "a:1")));
/// assert_eq!(split_key("no-separator"), None);
/// ```
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(KEY_SEPARATOR)
}

/// Get the raw id out of a composite key.
///
/// Keys without a separator are returned unchanged.
pub fn parse_id(key: &str) -> &str {
    split_key(key).map(|(_, id)| id).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_parsing() {
        assert_eq!(
            ResourceType::parse("application"),
            Some(ResourceType::Application)
        );
        assert_eq!(ResourceType::parse("app"), Some(ResourceType::Application));
        assert_eq!(
            ResourceType::parse("DATASOURCE"),
            Some(ResourceType::Datasource)
        );
        assert_eq!(ResourceType::parse("bundles"), Some(ResourceType::Bundle));
        assert_eq!(ResourceType::parse("folder"), None);
    }

    #[test]
    fn test_composite_keys_do_not_collide() {
        let app = ResourceType::Application.join("42");
        let ds = ResourceType::Datasource.join("42");
        assert_ne!(app, ds);
        assert_eq!(app, "application:42");
        assert_eq!(ResourceHolder::Group.join("g1"), "group:g1");
    }

    #[test]
    fn test_parse_id_keeps_inner_separators() {
        assert_eq!(parse_id("datasource:#QUICK:REST"), "#QUICK:REST");
        assert_eq!(parse_id("plain"), "plain");
        assert_eq!(split_key("user:u1"), Some(("user", "u1")));
    }

    #[test]
    fn test_holder_parsing() {
        assert_eq!(ResourceHolder::parse("user"), Some(ResourceHolder::User));
        assert_eq!(ResourceHolder::parse("Groups"), Some(ResourceHolder::Group));
        assert_eq!(ResourceHolder::parse("team"), None);
    }

    #[test]
    fn test_all_resources_count() {
        assert_eq!(ResourceType::all().len(), 3);
    }
}
