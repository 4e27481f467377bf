//! # Actions
//!
//! Actions a caller can request on a resource. Every action belongs to one
//! resource type and implies the minimum role a grant must carry to satisfy it.

use serde::{Deserialize, Serialize};

use crate::resources::ResourceType;
use crate::roles::ResourceRole;

/// Actions that can be performed on resources.
///
/// The resource type selects the handler that resolves the request; the
/// required role is the threshold handlers apply when filtering grants.
///
/// # Example
///
/// ```
/// use resource_rbac::{ResourceAction, ResourceRole, ResourceType};
///
/// let action = ResourceAction::EditApplications;
/// assert_eq!(action.resource_type(), ResourceType::Application);
/// assert!(action.can_be_accessed_by(ResourceRole::Owner));
/// assert!(!action.can_be_accessed_by(ResourceRole::Viewer));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceAction {
    // Application
    /// View or run an application.
    ReadApplications,
    /// Publish a new application version.
    PublishApplications,
    /// Modify an application.
    EditApplications,
    /// Toggle public access of an application.
    SetApplicationsPublic,
    /// Toggle marketplace listing of an application.
    SetApplicationsPublicToMarketplace,
    /// Share, move or delete an application.
    ManageApplications,

    // Datasource
    /// Run queries against a datasource.
    UseDatasources,
    /// View datasource configuration.
    ReadDatasources,
    /// Modify, share or delete a datasource.
    ManageDatasources,

    // Bundle
    /// View a bundle.
    ReadBundles,
    /// Publish a bundle.
    PublishBundles,
    /// Modify a bundle.
    EditBundles,
    /// Toggle public access of a bundle.
    SetBundlesPublic,
    /// Share, move or delete a bundle.
    ManageBundles,
}

impl ResourceAction {
    /// Get the resource type this action applies to.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourceAction::ReadApplications
            | ResourceAction::PublishApplications
            | ResourceAction::EditApplications
            | ResourceAction::SetApplicationsPublic
            | ResourceAction::SetApplicationsPublicToMarketplace
            | ResourceAction::ManageApplications => ResourceType::Application,
            ResourceAction::UseDatasources
            | ResourceAction::ReadDatasources
            | ResourceAction::ManageDatasources => ResourceType::Datasource,
            ResourceAction::ReadBundles
            | ResourceAction::PublishBundles
            | ResourceAction::EditBundles
            | ResourceAction::SetBundlesPublic
            | ResourceAction::ManageBundles => ResourceType::Bundle,
        }
    }

    /// Get the minimum role a grant must carry to satisfy this action.
    pub fn required_role(&self) -> ResourceRole {
        match self {
            ResourceAction::ReadApplications
            | ResourceAction::UseDatasources
            | ResourceAction::ReadDatasources
            | ResourceAction::ReadBundles => ResourceRole::Viewer,
            ResourceAction::PublishApplications
            | ResourceAction::EditApplications
            | ResourceAction::PublishBundles
            | ResourceAction::EditBundles => ResourceRole::Editor,
            ResourceAction::SetApplicationsPublic
            | ResourceAction::SetApplicationsPublicToMarketplace
            | ResourceAction::ManageApplications
            | ResourceAction::ManageDatasources
            | ResourceAction::SetBundlesPublic
            | ResourceAction::ManageBundles => ResourceRole::Owner,
        }
    }

    /// Check if a grant with `role` satisfies this action.
    pub fn can_be_accessed_by(&self, role: ResourceRole) -> bool {
        role.covers(self.required_role())
    }

    /// Check if this action only needs view access.
    ///
    /// Only read actions can be satisfied through public or anonymous access.
    pub fn is_read_action(&self) -> bool {
        self.required_role() == ResourceRole::Viewer
    }

    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceAction::ReadApplications => "read_applications",
            ResourceAction::PublishApplications => "publish_applications",
            ResourceAction::EditApplications => "edit_applications",
            ResourceAction::SetApplicationsPublic => "set_applications_public",
            ResourceAction::SetApplicationsPublicToMarketplace => {
                "set_applications_public_to_marketplace"
            }
            ResourceAction::ManageApplications => "manage_applications",
            ResourceAction::UseDatasources => "use_datasources",
            ResourceAction::ReadDatasources => "read_datasources",
            ResourceAction::ManageDatasources => "manage_datasources",
            ResourceAction::ReadBundles => "read_bundles",
            ResourceAction::PublishBundles => "publish_bundles",
            ResourceAction::EditBundles => "edit_bundles",
            ResourceAction::SetBundlesPublic => "set_bundles_public",
            ResourceAction::ManageBundles => "manage_bundles",
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            ResourceAction::ReadApplications,
            ResourceAction::PublishApplications,
            ResourceAction::EditApplications,
            ResourceAction::SetApplicationsPublic,
            ResourceAction::SetApplicationsPublicToMarketplace,
            ResourceAction::ManageApplications,
            ResourceAction::UseDatasources,
            ResourceAction::ReadDatasources,
            ResourceAction::ManageDatasources,
            ResourceAction::ReadBundles,
            ResourceAction::PublishBundles,
            ResourceAction::EditBundles,
            ResourceAction::SetBundlesPublic,
            ResourceAction::ManageBundles,
        ]
    }

    /// Get all actions for a resource type.
    pub fn for_resource_type(resource_type: ResourceType) -> Vec<Self> {
        Self::all()
            .into_iter()
            .filter(|a| a.resource_type() == resource_type)
            .collect()
    }
}

impl std::fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a resource is being accessed.
///
/// Applications and bundles apply different public rules depending on
/// whether they are opened normally, through a public link, from the
/// marketplace or from an agency profile.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    /// Regular access from within the workspace.
    #[default]
    Normal,
    /// Access through a public link.
    PublicToAll,
    /// Access from the marketplace.
    PublicToMarketplace,
    /// Access from an agency profile page.
    AgencyProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_resource_type_mapping() {
        assert_eq!(
            ResourceAction::for_resource_type(ResourceType::Application).len(),
            6
        );
        assert_eq!(
            ResourceAction::for_resource_type(ResourceType::Datasource).len(),
            3
        );
        assert_eq!(ResourceAction::for_resource_type(ResourceType::Bundle).len(), 5);
        assert_eq!(ResourceAction::all().len(), 14);
    }

    #[test]
    fn test_required_role_threshold() {
        assert!(ResourceAction::ReadApplications.can_be_accessed_by(ResourceRole::Viewer));
        assert!(!ResourceAction::EditBundles.can_be_accessed_by(ResourceRole::Viewer));
        assert!(ResourceAction::EditBundles.can_be_accessed_by(ResourceRole::Editor));
        assert!(!ResourceAction::ManageDatasources.can_be_accessed_by(ResourceRole::Editor));
        assert!(ResourceAction::ManageDatasources.can_be_accessed_by(ResourceRole::Owner));
    }

    #[test]
    fn test_is_read_action() {
        assert!(ResourceAction::ReadApplications.is_read_action());
        assert!(ResourceAction::UseDatasources.is_read_action());
        assert!(!ResourceAction::PublishApplications.is_read_action());
        assert!(!ResourceAction::ManageBundles.is_read_action());
    }

    #[test]
    fn test_request_type_default() {
        assert_eq!(RequestType::default(), RequestType::Normal);
    }
}
