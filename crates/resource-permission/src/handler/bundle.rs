//! Bundle permissions.

use std::sync::Arc;

use async_trait::async_trait;
use resource_rbac::{RequestType, ResourceAction, ResourceType};

use super::{ChannelResolver, ResourcePermissionHandler};
use crate::catalog::ResourceVisibility;
use crate::config::EngineConfig;
use crate::error::PermissionResult;
use crate::repository::PermissionMap;

/// Resolves permissions on bundles.
#[derive(Debug, Clone)]
pub struct BundlePermissionHandler {
    resolver: Arc<ChannelResolver>,
}

impl BundlePermissionHandler {
    /// Create a handler on top of the shared channels.
    pub fn new(resolver: Arc<ChannelResolver>) -> Self {
        Self { resolver }
    }
}

/// Bundles follow the application rule but are never shown on agency
/// profiles.
pub(crate) fn is_public_bundle(
    visibility: &ResourceVisibility,
    request_type: RequestType,
    anonymous: bool,
    config: &EngineConfig,
) -> bool {
    match request_type {
        RequestType::Normal | RequestType::PublicToAll => visibility.public_to_all,
        RequestType::PublicToMarketplace => {
            visibility.public_to_marketplace && !(anonymous && config.marketplace_private_mode)
        }
        RequestType::AgencyProfile => false,
    }
}

#[async_trait]
impl ResourcePermissionHandler for BundlePermissionHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Bundle
    }

    async fn get_all_matching_permissions(
        &self,
        user_id: Option<&str>,
        resource_ids: &[String],
        action: ResourceAction,
        request_type: RequestType,
    ) -> PermissionResult<PermissionMap> {
        self.resolver
            .resolve(
                ResourceType::Bundle,
                user_id,
                resource_ids,
                action,
                request_type,
                Some(is_public_bundle),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{ids, Fixture};
    use super::*;

    #[test]
    fn test_agency_profile_never_matches() {
        let vis = ResourceVisibility::new("b", "org1")
            .public_to_all()
            .agency_profile();
        let config = EngineConfig::default();
        assert!(!is_public_bundle(&vis, RequestType::AgencyProfile, false, &config));
        assert!(is_public_bundle(&vis, RequestType::PublicToAll, true, &config));
    }

    #[tokio::test]
    async fn test_marketplace_bundle_for_signed_in_user() {
        let fx = Fixture::new();
        fx.catalog
            .insert(
                ResourceType::Bundle,
                ResourceVisibility::new("b", "org1").public_to_marketplace(),
            )
            .await;
        let config = EngineConfig {
            marketplace_private_mode: true,
            ..Default::default()
        };
        let handler = BundlePermissionHandler::new(Arc::new(fx.resolver(config)));

        let signed_in = handler
            .get_all_matching_permissions(
                Some("u1"),
                &ids(&["b"]),
                ResourceAction::ReadBundles,
                RequestType::PublicToMarketplace,
            )
            .await
            .unwrap();
        assert_eq!(signed_in["b"].len(), 1);

        let anonymous = handler
            .get_all_matching_permissions(
                None,
                &ids(&["b"]),
                ResourceAction::ReadBundles,
                RequestType::PublicToMarketplace,
            )
            .await
            .unwrap();
        assert!(anonymous.is_empty());
    }
}
