//! Application permissions.

use std::sync::Arc;

use async_trait::async_trait;
use resource_rbac::{RequestType, ResourceAction, ResourceType};

use super::{ChannelResolver, ResourcePermissionHandler};
use crate::catalog::ResourceVisibility;
use crate::config::EngineConfig;
use crate::error::PermissionResult;
use crate::repository::PermissionMap;

/// Resolves permissions on applications.
#[derive(Debug, Clone)]
pub struct ApplicationPermissionHandler {
    resolver: Arc<ChannelResolver>,
}

impl ApplicationPermissionHandler {
    /// Create a handler on top of the shared channels.
    pub fn new(resolver: Arc<ChannelResolver>) -> Self {
        Self { resolver }
    }
}

/// Public access rule for applications.
///
/// Marketplace listings are hidden from anonymous callers while the
/// marketplace runs in private mode. Agency profiles need a signed-in caller.
pub(crate) fn is_public_application(
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
        RequestType::AgencyProfile => !anonymous && visibility.agency_profile,
    }
}

#[async_trait]
impl ResourcePermissionHandler for ApplicationPermissionHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Application
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
                ResourceType::Application,
                user_id,
                resource_ids,
                action,
                request_type,
                Some(is_public_application),
            )
            .await
    }
}
