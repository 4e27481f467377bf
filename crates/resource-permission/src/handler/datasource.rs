//! Datasource permissions.
//!
//! Datasources have no public access. Built-in system datasources are owned
//! by every caller and never touch storage.

use std::sync::Arc;

use async_trait::async_trait;
use resource_rbac::{RequestType, ResourceAction, ResourceRole, ResourceType, ANONYMOUS_USER_ID};

use super::{push, synthesize, ChannelResolver, ResourcePermissionHandler};
use crate::error::PermissionResult;
use crate::repository::PermissionMap;

/// Resolves permissions on datasources.
#[derive(Debug, Clone)]
pub struct DatasourcePermissionHandler {
    resolver: Arc<ChannelResolver>,
}

impl DatasourcePermissionHandler {
    /// Create a handler on top of the shared channels.
    pub fn new(resolver: Arc<ChannelResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl ResourcePermissionHandler for DatasourcePermissionHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Datasource
    }

    async fn get_all_matching_permissions(
        &self,
        user_id: Option<&str>,
        resource_ids: &[String],
        action: ResourceAction,
        request_type: RequestType,
    ) -> PermissionResult<PermissionMap> {
        let config = self.resolver.config();
        let (system_ids, stored_ids): (Vec<String>, Vec<String>) = resource_ids
            .iter()
            .cloned()
            .partition(|id| config.is_system_datasource(id));

        let mut result = self
            .resolver
            .resolve(
                ResourceType::Datasource,
                user_id,
                &stored_ids,
                action,
                request_type,
                None,
            )
            .await?;

        let holder_id = user_id.unwrap_or(ANONYMOUS_USER_ID);
        for id in &system_ids {
            if result.contains_key(id) {
                continue;
            }
            push(
                &mut result,
                synthesize(ResourceType::Datasource, id, holder_id, ResourceRole::Owner),
            );
        }

        Ok(result)
    }
}
