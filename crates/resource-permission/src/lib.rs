//! # Resource Permission Engine
//!
//! Resolves the effective role of a user, or an anonymous caller, on
//! applications, datasources and bundles.
//!
//! ## Overview
//!
//! - **Stored grants**: user and group grants persisted as edges
//! - **Group fan-out**: a grant to a group applies to every member
//! - **Public access**: public links, marketplace listings and agency profiles
//! - **System datasources**: built-in datasources owned by everyone
//! - **Organization admins**: implicit ownership of the organization's resources
//!
//! ## Architecture
//!
//! ```text
//! ResourcePermissionService
//!   └─ handler registry (one per ResourceType)
//!        └─ ChannelResolver
//!             ├─ PermissionRepository ─→ EdgeStore
//!             ├─ ResourceCatalog
//!             └─ GroupMembership / OrgMembership
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use resource_edges::MemoryEdgeStore;
//! use resource_org::MemoryDirectory;
//! use resource_permission::{EngineConfig, MemoryCatalog, ResourcePermissionService};
//! use resource_rbac::{ResourceAction, ResourceRole, ResourceType};
//!
//! async fn example() -> Result<(), resource_permission::PermissionError> {
//!     let directory = Arc::new(MemoryDirectory::new());
//!     let service = ResourcePermissionService::try_from_parts(
//!         EngineConfig::from_env(),
//!         Arc::new(MemoryEdgeStore::new()),
//!         Arc::new(MemoryCatalog::new()),
//!         directory.clone(),
//!         directory,
//!     )?;
//!
//!     service
//!         .add_permission_to_user(ResourceType::Application, "app-1", "user-1", ResourceRole::Editor)
//!         .await?;
//!
//!     let max = service
//!         .check_and_return_max_permission(Some("user-1"), "app-1", ResourceAction::EditApplications)
//!         .await?;
//!     assert_eq!(max.resource_role, ResourceRole::Editor);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod handler;
pub mod repository;
pub mod service;
pub mod suggest;

// Re-export main types for convenience
pub use catalog::{MemoryCatalog, ResourceCatalog, ResourceVisibility};
pub use config::{ConfigError, EngineConfig, WorkspaceMode};
pub use error::{PermissionError, PermissionResult};
pub use handler::{
    ApplicationPermissionHandler, BundlePermissionHandler, ChannelResolver,
    DatasourcePermissionHandler, PublicRule, ResourcePermissionHandler,
};
pub use repository::{PermissionMap, PermissionRepository, RESOURCE_NAMESPACE};
pub use service::{ResourcePermissionService, UserPermissionStatus};
pub use suggest::SuggestAdminService;
