//! # Resource RBAC
//!
//! Core vocabulary of the resource permission engine: what can be protected,
//! who can hold a grant, which roles exist and which actions require which
//! role.
//!
//! ## Overview
//!
//! - **Resources**: applications, datasources and bundles
//! - **Holders**: users and groups
//! - **Roles**: `Viewer < Editor < Owner`, with stable persisted weights
//! - **Actions**: resource type + minimum role
//! - **Permissions**: a single grant of a role on a resource to a holder
//!
//! ## Composite Keys
//!
//! ```text
//! source = "<resource type>:<resource id>"   e.g. "application:app-1"
//! target = "<holder type>:<holder id>"       e.g. "group:g-7"
//! ```
//!
//! Joining the type into the key keeps equal raw ids of different types apart.
//!
//! ## Usage
//!
//! ```rust
//! use resource_rbac::{ResourceAction, ResourceRole, ResourceType};
//!
//! let action = ResourceAction::ManageDatasources;
//! assert_eq!(action.resource_type(), ResourceType::Datasource);
//! assert_eq!(action.required_role(), ResourceRole::Owner);
//! ```

pub mod actions;
pub mod permissions;
pub mod resources;
pub mod roles;

// Re-export main types for convenience
pub use actions::{RequestType, ResourceAction};
pub use permissions::{ResourcePermission, ANONYMOUS_USER_ID};
pub use resources::{ResourceHolder, ResourceType};
pub use roles::ResourceRole;
