//! # Resource Organization Lookups
//!
//! Organization, group and user information consumed by the permission
//! engine. Membership lifecycle is managed elsewhere; this crate only defines
//! the read contracts and their domain types.
//!
//! ## Overview
//!
//! - **Users**: id and display name, used to label suggested admins
//! - **Groups**: grants issued to a group apply to every member
//! - **Organizations**: admins of an organization administer its resources
//!
//! ## Architecture
//!
//! ```text
//! User
//!   ├─ GroupMember ─────────→ Group ─→ Organization
//!   └─ OrganizationMember ──→ Organization
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use resource_org::{GroupMember, GroupMembership, GroupRole, MemoryDirectory};
//!
//! async fn example() {
//!     let directory = MemoryDirectory::new();
//!     directory
//!         .add_group_member(GroupMember::new("group-1", "user-1", GroupRole::Member))
//!         .await;
//!
//!     let groups = directory.get_user_group_ids("user-1").await.unwrap();
//!     assert!(groups.contains("group-1"));
//! }
//! ```

pub mod directory;
pub mod membership;
pub mod roles;

// Re-export main types for convenience
pub use directory::{
    DirectoryError, DirectoryResult, GroupMembership, MemoryDirectory, OrgMembership,
    UserDirectory,
};
pub use membership::{GroupMember, OrganizationMember, User};
pub use roles::{GroupRole, OrganizationRole};
