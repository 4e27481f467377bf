//! Error types for permission resolution
//!
//! Callers tell a legitimate denial ([`PermissionError::NotAuthorized`]) apart
//! from an engine failure by the variant, never by an empty result alone.

use resource_edges::EdgeStoreError;
use resource_org::DirectoryError;
use resource_rbac::ResourceType;
use thiserror::Error;

use crate::config::ConfigError;

/// Permission engine error types.
#[derive(Debug, Error)]
pub enum PermissionError {
    /// No grant matches the requested action on the resource
    #[error("Not authorized to access {resource_type} {resource_id}")]
    NotAuthorized {
        /// Type of the resource that was checked
        resource_type: ResourceType,
        /// Id of the resource that was checked
        resource_id: String,
    },

    /// No handler is registered for the resource type
    #[error("Invalid permission operation: no handler for resource type {0}")]
    InvalidPermissionOperation(ResourceType),

    /// Edge store read or write failed
    #[error("Storage error: {0}")]
    Storage(#[from] EdgeStoreError),

    /// Membership or user lookup failed
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Resource catalog lookup failed
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Engine misconfigured
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for permission operations.
pub type PermissionResult<T> = Result<T, PermissionError>;

impl PermissionError {
    /// Create a denial for a resource.
    pub fn not_authorized(resource_type: ResourceType, resource_id: impl Into<String>) -> Self {
        PermissionError::NotAuthorized {
            resource_type,
            resource_id: resource_id.into(),
        }
    }

    /// Check if this error is an engine failure rather than a denial.
    pub fn is_server_error(&self) -> bool {
        !matches!(self, PermissionError::NotAuthorized { .. })
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            PermissionError::NotAuthorized { .. } => 403,
            PermissionError::InvalidPermissionOperation(_)
            | PermissionError::Storage(_)
            | PermissionError::Directory(_)
            | PermissionError::Catalog(_)
            | PermissionError::Config(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            PermissionError::NotAuthorized { .. } => "NOT_AUTHORIZED",
            PermissionError::InvalidPermissionOperation(_) => "INVALID_PERMISSION_OPERATION",
            PermissionError::Storage(_) => "STORAGE_ERROR",
            PermissionError::Directory(_) => "DIRECTORY_ERROR",
            PermissionError::Catalog(_) => "CATALOG_ERROR",
            PermissionError::Config(_) => "CONFIG_ERROR",
        }
    }
}
