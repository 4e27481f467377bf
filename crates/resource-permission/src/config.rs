//! Engine configuration.
//!
//! Configuration is loaded from environment variables with defaults suitable
//! for a self-hosted single-workspace deployment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Built-in datasources every user implicitly owns.
pub const DEFAULT_SYSTEM_DATASOURCE_IDS: [&str; 3] = ["#QUICK_REST_API", "#QUICK_GRAPHQL", "#JS_CODE"];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// How organizations share one deployment.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceMode {
    /// Many isolated organizations; grants only count inside the caller's
    /// own organizations.
    Saas,
    /// One shared workspace; organization boundaries are not enforced on
    /// stored grants.
    #[default]
    Enterprise,
}

impl WorkspaceMode {
    /// Parse mode from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "saas" => Some(Self::Saas),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }
}

/// Permission engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Workspace isolation mode.
    pub workspace_mode: WorkspaceMode,

    /// Hide marketplace resources from callers that are not signed in.
    pub marketplace_private_mode: bool,

    /// Datasource ids resolved as owned by every caller without storage.
    pub system_datasource_ids: Vec<String>,

    /// Page size used when listing members of owner groups.
    pub admin_member_page_size: usize,

    /// Number of admins named in the admin suggestion summary.
    pub admin_display_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workspace_mode: WorkspaceMode::default(),
            marketplace_private_mode: false,
            system_datasource_ids: DEFAULT_SYSTEM_DATASOURCE_IDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            admin_member_page_size: 100,
            admin_display_limit: 7,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PERMISSION_WORKSPACE_MODE`: `saas` or `enterprise` (default: enterprise)
    /// - `PERMISSION_MARKETPLACE_PRIVATE`: hide marketplace from anonymous callers (default: false)
    /// - `PERMISSION_SYSTEM_DATASOURCE_IDS`: comma-separated system datasource ids
    /// - `PERMISSION_ADMIN_PAGE_SIZE`: owner group page size (default: 100)
    ///
    /// Unparsable values and a zero page size fall back to the defaults.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            workspace_mode: std::env::var("PERMISSION_WORKSPACE_MODE")
                .ok()
                .and_then(|s| WorkspaceMode::parse(&s))
                .unwrap_or(default.workspace_mode),
            marketplace_private_mode: std::env::var("PERMISSION_MARKETPLACE_PRIVATE")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(default.marketplace_private_mode),
            system_datasource_ids: std::env::var("PERMISSION_SYSTEM_DATASOURCE_IDS")
                .map(|s| {
                    s.split(',')
                        .map(|id| id.trim().to_string())
                        .filter(|id| !id.is_empty())
                        .collect()
                })
                .unwrap_or(default.system_datasource_ids),
            admin_member_page_size: std::env::var("PERMISSION_ADMIN_PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|size| *size > 0)
                .unwrap_or(default.admin_member_page_size),
            admin_display_limit: default.admin_display_limit,
        }
    }

    /// Check if a datasource id is a built-in system datasource.
    pub fn is_system_datasource(&self, datasource_id: &str) -> bool {
        self.system_datasource_ids.iter().any(|id| id == datasource_id)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system_datasource_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: "system_datasource_ids".to_string(),
                message: "ids must not be empty".to_string(),
            });
        }
        if self.admin_member_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "admin_member_page_size".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
