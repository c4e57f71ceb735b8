//! Editor configuration.
//!
//! Configuration is read from a TOML file. Every key is optional; a missing
//! file yields the defaults.
//!
//! ```toml
//! policy_list_route = "#!/service/{service_id}/policies"
//! default_audit_logging = true
//! log_level = "info"
//! store_dir = "./policies"
//! ```

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::id::ServiceId;
use crate::utils::logging::LogLevel;

/// Placeholder substituted with the owning service id in route templates.
pub const SERVICE_ID_PLACEHOLDER: &str = "{service_id}";

/// Configuration for the policy editor and its command-line front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Route of the policy list, navigated to after save, delete and cancel
    #[serde(default = "default_policy_list_route")]
    pub policy_list_route: String,

    /// Audit logging flag given to newly created policies
    #[serde(default = "default_audit_logging")]
    pub default_audit_logging: bool,

    /// Log level name
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory used by the file-backed policy store
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
}

fn default_policy_list_route() -> String {
    format!("#!/service/{}/policies", SERVICE_ID_PLACEHOLDER)
}

fn default_audit_logging() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("./policies")
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            policy_list_route: default_policy_list_route(),
            default_audit_logging: default_audit_logging(),
            log_level: default_log_level(),
            store_dir: default_store_dir(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from a TOML file.
    ///
    /// With no path, or a path that does not exist, the defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                let content = std::fs::read_to_string(path).map_err(|e| {
                    ConfigError::LoadFailed(format!("{}: {}", path.display(), e))
                })?;
                Self::from_toml(&content)?
            }
            Some(path) => {
                warn!("Configuration file not found: {}", path.display());
                Self::default()
            }
            None => {
                info!("No configuration file specified, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text without validating it.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()).into())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.policy_list_route.contains(SERVICE_ID_PLACEHOLDER) {
            return Err(ConfigError::Invalid(format!(
                "policy_list_route must contain {}",
                SERVICE_ID_PLACEHOLDER
            ))
            .into());
        }

        if self.store_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store_dir cannot be empty".to_string()).into());
        }

        self.log_level()?;

        Ok(())
    }

    /// The configured log level.
    pub fn log_level(&self) -> Result<LogLevel> {
        Ok(self.log_level.parse::<LogLevel>()?)
    }

    /// Route of the policy list for the given service.
    pub fn policy_list_path(&self, service_id: ServiceId) -> String {
        self.policy_list_route
            .replace(SERVICE_ID_PLACEHOLDER, &service_id.to_string())
    }
}
