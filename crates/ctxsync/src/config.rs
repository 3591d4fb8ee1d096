//! YAML configuration.
//!
//! ```yaml
//! api_version: "62.0"
//! request_timeout_secs: 30
//! halt_on_bind_failure: false
//! org:
//!   access_token: "00D..."
//!   instance_url: "https://acme.my.salesforce.com"
//! contexts:
//!   quote-context:
//!     mapping_name: QuoteMapping
//!     descriptor:
//!       name: RLM_QuoteContext
//!       description: Extension of Standard Quote Context
//!       developerName: RLM_QuoteContext
//!       baseReference: QuoteContext__stdctx
//!       startDate: "2024-01-01T00:00:00.000Z"
//! ```
//!
//! The API version may also be nested as `project.package.api_version`.

use crate::context_sync::{ContextSyncSpec, SyncOptions};
use crate::http::{DEFAULT_API_VERSION, DEFAULT_REQUEST_TIMEOUT};
use ctxsync_core::{SessionSource, SyncError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// File read when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "ctxsync.yml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    project: Option<ProjectConfig>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub halt_on_bind_failure: bool,
    #[serde(default)]
    pub org: OrgConfig,
    #[serde(default)]
    pub contexts: BTreeMap<String, ContextSyncSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct ProjectConfig {
    #[serde(default)]
    package: Option<PackageConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct PackageConfig {
    #[serde(default)]
    api_version: Option<String>,
}

/// Stored org session, used when no explicit credentials are given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrgConfig {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub instance_url: Option<String>,
}

impl SessionSource for OrgConfig {
    fn access_token(&self) -> Option<String> {
        self.access_token.clone()
    }

    fn instance_url(&self) -> Option<String> {
        self.instance_url.clone()
    }
}

impl Config {
    pub fn from_yaml_str(content: &str) -> Result<Self, SyncError> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| SyncError::Configuration(format!("cannot parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SyncError> {
        if self.request_timeout_secs == Some(0) {
            return Err(SyncError::Configuration(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Reads a config file. The file must exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_yaml_str(&content)
    }

    /// Reads the default config file, or returns defaults if there is none.
    pub fn load_default() -> Result<Self, SyncError> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// API version, top-level value first, then `project.package.api_version`.
    pub fn api_version(&self) -> &str {
        self.api_version
            .as_deref()
            .or_else(|| {
                self.project
                    .as_ref()
                    .and_then(|p| p.package.as_ref())
                    .and_then(|p| p.api_version.as_deref())
            })
            .unwrap_or(DEFAULT_API_VERSION)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            halt_on_bind_failure: self.halt_on_bind_failure,
            step_timeout: self.request_timeout(),
        }
    }

    /// Custom context from the file, or a built-in preset of that name.
    pub fn context_spec(&self, name: &str) -> Option<ContextSyncSpec> {
        self.contexts
            .get(name)
            .cloned()
            .or_else(|| ContextSyncSpec::preset(name))
    }
}
