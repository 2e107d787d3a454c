//! Pipeline configuration loaded from a TOML file.
//!
//! ```toml
//! coverity_home = "/opt/coverity/analysis"
//! intermediate_dir = "idir"
//!
//! [scm]
//! scm_system = "git"
//! file_regex = "*.rs"
//!
//! [server]
//! host = "connect.example.com"
//! stream = "main"
//! user = "ci"
//! ```

use crate::error::CoreError;
use crate::options::OptionSet;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_intermediate_dir() -> String {
    "idir".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Coverity Connect server used for history download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectServer {
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub stream: String,

    pub user: String,

    /// Never serialized back out.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    #[serde(default)]
    pub ssl: bool,
}

/// Everything one pipeline run needs besides the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root of the Coverity Analysis installation.
    #[serde(default)]
    pub coverity_home: Option<PathBuf>,

    /// Intermediate directory passed as `--dir`.
    #[serde(default = "default_intermediate_dir")]
    pub intermediate_dir: String,

    /// Skip probing and use this version string.
    #[serde(default)]
    pub version: Option<String>,

    /// Per-command process timeout; 0 disables it.
    #[serde(default)]
    pub timeout_secs: u64,

    #[serde(default)]
    pub server: Option<ConnectServer>,

    #[serde(flatten)]
    pub options: OptionSet,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            coverity_home: None,
            intermediate_dir: default_intermediate_dir(),
            version: None,
            timeout_secs: 0,
            server: None,
            options: OptionSet::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.intermediate_dir.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "intermediate_dir must not be empty".to_string(),
            ));
        }
        if let Some(server) = &self.server {
            if server.host.trim().is_empty() {
                return Err(CoreError::InvalidConfig(
                    "server.host must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
