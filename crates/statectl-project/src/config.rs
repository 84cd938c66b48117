//! Project configuration.
//!
//! One YAML document per project names the configuration repository, the
//! overview repository, and the state repository together with the schema
//! its state is written in:
//!
//! ```yaml
//! configuration:
//!   URL: git@example.com:observatorium/configuration.git
//! overview:
//!   URL: git@example.com:observatorium/statectl-overview.git
//! state:
//!   URL: git@example.com:service/app-interface.git
//!   type: app-interface
//!   config:
//!     saasFile: data/services/telemeter/cicd/saas.yaml
//!     clusters:
//!       /services/telemeter/namespaces/production.yml:
//!         name: telemeter-prod-01
//!         environment: production
//! ```

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use statectl_codec::{Codec, StateCodec, StateType};
use tracing::debug;

use crate::error::ConfigError;

/// Default location of the project configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "./.statectl.yaml";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoConfig {
    #[serde(rename = "URL", default)]
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(rename = "URL", default)]
    pub url: String,

    /// State-type tag; selects the codec.
    #[serde(rename = "type", default)]
    pub state_type: String,

    /// Codec-specific configuration, interpreted by the selected codec.
    #[serde(default)]
    pub config: Value,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub configuration: RepoConfig,
    /// Parsed for completeness; nothing reads the overview repository yet.
    #[serde(default)]
    pub overview: RepoConfig,
    #[serde(default)]
    pub state: StateConfig,
}

/// Parse a project configuration and build the codec it selects.
///
/// Unsupported state types are rejected here, with the supported set listed,
/// so no repository work starts on a configuration that cannot be decoded.
pub fn load_project_config(input: &[u8]) -> Result<(ProjectConfig, Codec), ConfigError> {
    let cfg: ProjectConfig = serde_yaml::from_slice(input)?;

    let state_type = StateType::parse(&cfg.state.state_type).ok_or_else(|| {
        ConfigError::UnsupportedStateType {
            found: cfg.state.state_type.clone(),
            supported: StateType::ALL
                .iter()
                .map(StateType::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }
    })?;

    let codec = Codec::from_config(state_type, cfg.state.config.clone())
        .map_err(ConfigError::CodecConfig)?;

    debug!(state_type = %state_type, codec = codec.name(), "loaded project config");
    Ok((cfg, codec))
}
