//! Codec selection by state-type tag.
//!
//! The set of codecs is closed: [`StateType`] lists every supported tag and
//! [`Codec`] holds one configured codec per variant. Adding a schema means
//! adding a variant to both.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use statectl_types::Snapshot;

use crate::error::{CodecError, Result};
use crate::saas::{SaasConfig, SaasFileCodec};
use crate::traits::StateCodec;

/// Tag naming a state-description schema in the project configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateType {
    /// A SaaS deployment-template file with a cluster table.
    #[serde(rename = "app-interface")]
    AppInterface,
}

impl StateType {
    /// Every supported tag.
    pub const ALL: &'static [StateType] = &[StateType::AppInterface];

    pub fn as_str(&self) -> &'static str {
        match self {
            StateType::AppInterface => "app-interface",
        }
    }

    /// Look up a tag, `None` when unsupported.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured codec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Codec {
    SaasFile(SaasFileCodec),
}

impl Codec {
    /// Build the codec for `state_type` from its nested configuration.
    pub fn from_config(state_type: StateType, config: Value) -> Result<Self> {
        match state_type {
            StateType::AppInterface => {
                let cfg: SaasConfig =
                    serde_yaml::from_value(config).map_err(|source| CodecError::Config {
                        state_type: state_type.to_string(),
                        source,
                    })?;
                Ok(Codec::SaasFile(SaasFileCodec::new(cfg)))
            }
        }
    }

    pub fn state_type(&self) -> StateType {
        match self {
            Codec::SaasFile(_) => StateType::AppInterface,
        }
    }

    fn inner(&self) -> &dyn StateCodec {
        match self {
            Codec::SaasFile(c) => c,
        }
    }
}

impl StateCodec for Codec {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn decode(&self, dir: &Path) -> Result<Snapshot> {
        self.inner().decode(dir)
    }

    fn encode(&self, dir: &Path, snapshot: &Snapshot) -> Result<()> {
        self.inner().encode(dir, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statectl_types::Cluster;

    #[test]
    fn parse_known_tag() {
        assert_eq!(StateType::parse("app-interface"), Some(StateType::AppInterface));
    }

    #[test]
    fn parse_unknown_tag() {
        assert_eq!(StateType::parse("helmfile"), None);
        assert_eq!(StateType::parse(""), None);
    }

    #[test]
    fn tag_round_trips_through_display() {
        for t in StateType::ALL {
            assert_eq!(StateType::parse(&t.to_string()), Some(*t));
        }
    }

    #[test]
    fn build_saas_codec() {
        let config: Value = serde_yaml::from_str(
            r#"
saasFile: data/saas.yaml
clusters:
  /ns/prod.yml: { name: prod-01, environment: production }
"#,
        )
        .unwrap();
        let codec = Codec::from_config(StateType::AppInterface, config).unwrap();
        assert_eq!(codec.state_type(), StateType::AppInterface);
        assert_eq!(codec.name(), "saas-file");

        let Codec::SaasFile(saas) = codec;
        assert_eq!(saas.config().saas_file, "data/saas.yaml");
        assert_eq!(
            saas.config().clusters_by_ref["/ns/prod.yml"],
            Cluster::new("prod-01", "production")
        );
    }

    #[test]
    fn bad_codec_config() {
        let config: Value = serde_yaml::from_str("clusters: 3").unwrap();
        let err = Codec::from_config(StateType::AppInterface, config).unwrap_err();
        assert!(matches!(err, CodecError::Config { .. }));
        assert!(err.to_string().starts_with("app-interface state config"));
    }
}
