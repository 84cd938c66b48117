//! SaaS-file state codec.
//!
//! The state repository carries one deployment-template file listing
//! resource templates. Each template names a service, the configuration file
//! it is rendered from, and the targets it is deployed to:
//!
//! ```yaml
//! resourceTemplates:
//!   - name: telemeter
//!     url: https://github.com/org/configuration
//!     path: /manifests/telemeter.yaml
//!     parameters:
//!       REPLICAS: 3
//!     targets:
//!       - namespace:
//!           $ref: /services/telemeter/namespaces/production.yml
//!         ref: 3f786850e387550fdab836ed7e6dc881de23001b
//!         parameters:
//!           REPLICAS: 10
//! ```
//!
//! Targets point at clusters indirectly, through the namespace `$ref`; the
//! codec configuration maps each such reference to a [`Cluster`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use statectl_types::{Cluster, Placement, Ref, Snapshot};
use tracing::debug;

use crate::error::{CodecError, Result};
use crate::traits::StateCodec;

/// Configuration of the SaaS-file codec.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaasConfig {
    /// Path of the SaaS file, relative to the state repository root.
    #[serde(rename = "saasFile")]
    pub saas_file: String,

    /// Cluster for every namespace reference a target may use.
    #[serde(rename = "clusters", default)]
    pub clusters_by_ref: BTreeMap<String, Cluster>,
}

/// Decodes a single SaaS deployment-template file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaasFileCodec {
    cfg: SaasConfig,
}

impl SaasFileCodec {
    pub fn new(cfg: SaasConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &SaasConfig {
        &self.cfg
    }

    fn cluster(&self, reference: &str, service: &str) -> Result<Cluster> {
        self.cfg
            .clusters_by_ref
            .get(reference)
            .cloned()
            .ok_or_else(|| CodecError::UnknownClusterReference {
                reference: reference.to_string(),
                service: service.to_string(),
            })
    }
}

impl StateCodec for SaasFileCodec {
    fn name(&self) -> &'static str {
        "saas-file"
    }

    fn decode(&self, dir: &Path) -> Result<Snapshot> {
        let path: PathBuf = dir.join(self.cfg.saas_file.trim_start_matches('/'));
        let raw = fs::read_to_string(&path).map_err(|source| CodecError::Read {
            path: path.clone(),
            source,
        })?;
        let saas: SaasFile =
            serde_yaml::from_str(&raw).map_err(|source| CodecError::Parse {
                path: path.clone(),
                source,
            })?;

        let mut placements = Vec::new();
        for tmpl in &saas.resource_templates {
            for target in &tmpl.targets {
                let mut parameters = tmpl.parameters.clone();
                parameters.extend(target.parameters.clone());

                placements.push(Placement {
                    service: tmpl.name.clone(),
                    cluster: self.cluster(&target.namespace.reference, &tmpl.name)?,
                    configuration_ref: Ref::new(target.reference.clone()),
                    configuration_url: normalize_url(&tmpl.url),
                    configuration_path: tmpl.path.clone(),
                    parameters,
                });
            }
        }

        debug!(path = %path.display(), placements = placements.len(), "decoded saas file");
        Ok(Snapshot::new(placements)?)
    }

    fn encode(&self, _dir: &Path, _snapshot: &Snapshot) -> Result<()> {
        Err(CodecError::NotImplemented {
            operation: "encode",
            codec: self.name(),
        })
    }
}

/// Template URLs are compared scheme-less.
fn normalize_url(url: &str) -> String {
    url.strip_prefix("https://").unwrap_or(url).to_string()
}

/// The part of the SaaS file schema this codec reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaasFile {
    #[serde(default)]
    resource_templates: Vec<ResourceTemplate>,
}

#[derive(Debug, Deserialize)]
struct ResourceTemplate {
    name: String,
    path: String,
    #[serde(default)]
    url: String,
    /// Scalars keep their literal text: `1.10` stays `1.10`, `0x1F` stays
    /// `0x1F`. Nested values fail the schema.
    #[serde(default)]
    parameters: BTreeMap<String, String>,
    #[serde(default)]
    targets: Vec<Target>,
}

#[derive(Debug, Deserialize)]
struct Target {
    namespace: NamespaceRef,
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default, alias = "parameter")]
    parameters: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct NamespaceRef {
    #[serde(rename = "$ref")]
    reference: String,
}
