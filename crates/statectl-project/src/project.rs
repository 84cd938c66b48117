use std::collections::BTreeSet;
use std::path::Path;

use statectl_codec::{Codec, StateCodec};
use statectl_diff::DiffSink;
use statectl_repo::{cache_dir_for, CancelToken, LocalRepo};
use statectl_types::{Ref, Snapshot};
use tracing::{debug, warn};

use crate::config::ProjectConfig;
use crate::engine::{reconcile, DiffOutcome};
use crate::error::{ProjectError, Result};

const STATE: &str = "state";
const CONFIGURATION: &str = "configuration";

/// A state repository, the configuration repository its placements render
/// from, and the codec that decodes the state.
///
/// Both repositories are single on-disk checkouts owned by the project; every
/// operation that touches them takes `&mut self`.
pub struct Project {
    config: ProjectConfig,
    codec: Codec,
    state: LocalRepo,
    configuration: LocalRepo,
}

impl Project {
    /// Open, or clone into `cache_dir`, both repositories of `config`.
    pub fn open(
        config: ProjectConfig,
        codec: Codec,
        cache_dir: &Path,
        cancel: CancelToken,
    ) -> Result<Self> {
        let state = open_repo(cache_dir, STATE, &config.state.url, cancel.clone())?;
        let configuration =
            open_repo(cache_dir, CONFIGURATION, &config.configuration.url, cancel)?;
        Ok(Self {
            config,
            codec,
            state,
            configuration,
        })
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Write one diff block per placement that differs between the state at
    /// `base` and the state at `new` to `sink`.
    ///
    /// Fetch, checkout, and decode failures abort. Failures to resolve an
    /// individual placement are collected in the returned outcome.
    pub fn diff_state<S: DiffSink + ?Sized>(
        &mut self,
        sink: &mut S,
        base: &Ref,
        new: &Ref,
    ) -> Result<DiffOutcome> {
        debug!(base_ref = %base, new_ref = %new, "comparing configuration states");

        self.state.fetch().map_err(|source| ProjectError::Fetch {
            kind: STATE,
            source,
        })?;
        self.configuration
            .fetch()
            .map_err(|source| ProjectError::Fetch {
                kind: CONFIGURATION,
                source,
            })?;

        let base_snapshot = self.decode_at(base)?;
        debug!(base_ref = %base, placements = base_snapshot.len(), "fetched base state");
        let new_snapshot = self.decode_at(new)?;
        debug!(new_ref = %new, placements = new_snapshot.len(), "fetched new state");

        self.warn_foreign_urls(&[&base_snapshot, &new_snapshot]);

        reconcile(
            &mut self.configuration,
            sink,
            base,
            &base_snapshot,
            new,
            &new_snapshot,
        )
    }

    /// Propose a state change. Not implemented.
    pub fn propose(&mut self) -> Result<()> {
        Err(ProjectError::NotImplemented("propose"))
    }

    fn decode_at(&mut self, reference: &Ref) -> Result<Snapshot> {
        self.state
            .reset(reference)
            .map_err(|source| ProjectError::Checkout {
                reference: reference.clone(),
                source,
            })?;
        self.codec
            .decode(self.state.workdir())
            .map_err(|source| ProjectError::Decode {
                reference: reference.clone(),
                source,
            })
    }

    /// Content is always read from the configured configuration repository,
    /// whatever URL the state names.
    fn warn_foreign_urls(&self, snapshots: &[&Snapshot]) {
        let configured = &self.config.configuration.url;
        let foreign: BTreeSet<&str> = snapshots
            .iter()
            .flat_map(|s| s.iter())
            .map(|p| p.configuration_url.as_str())
            .filter(|url| !same_repository(url, configured))
            .collect();
        for url in foreign {
            warn!(
                state_url = url,
                configured_url = %configured,
                "placement names a different configuration repository; reading from the configured one"
            );
        }
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("state", &self.state)
            .field("configuration", &self.configuration)
            .field("codec", &self.codec)
            .finish()
    }
}

fn open_repo(
    cache_dir: &Path,
    kind: &'static str,
    url: &str,
    cancel: CancelToken,
) -> Result<LocalRepo> {
    let dir = cache_dir_for(cache_dir, kind, url);
    debug!(kind, url, dir = %dir.display(), "opening repository");
    LocalRepo::open_or_clone(dir, url, cancel).map_err(|source| ProjectError::Open {
        kind,
        url: url.to_string(),
        source,
    })
}

/// Whether two repository URLs name the same repository, ignoring scheme,
/// user info, the scp-style `:` separator, and a `.git` suffix.
fn same_repository(a: &str, b: &str) -> bool {
    canonical_url(a) == canonical_url(b)
}

fn canonical_url(url: &str) -> String {
    let url = url.split_once("://").map_or(url, |(_, rest)| rest);
    let url = url.split_once('@').map_or(url, |(_, rest)| rest);
    url.replace(':', "/")
        .trim_end_matches('/')
        .trim_end_matches(".git")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use statectl_codec::{SaasConfig, SaasFileCodec};
    use statectl_diff::{ChangeKind, DiffBlock};
    use statectl_repo::testing::Upstream;
    use statectl_repo::RepoError;
    use statectl_types::Cluster;
    use tempfile::TempDir;

    use crate::config::{RepoConfig, StateConfig};

    const SAAS: &str = "data/saas.yaml";
    const PROD: &str = "/ns/prod.yml";
    const STAGE: &str = "/ns/stage.yml";

    struct Fixture {
        state: Upstream,
        configuration: Upstream,
        cache: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                state: Upstream::init(),
                configuration: Upstream::init(),
                cache: tempfile::tempdir().unwrap(),
            }
        }

        fn project(&self) -> Project {
            let config = ProjectConfig {
                configuration: RepoConfig {
                    url: self.configuration.url(),
                },
                overview: RepoConfig::default(),
                state: StateConfig {
                    url: self.state.url(),
                    state_type: "app-interface".into(),
                    config: serde_yaml::Value::Null,
                },
            };
            let mut clusters = BTreeMap::new();
            clusters.insert(PROD.to_string(), Cluster::new("prod", "production"));
            clusters.insert(STAGE.to_string(), Cluster::new("stage", "staging"));
            let codec = Codec::SaasFile(SaasFileCodec::new(SaasConfig {
                saas_file: SAAS.into(),
                clusters_by_ref: clusters,
            }));
            Project::open(config, codec, self.cache.path(), CancelToken::new()).unwrap()
        }

        /// Commit a SaaS file with one template and the given targets
        /// (`(namespace, configuration ref, VERSION)`).
        fn commit_state(&self, path: &str, targets: &[(&str, &str, &str)]) -> Ref {
            let mut saas = format!(
                "resourceTemplates:\n  - name: svc-A\n    url: https://example.com/configuration\n    path: {path}\n"
            );
            saas.push_str(if targets.is_empty() {
                "    targets: []\n"
            } else {
                "    targets:\n"
            });
            for (namespace, reference, version) in targets {
                saas.push_str(&format!(
                    "      - namespace: {{ $ref: {namespace} }}\n        ref: \"{reference}\"\n        parameters: {{ VERSION: \"{version}\" }}\n"
                ));
            }
            let oid = self.state.commit(&[(SAAS, saas.as_str())], "state");
            Ref::new(oid.to_string())
        }

        fn commit_configuration(&self) -> String {
            self.configuration
                .commit(&[("deploy.yaml", "image: app:${VERSION}\n")], "configuration")
                .to_string()
        }
    }

    fn diff(project: &mut Project, base: &Ref, new: &Ref) -> (Vec<DiffBlock>, DiffOutcome) {
        let mut blocks = Vec::new();
        let outcome = project.diff_state(&mut blocks, base, new).unwrap();
        (blocks, outcome)
    }

    #[test]
    fn version_bump_diffs_rendered_configuration() {
        let fx = Fixture::new();
        let c1 = fx.commit_configuration();
        let base = fx.commit_state("/deploy.yaml", &[(PROD, &c1, "1.0")]);
        let new = fx.commit_state("/deploy.yaml", &[(PROD, &c1, "2.0")]);

        let (blocks, outcome) = diff(&mut fx.project(), &base, &new);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].key.service, "svc-A");
        assert_eq!(blocks[0].key.cluster, Cluster::new("prod", "production"));
        assert_eq!(blocks[0].kind, ChangeKind::Changed);
        assert!(blocks[0]
            .body()
            .contains("-image: app:1.0\n+image: app:2.0\n"));
        assert!(outcome.into_result().is_ok());
    }

    #[test]
    fn removed_target_diffs_against_empty() {
        let fx = Fixture::new();
        let c1 = fx.commit_configuration();
        let base = fx.commit_state("/deploy.yaml", &[(PROD, &c1, "1.0"), (STAGE, &c1, "1.0")]);
        let new = fx.commit_state("/deploy.yaml", &[(PROD, &c1, "1.0")]);

        let (blocks, outcome) = diff(&mut fx.project(), &base, &new);

        let removed: Vec<_> = blocks
            .iter()
            .filter(|b| b.kind == ChangeKind::Removed)
            .collect();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].key.cluster.name, "stage");
        assert!(removed[0].body().contains("-image: app:1.0\n"));
        assert_eq!(outcome.count(ChangeKind::Unchanged), 1);
        assert!(outcome.into_result().is_ok());
    }

    #[test]
    fn missing_configuration_path_is_reported() {
        let fx = Fixture::new();
        let c1 = fx.commit_configuration();
        let base = fx.commit_state("/missing.yaml", &[(PROD, &c1, "1.0")]);
        let new = fx.commit_state("/missing.yaml", &[(PROD, &c1, "2.0")]);

        let (blocks, outcome) = diff(&mut fx.project(), &base, &new);

        assert!(blocks.is_empty());
        let msg = outcome.into_result().unwrap_err().to_string();
        assert!(msg.starts_with("1 errors: "), "{msg}");
        assert!(msg.contains("svc-A"));
        assert!(msg.contains("prod (production)"));
        assert!(msg.contains("missing.yaml"));
    }

    #[test]
    fn same_reference_is_empty_diff() {
        let fx = Fixture::new();
        let c1 = fx.commit_configuration();
        let state = fx.commit_state("/deploy.yaml", &[(PROD, &c1, "1.0"), (STAGE, &c1, "1.0")]);

        let (blocks, outcome) = diff(&mut fx.project(), &state, &state);

        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.body().is_empty()));
        assert!(outcome.into_result().is_ok());
    }

    #[test]
    fn state_names_resolve_through_tags() {
        let fx = Fixture::new();
        let c1 = fx.commit_configuration();
        fx.configuration.tag("v1", c1.parse().unwrap());
        let base = fx.commit_state("/deploy.yaml", &[(PROD, "v1", "1.0")]);
        fx.state.tag("base", base.as_str().parse().unwrap());
        let new = fx.commit_state("/deploy.yaml", &[(PROD, "v1", "2.0")]);
        fx.state.tag("new", new.as_str().parse().unwrap());

        let (blocks, outcome) = diff(&mut fx.project(), &Ref::new("base"), &Ref::new("new"));

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, ChangeKind::Changed);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn unknown_state_reference_is_fatal() {
        let fx = Fixture::new();
        let c1 = fx.commit_configuration();
        let base = fx.commit_state("/deploy.yaml", &[(PROD, &c1, "1.0")]);

        let mut blocks: Vec<DiffBlock> = Vec::new();
        let err = fx
            .project()
            .diff_state(&mut blocks, &base, &Ref::new("no-such-tag"))
            .unwrap_err();

        match err {
            ProjectError::Checkout {
                source: RepoError::Reset { source, .. },
                ..
            } => assert!(matches!(*source, RepoError::ReferenceNotFound { .. })),
            other => panic!("unexpected error: {other}"),
        }
        assert!(blocks.is_empty());
    }

    #[test]
    fn unknown_cluster_is_decode_error() {
        let fx = Fixture::new();
        let c1 = fx.commit_configuration();
        let base = fx.commit_state("/deploy.yaml", &[("/ns/unknown.yml", &c1, "1.0")]);

        let mut blocks: Vec<DiffBlock> = Vec::new();
        let err = fx
            .project()
            .diff_state(&mut blocks, &base, &base)
            .unwrap_err();
        assert!(matches!(err, ProjectError::Decode { .. }));
    }

    #[test]
    fn reopening_the_cache_reuses_clones() {
        let fx = Fixture::new();
        let c1 = fx.commit_configuration();
        let base = fx.commit_state("/deploy.yaml", &[(PROD, &c1, "1.0")]);
        drop(fx.project());

        let new = fx.commit_state("/deploy.yaml", &[(PROD, &c1, "2.0")]);
        let (blocks, _) = diff(&mut fx.project(), &base, &new);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, ChangeKind::Changed);
    }

    #[test]
    fn open_fails_for_unreachable_remote() {
        let cache = tempfile::tempdir().unwrap();
        let missing = cache.path().join("nowhere");
        let config = ProjectConfig {
            configuration: RepoConfig::default(),
            overview: RepoConfig::default(),
            state: StateConfig {
                url: missing.to_string_lossy().into_owned(),
                ..StateConfig::default()
            },
        };
        let codec = Codec::SaasFile(SaasFileCodec::new(SaasConfig::default()));
        let err = Project::open(config, codec, cache.path(), CancelToken::new()).unwrap_err();
        assert!(matches!(err, ProjectError::Open { kind: "state", .. }));
    }

    #[test]
    fn propose_not_implemented() {
        let fx = Fixture::new();
        fx.commit_configuration();
        fx.commit_state("/deploy.yaml", &[]);
        let err = fx.project().propose().unwrap_err();
        assert_eq!(err.to_string(), "propose is not implemented");
    }

    #[test]
    fn repository_url_comparison() {
        assert!(same_repository(
            "https://github.com/org/configuration",
            "git@github.com:org/configuration.git"
        ));
        assert!(same_repository(
            "github.com/org/configuration",
            "ssh://git@github.com/org/configuration"
        ));
        assert!(!same_repository(
            "github.com/org/configuration",
            "github.com/org/other"
        ));
    }
}
