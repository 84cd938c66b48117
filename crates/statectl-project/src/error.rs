//! Error types for projects.

use statectl_codec::CodecError;
use statectl_repo::RepoError;
use statectl_types::{PlacementKey, Ref};
use thiserror::Error;

/// Errors while loading the project configuration. All of them are fatal
/// before any repository is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unmarshal project config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("not supported state type {found:?}, supported [{supported}]")]
    UnsupportedStateType { found: String, supported: String },

    #[error("load state config: {0}")]
    CodecConfig(#[source] CodecError),
}

/// Fatal errors of project operations.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("open {kind} repository {url}: {source}")]
    Open {
        kind: &'static str,
        url: String,
        source: RepoError,
    },

    #[error("update {kind} repository: {source}")]
    Fetch {
        kind: &'static str,
        source: RepoError,
    },

    #[error("checkout state {reference}: {source}")]
    Checkout { reference: Ref, source: RepoError },

    #[error("decode state at {reference}: {source}")]
    Decode { reference: Ref, source: CodecError },

    #[error("write diff: {0}")]
    Output(#[source] std::io::Error),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

/// Failure to materialize one placement's configuration. Recorded and
/// reported at the end of a diff; never aborts it.
#[derive(Debug, Error)]
#[error(
    "checkout configuration {path:?} at {configuration_ref} referenced by state {state_ref} for {key}: {source}"
)]
pub struct ResolutionError {
    pub key: PlacementKey,
    pub state_ref: Ref,
    pub configuration_ref: Ref,
    pub path: String,
    #[source]
    pub source: RepoError,
}

pub type Result<T> = std::result::Result<T, ProjectError>;
