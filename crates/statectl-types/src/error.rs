use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("reference must not be empty")]
    EmptyReference,

    #[error("reference {0:?} contains whitespace")]
    InvalidReference(String),

    #[error("duplicate placement of service {service:?} on cluster {cluster}")]
    DuplicatePlacement { service: String, cluster: String },
}
