//! Error types for state codecs.

use std::path::PathBuf;

use statectl_types::TypeError;
use thiserror::Error;

/// Errors that can occur while decoding or encoding state.
///
/// Every decode error is fatal for the whole snapshot: a state file that
/// cannot be fully trusted is not partially used.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The state file could not be read.
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The state file is not valid for the schema.
    #[error("unmarshal {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// A target names a cluster that is not in the configured cluster table.
    #[error("no cluster defined in configuration for reference {reference} (service {service:?})")]
    UnknownClusterReference { reference: String, service: String },

    /// The decoded placements violate snapshot invariants.
    #[error("invalid state: {0}")]
    InvalidState(#[from] TypeError),

    /// The codec-specific configuration could not be parsed.
    #[error("{state_type} state config: {source}")]
    Config {
        state_type: String,
        source: serde_yaml::Error,
    },

    /// A declared capability is not implemented by this codec.
    #[error("{operation} is not implemented for {codec} state")]
    NotImplemented {
        operation: &'static str,
        codec: &'static str,
    },
}

/// Convenience type alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
