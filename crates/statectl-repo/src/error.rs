//! Error types for repository operations.

use std::path::PathBuf;

use statectl_types::Ref;
use thiserror::Error;

/// Errors that can occur while working with a local repository.
#[derive(Debug, Error)]
pub enum RepoError {
    /// An existing local repository could not be opened.
    #[error("open repository at {}: {source}", dir.display())]
    Open { dir: PathBuf, source: git2::Error },

    /// Cloning the remote into the cache failed.
    #[error("clone {url} to {}: {source}", dir.display())]
    Clone {
        url: String,
        dir: PathBuf,
        source: git2::Error,
    },

    /// Fetching remote refs failed.
    #[error("fetch {url}: {source}")]
    Fetch { url: String, source: git2::Error },

    /// A transfer was aborted through the cancellation token.
    #[error("fetch {url}: canceled")]
    Canceled { url: String },

    /// A branch or tag name did not match any ref.
    #[error("reference {reference} not found in {url}")]
    ReferenceNotFound { reference: Ref, url: String },

    /// A hash-shaped reference is not a valid object id for this repository.
    #[error("invalid commit {reference}: {source}")]
    InvalidCommit { reference: Ref, source: git2::Error },

    /// A ref exists but could not be peeled to a commit.
    #[error("resolve {reference}: {source}")]
    Resolve { reference: Ref, source: git2::Error },

    /// Checking out a resolved commit failed.
    #[error("checkout {commit}: {source}")]
    Checkout { commit: String, source: git2::Error },

    /// Forcing the working tree to a reference failed, either because the
    /// reference does not resolve or because the checkout did.
    #[error("reset to {reference}: {source}")]
    Reset {
        reference: Ref,
        source: Box<RepoError>,
    },

    /// A file path points outside the working copy.
    #[error("path {path:?} escapes the working copy")]
    OutsideWorkdir { path: String },

    /// Reading a file from the working copy failed.
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// I/O error while preparing the cache directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for repository operations.
pub type Result<T> = std::result::Result<T, RepoError>;
