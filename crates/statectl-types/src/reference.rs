//! Repository references.
//!
//! A [`Ref`] names a point in a repository's history the way a user typed it:
//! either a full commit hash or a branch/tag name. Classification is purely
//! syntactic; turning a name into a commit requires the repository's ref
//! database and lives in `statectl-repo`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Hex length of a SHA-1 object id.
pub const SHA1_HEX_LEN: usize = 40;

/// Hex length of a SHA-256 object id.
pub const SHA256_HEX_LEN: usize = 64;

/// A git repository version that can be checked out: a commit hash, a branch,
/// or a tag.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ref(String);

/// How a [`Ref`] has to be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefKind<'a> {
    /// The literal is already a full commit hash; no lookup needed.
    Commit(&'a str),
    /// A branch or tag name, resolved against the repository's refs.
    Name(&'a str),
}

impl Ref {
    /// Wrap a raw reference string without validation.
    ///
    /// Used for references read from state files, where an empty or odd
    /// value must surface later as a resolution failure for that placement
    /// rather than as a decode failure for the whole snapshot.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse a user-supplied reference.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        if raw.is_empty() {
            return Err(TypeError::EmptyReference);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidReference(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// The reference exactly as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify this reference.
    pub fn kind(&self) -> RefKind<'_> {
        if is_commit_hash(&self.0) {
            RefKind::Commit(&self.0)
        } else {
            RefKind::Name(&self.0)
        }
    }

    /// The commit hash, if this reference is hash-shaped.
    pub fn commit_hash(&self) -> Option<&str> {
        match self.kind() {
            RefKind::Commit(hash) => Some(hash),
            RefKind::Name(_) => None,
        }
    }
}

/// Returns `true` if `s` has the shape of a full commit hash (40 or 64 hex
/// digits).
pub fn is_commit_hash(s: &str) -> bool {
    matches!(s.len(), SHA1_HEX_LEN | SHA256_HEX_LEN) && hex::decode(s).is_ok()
}

impl FromStr for Ref {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({})", self.0)
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ref {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
