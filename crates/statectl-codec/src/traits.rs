//! The [`StateCodec`] contract.

use std::path::Path;

use statectl_types::Snapshot;

use crate::error::Result;

/// Reads and writes one state-description schema.
///
/// Implementations must make `decode` a pure function of the working-copy
/// content and the codec's own configuration: decoding the same tree twice
/// yields the same ordered snapshot.
pub trait StateCodec: Send + Sync {
    /// Short name of the schema, used in logs and errors.
    fn name(&self) -> &'static str;

    /// Decode the placements declared in the working copy at `dir`.
    fn decode(&self, dir: &Path) -> Result<Snapshot>;

    /// Write `snapshot` back into the working copy at `dir`.
    ///
    /// Codecs that cannot encode must fail with
    /// [`CodecError::NotImplemented`](crate::CodecError::NotImplemented)
    /// rather than silently doing nothing.
    fn encode(&self, dir: &Path, snapshot: &Snapshot) -> Result<()>;
}
