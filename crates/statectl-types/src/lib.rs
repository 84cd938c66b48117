//! Foundation types for statectl.
//!
//! This crate provides the codec-independent vocabulary shared by every other
//! statectl crate: how a point in repository history is named, what a service
//! placement looks like once decoded, and how per-placement failures are
//! collected without aborting a whole diff.
//!
//! # Key Types
//!
//! - [`Ref`] — Commit hash or branch/tag name identifying a point in history
//! - [`Cluster`] — Deployment target (`name` + `environment`)
//! - [`Placement`] — "service S runs on cluster C from path P at ref R"
//! - [`PlacementKey`] — `(service, cluster)` identity used for reconciliation
//! - [`Snapshot`] — All placements decoded at one state reference
//! - [`MultiError`] — Flattening aggregator for per-placement failures

pub mod error;
pub mod multi_error;
pub mod placement;
pub mod reference;

pub use error::TypeError;
pub use multi_error::MultiError;
pub use placement::{Cluster, Placement, PlacementKey, Snapshot};
pub use reference::{Ref, RefKind};
