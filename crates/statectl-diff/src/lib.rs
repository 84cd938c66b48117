//! Diff rendering for statectl.
//!
//! Compares two versions of a placement's rendered configuration line by
//! line and turns the result into printable diff blocks.
//!
//! # Key Types
//!
//! - [`ContentDiff`] / [`DiffHunk`] / [`DiffLine`] -- Line-level diff of two texts
//! - [`DiffBlock`] / [`ChangeKind`] -- One placement's diff with its header
//! - [`DiffSink`] -- Where blocks go as soon as they are computed

pub mod block;
pub mod content_diff;
pub mod sink;

pub use block::{ChangeKind, DiffBlock, Side};
pub use content_diff::{diff_contents, ContentDiff, DiffHunk, DiffLine};
pub use sink::{DiffSink, JsonSink, TextSink};
