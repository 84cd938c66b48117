//! Local repository handles for statectl.
//!
//! A [`LocalRepo`] wraps one on-disk working copy of a remote repository. It
//! is opened (or cloned without checkout) once per process and then mutated
//! in place: [`LocalRepo::fetch`] refreshes remote-tracking refs and
//! [`LocalRepo::reset`] forces the working tree to one commit.
//!
//! # Exclusive access
//!
//! A reset rewrites the single working tree, so a read is only meaningful
//! until the next reset. `reset` takes `&mut self`: whoever owns the handle
//! serializes every reset-then-read pair, and the borrow checker rules out
//! two logical operations interleaving on the same checkout.
//!
//! # Modules
//!
//! - [`error`] — Error types for repository operations
//! - [`local`] — The git-backed [`LocalRepo`]
//! - [`cache`] — Mapping repository URLs to cache directories
//! - [`cancel`] — [`CancelToken`] for aborting network transfers

pub mod cache;
pub mod cancel;
pub mod error;
pub mod local;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cache::cache_dir_for;
pub use cancel::CancelToken;
pub use error::{RepoError, Result};
pub use local::{LocalRepo, REMOTE};
