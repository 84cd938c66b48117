//! statectl projects.
//!
//! A project ties a state repository to the configuration repository its
//! placements render from. [`Project::diff_state`] decodes the state at two
//! references, renders every placement's configuration with its parameters,
//! and streams one diff block per placement to a sink.
//!
//! # Modules
//!
//! - [`config`] — Project configuration file and codec selection
//! - [`engine`] — Reconciliation of two snapshots into diff blocks
//! - [`project`] — [`Project`], owning both repository checkouts
//! - [`substitute`] — `${NAME}` parameter substitution
//! - [`error`] — Error types

pub mod config;
pub mod engine;
pub mod error;
pub mod project;
pub mod substitute;

pub use config::{load_project_config, ProjectConfig, RepoConfig, StateConfig, DEFAULT_CONFIG_FILE};
pub use engine::{reconcile, ContentSource, DiffOutcome};
pub use error::{ConfigError, ProjectError, ResolutionError, Result};
pub use project::Project;
pub use substitute::substitute;
