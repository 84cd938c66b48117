//! State codecs for statectl.
//!
//! A state codec reads a checked-out state repository and produces the
//! [`Snapshot`](statectl_types::Snapshot) of service placements it declares.
//! Which codec is used is selected by the `state.type` tag of the project
//! configuration.
//!
//! # Modules
//!
//! - [`error`] — Error types for decoding and encoding
//! - [`traits`] — The [`StateCodec`] contract
//! - [`saas`] — [`SaasFileCodec`], reading one SaaS deployment-template file
//! - [`registry`] — [`StateType`] tags and the [`Codec`] dispatch enum

pub mod error;
pub mod registry;
pub mod saas;
pub mod traits;

pub use error::{CodecError, Result};
pub use registry::{Codec, StateType};
pub use saas::{SaasConfig, SaasFileCodec};
pub use traits::StateCodec;
