//! # Swarmcheck Common
//!
//! Shared types, errors, and constants used by the swarmcheck harness.
//!
//! ## Modules
//! - `types` - Unit identity, command output, credentials, check reports
//! - `error` - The verification error taxonomy
//! - `constants` - Remote commands, ports, paths, and defaults

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Result, VerifyError};
pub use types::*;
