//! # taxonwatch common library
//!
//! Shared code for the taxonwatch tools:
//! - Error types
//! - Configuration resolution (CLI → ENV → TOML → default)
//! - Schema-less JSON record lookup
//! - FinBIF (laji.fi) API client

pub mod client;
pub mod config;
pub mod error;
pub mod records;

pub use error::{Error, Result};
