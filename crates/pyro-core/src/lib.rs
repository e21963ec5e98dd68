//! Pyro Core - Foundational types for the Pyro effects
//!
//! This crate provides the types that all other Pyro crates depend on:
//! - `PyroError` and the `Result` alias
//! - `ConfigSnapshot` - the flat key/value settings snapshot effects consume

mod config;
mod error;

pub use config::{ConfigSnapshot, ConfigValue};
pub use error::{PyroError, Result};
