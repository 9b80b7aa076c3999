//! Shared test utilities for vaultctl crates.
//!
//! This crate provides:
//! - Proptest generators for context definitions and secret values
//! - An in-memory [`mocks::MockSecretStore`]
//! - Test fixtures with sample context files and Vault payloads

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
pub use mocks::{MockEntry, MockSecretStore};
