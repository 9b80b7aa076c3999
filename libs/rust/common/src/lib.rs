//! Shared library for cross-cutting concerns in vaultctl.
//!
//! This crate provides centralized implementations for:
//! - HTTP client configuration and building
//! - Tracing subscriber setup for CLI binaries
//! - Colored terminal output helpers

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod http;
pub mod term;
pub mod tracing_config;

pub use http::{HttpConfig, build_http_client};
pub use tracing_config::{TracingConfig, init_tracing};
