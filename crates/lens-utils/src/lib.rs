//! Shared utilities for tickerlens
//!
//! This crate provides common functionality used across the tickerlens
//! workspace, currently the logging setup shared by the library and the CLI.

pub mod logging;

pub use logging::{init_tracing, init_tracing_with_default};
