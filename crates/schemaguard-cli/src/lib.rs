//! SchemaGuard CLI library.
//!
//! This module exposes internal types for testing purposes.
//! The main entry point is the `schemaguard` binary.

pub mod cli;
pub mod input;
pub mod output;
pub mod schema;

// Re-export commonly used types
pub use cli::Args;
