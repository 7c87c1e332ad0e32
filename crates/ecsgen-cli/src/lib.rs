//! Command-line front end for ecsgen.
//!
//! The binary lives in `src/bin/ecsgen.rs`; everything it calls is here so
//! the subcommands can be tested without spawning a process.

pub mod args;
pub mod driver;
pub mod tracing_config;
