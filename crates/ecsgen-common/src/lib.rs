//! Common types and utilities for the ecsgen companion-type generator.
//!
//! This crate provides foundational types used across all ecsgen crates:
//! - Assembly identities (`AssemblyIdentity`) and their display form
//! - Metadata naming conventions (constructor names, nested separators)
//! - Centralized recursion and capacity limits

// Assembly identity - name + version pairs used to scope type references
pub mod identity;
pub use identity::{AssemblyIdentity, IdentityParseError};

// Metadata naming conventions shared by model and synthesis
pub mod names;

// Centralized limits and thresholds
pub mod limits;
