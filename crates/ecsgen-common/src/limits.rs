//! Centralized limits and thresholds for the generator.
//!
//! The type graphs handled here are assumed to be acyclic. These limits only
//! exist so that a malformed image ends a query instead of overflowing the
//! stack or looping forever.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum generic nesting followed by assignability checks.
///
/// Base chains and interface lists are walked with a visited set and have no
/// length limit. This bounds the one thing a visited set cannot catch: a
/// generic that names a deeper instantiation of itself as its base, such as
/// `Node<T> : Node<List<T>>`. Past this depth the check answers "not
/// assignable".
pub const MAX_GENERIC_DEPTH: u32 = 64;

/// Maximum number of assemblies loaded transitively when building a type
/// context from an image's reference list.
pub const MAX_REFERENCE_CLOSURE: usize = 1024;
