//! Reference assembly resolution.
//!
//! Two layers, mirroring their lifetimes:
//!
//! - [`AssemblyCache`] outlives individual passes. It holds every reference
//!   image parsed so far, keyed by identity in insertion order, plus the path
//!   each came from, so a reference is decoded once per process.
//! - [`AssemblyResolver`] lives for one pass. It is seeded with the pass's
//!   reference paths, remembers the directories they live in, and answers
//!   `resolve(identity)` from its own set, then (optionally) from the cache's
//!   already-loaded set, then by probing its search directories.
//!
//! Resolution failures are not errors: `resolve` returns `None` and the
//! caller surfaces the consequence (usually an unresolved base type) later.

use crate::error::ImageError;
use crate::image::AssemblyImage;
use ecsgen_common::AssemblyIdentity;
use ecsgen_common::names::IMAGE_EXTENSION;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};

// =============================================================================
// AssemblyCache
// =============================================================================

/// Process-wide cache of decoded reference images.
#[derive(Debug, Default)]
pub struct AssemblyCache {
    /// Full display name -> image, in load order.
    by_identity: IndexMap<String, Arc<AssemblyImage>>,
    /// Canonical path -> full display name.
    by_path: FxHashMap<PathBuf, String>,
}

impl AssemblyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the image at `path`, reusing a previously decoded copy.
    pub fn load_path(&mut self, path: &Path) -> Result<Arc<AssemblyImage>, ImageError> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Some(image) = self
            .by_path
            .get(&key)
            .and_then(|name| self.by_identity.get(name))
        {
            trace!(path = %key.display(), "AssemblyCache::load_path hit");
            return Ok(Arc::clone(image));
        }

        let image = Arc::new(AssemblyImage::load(path)?);
        let full_name = image.identity().full_name();
        debug!(path = %key.display(), assembly = %full_name, "AssemblyCache::load_path decoded");
        self.by_path.insert(key, full_name.clone());
        Ok(Arc::clone(
            self.by_identity.entry(full_name).or_insert(image),
        ))
    }

    /// Register an already-decoded image (host-loaded assemblies).
    pub fn insert(&mut self, image: Arc<AssemblyImage>) -> Arc<AssemblyImage> {
        let full_name = image.identity().full_name();
        Arc::clone(self.by_identity.entry(full_name).or_insert(image))
    }

    /// Exact identity lookup.
    pub fn get(&self, identity: &AssemblyIdentity) -> Option<Arc<AssemblyImage>> {
        self.by_identity.get(&identity.full_name()).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }

    /// Cached images in load order.
    pub fn images(&self) -> impl Iterator<Item = &Arc<AssemblyImage>> {
        self.by_identity.values()
    }
}

// =============================================================================
// AssemblyResolver
// =============================================================================

/// Per-pass reference resolver.
pub struct AssemblyResolver<'c> {
    cache: &'c mut AssemblyCache,
    search_directories: Vec<PathBuf>,
    /// Full display name -> image resolved during this pass.
    used: IndexMap<String, Arc<AssemblyImage>>,
    /// Fall back to the cache's already-loaded set for identities that were
    /// not among the seeded references.
    resolve_additional: bool,
}

impl<'c> AssemblyResolver<'c> {
    /// Create a resolver seeded with `reference_paths`.
    ///
    /// Every seeded path is decoded (through the cache) and its directory
    /// becomes a search directory.
    pub fn new(
        cache: &'c mut AssemblyCache,
        reference_paths: &[PathBuf],
        resolve_additional: bool,
    ) -> Result<Self, ImageError> {
        let mut resolver = Self {
            cache,
            search_directories: Vec::new(),
            used: IndexMap::new(),
            resolve_additional,
        };
        for path in reference_paths {
            let image = resolver.cache.load_path(path)?;
            if let Some(dir) = path.parent() {
                resolver.add_search_directory(dir);
            }
            resolver.register(image);
        }
        Ok(resolver)
    }

    /// Add a directory probed for `<name>.dll` when an identity is unknown.
    pub fn add_search_directory(&mut self, dir: &Path) {
        if !self.search_directories.iter().any(|d| d == dir) {
            self.search_directories.push(dir.to_path_buf());
        }
    }

    pub fn search_directories(&self) -> &[PathBuf] {
        &self.search_directories
    }

    /// Make `image` resolvable for the rest of the pass.
    pub fn register(&mut self, image: Arc<AssemblyImage>) {
        self.used
            .entry(image.identity().full_name())
            .or_insert(image);
    }

    /// Images resolved so far, in resolution order.
    pub fn assemblies(&self) -> impl Iterator<Item = &Arc<AssemblyImage>> {
        self.used.values()
    }

    /// Resolve an assembly identity.
    pub fn resolve(&mut self, identity: &AssemblyIdentity) -> Option<Arc<AssemblyImage>> {
        let full_name = identity.full_name();
        if let Some(image) = self.used.get(&full_name) {
            return Some(Arc::clone(image));
        }

        if self.resolve_additional {
            if let Some(image) = self.cache.get(identity) {
                trace!(assembly = %full_name, "resolved from loaded set");
                self.register(Arc::clone(&image));
                return Some(image);
            }
        }

        for dir in self.search_directories.clone() {
            let candidate = dir.join(format!("{}.{IMAGE_EXTENSION}", identity.name));
            if !candidate.is_file() {
                continue;
            }
            match self.cache.load_path(&candidate) {
                Ok(image) if image.identity() == identity => {
                    trace!(assembly = %full_name, path = %candidate.display(), "resolved from search directory");
                    self.register(Arc::clone(&image));
                    return Some(image);
                }
                Ok(image) => {
                    debug!(
                        wanted = %full_name,
                        found = %image.identity(),
                        "search directory holds a different version"
                    );
                }
                Err(err) => {
                    warn!(path = %candidate.display(), error = %err, "failed to read candidate reference");
                }
            }
        }

        debug!(assembly = %full_name, "reference not resolved");
        None
    }
}

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod tests;
