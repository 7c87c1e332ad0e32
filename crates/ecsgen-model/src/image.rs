//! Assembly images.
//!
//! An `AssemblyImage` is the mutable in-memory form of one compiled module:
//! an arena of [`TypeDef`] nodes plus the assembly's identity and the
//! identities it references. Images are read from (and written back to) two
//! byte streams:
//!
//! | Stream | Content |
//! |--------|---------|
//! | `pe`   | the encoded metadata graph (format header + image) |
//! | `pdb`  | the [`DebugSymbols`] table, one row per type |
//!
//! Nodes are only ever added. The full-name lookup table is derived state: it
//! is rebuilt after decoding and kept current by [`AssemblyImage::add_type`]
//! and [`AssemblyImage::add_nested_type`].

use crate::error::ImageError;
use crate::symbols::{DebugSymbols, SymbolEntry};
use crate::type_def::{TypeDef, TypeDefId};
use crate::type_ref::TypeRef;
use ecsgen_common::AssemblyIdentity;
use ecsgen_common::names::{SYMBOLS_EXTENSION, nest, qualify};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::ops::Index;
use std::path::Path;
use tracing::{debug, trace};

/// Format tag written at the start of every encoded image.
pub const IMAGE_FORMAT: &str = "ecsgen-image";

/// Current encoding version.
pub const IMAGE_FORMAT_VERSION: u32 = 1;

/// Encoded image and symbol streams.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageBytes {
    pub pe: Vec<u8>,
    pub pdb: Vec<u8>,
}

#[derive(Serialize)]
struct EncodedImageRef<'a> {
    format: &'a str,
    version: u32,
    assembly: &'a AssemblyImage,
}

#[derive(Deserialize)]
struct EncodedImage {
    format: String,
    version: u32,
    assembly: AssemblyImage,
}

/// In-memory metadata graph of one assembly.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyImage {
    identity: AssemblyIdentity,

    #[serde(default)]
    references: Vec<AssemblyIdentity>,

    /// Arena of every node, top-level and nested.
    #[serde(default)]
    types: Vec<TypeDef>,

    /// Top-level nodes in declaration order.
    #[serde(default)]
    roots: Vec<TypeDefId>,

    #[serde(skip)]
    by_name: FxHashMap<String, TypeDefId>,
}

impl AssemblyImage {
    /// Create an empty image.
    pub fn new(identity: AssemblyIdentity) -> Self {
        Self {
            identity,
            references: Vec::new(),
            types: Vec::new(),
            roots: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    pub fn identity(&self) -> &AssemblyIdentity {
        &self.identity
    }

    /// Simple name of the assembly; scope of every reference to its types.
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Referenced assemblies in declaration order.
    pub fn references(&self) -> &[AssemblyIdentity] {
        &self.references
    }

    /// Record a reference to another assembly. A second reference to the
    /// same simple name is ignored.
    pub fn add_reference(&mut self, identity: AssemblyIdentity) {
        if identity.name == self.identity.name
            || self.references.iter().any(|r| r.name == identity.name)
        {
            return;
        }
        self.references.push(identity);
    }

    // -------------------------------------------------------------------------
    // Arena
    // -------------------------------------------------------------------------

    fn allocate(&mut self, def: TypeDef) -> TypeDefId {
        let id = TypeDefId(self.types.len() as u32);
        self.types.push(def);
        let full_name = self.full_name(id);
        trace!(assembly = %self.identity.name, id = id.0, %full_name, "AssemblyImage::allocate");
        self.by_name.entry(full_name).or_insert(id);
        id
    }

    /// Add a top-level type.
    pub fn add_type(&mut self, mut def: TypeDef) -> TypeDefId {
        def.declaring = None;
        let id = self.allocate(def);
        self.roots.push(id);
        id
    }

    /// Add `def` as a nested type of `parent`.
    pub fn add_nested_type(&mut self, parent: TypeDefId, mut def: TypeDef) -> TypeDefId {
        def.declaring = Some(parent);
        let id = self.allocate(def);
        if let Some(parent_def) = self.types.get_mut(parent.index()) {
            parent_def.nested.push(id);
        }
        id
    }

    pub fn get(&self, id: TypeDefId) -> Option<&TypeDef> {
        self.types.get(id.index())
    }

    pub fn get_mut(&mut self, id: TypeDefId) -> Option<&mut TypeDef> {
        self.types.get_mut(id.index())
    }

    /// Number of nodes, nested ones included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Top-level nodes in declaration order.
    pub fn roots(&self) -> &[TypeDefId] {
        &self.roots
    }

    /// Every node, each top-level node followed by its nested nodes
    /// (depth-first, declaration order).
    pub fn type_ids(&self) -> Vec<TypeDefId> {
        let mut out = Vec::with_capacity(self.types.len());
        let mut stack: Vec<TypeDefId> = self.roots.iter().rev().copied().collect();
        let mut seen = FxHashSet::default();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(def) = self.get(id) else { continue };
            out.push(id);
            stack.extend(def.nested.iter().rev().copied());
        }
        out
    }

    /// Look up a node by full name (`Ns.Outer/Inner`).
    pub fn find(&self, full_name: &str) -> Option<TypeDefId> {
        self.by_name.get(full_name).copied()
    }

    /// Full name of a node: namespace-qualified for top-level nodes,
    /// `Declaring/Name` for nested ones.
    pub fn full_name(&self, id: TypeDefId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let Some(def) = self.get(cur) else { break };
            if def.declaring.is_some() && segments.len() < self.types.len() {
                segments.push(def.name.as_str());
                current = def.declaring;
            } else {
                let mut name = qualify(&def.namespace, &def.name);
                for segment in segments.iter().rev() {
                    name = nest(&name, segment);
                }
                return name;
            }
        }
        segments.into_iter().rev().collect::<Vec<_>>().join("/")
    }

    /// Reference to a node of this image.
    pub fn reference_to(&self, id: TypeDefId) -> TypeRef {
        TypeRef::named(self.identity.name.clone(), self.full_name(id))
    }

    /// Unique identity of a node (`Full.Name/Assembly`).
    pub fn unique_name(&self, id: TypeDefId) -> String {
        self.reference_to(id).unique_name()
    }

    fn rebuild_lookup(&mut self) {
        self.by_name.clear();
        for index in 0..self.types.len() {
            let id = TypeDefId(index as u32);
            let full_name = self.full_name(id);
            self.by_name.entry(full_name).or_insert(id);
        }
    }

    // -------------------------------------------------------------------------
    // Symbols
    // -------------------------------------------------------------------------

    /// Build the symbol table for the current graph.
    pub fn symbols(&self) -> DebugSymbols {
        DebugSymbols {
            assembly: self.identity.full_name(),
            entries: self
                .type_ids()
                .into_iter()
                .filter_map(|id| {
                    Some(SymbolEntry {
                        type_name: self.full_name(id),
                        location: self.get(id)?.source.clone(),
                    })
                })
                .collect(),
        }
    }

    /// Copy declaration sites from `symbols` onto matching nodes.
    pub fn apply_symbols(&mut self, symbols: &DebugSymbols) {
        for entry in &symbols.entries {
            if let Some(id) = self.find(&entry.type_name) {
                self.types[id.index()].source = entry.location.clone();
            }
        }
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Check the structural invariants every written image must satisfy.
    ///
    /// - roots are in range and top-level
    /// - nested/declaring links are in range and agree with each other
    /// - full names are unique
    /// - field names are unique per type
    /// - constructor bodies, when present, end with a return
    pub fn validate(&self) -> Result<(), ImageError> {
        let assembly = self.identity.name.as_str();
        let count = self.types.len();
        let mut names = FxHashSet::default();

        for root in &self.roots {
            match self.get(*root) {
                None => {
                    return Err(ImageError::malformed(
                        assembly,
                        format!("dangling root type id {}", root.0),
                    ));
                }
                Some(def) if def.declaring.is_some() => {
                    return Err(ImageError::malformed(
                        assembly,
                        format!("nested type '{}' listed as a root", def.name),
                    ));
                }
                Some(_) => {}
            }
        }

        for (index, def) in self.types.iter().enumerate() {
            let id = TypeDefId(index as u32);

            if let Some(parent) = def.declaring {
                let Some(parent_def) = self.get(parent) else {
                    return Err(ImageError::malformed(
                        assembly,
                        format!("type '{}' has a dangling declaring type", def.name),
                    ));
                };
                if !parent_def.nested.contains(&id) {
                    return Err(ImageError::malformed(
                        assembly,
                        format!("type '{}' is not listed by its declaring type", def.name),
                    ));
                }
            }
            for nested in &def.nested {
                if nested.index() >= count {
                    return Err(ImageError::malformed(
                        assembly,
                        format!("type '{}' lists a dangling nested type", def.name),
                    ));
                }
            }

            let full_name = self.full_name(id);
            if !names.insert(full_name.clone()) {
                return Err(ImageError::malformed(
                    assembly,
                    format!("duplicate type name '{full_name}'"),
                ));
            }

            let mut fields = FxHashSet::default();
            for field in &def.fields {
                if !fields.insert(field.name.as_str()) {
                    return Err(ImageError::malformed(
                        assembly,
                        format!("duplicate field '{}' on '{full_name}'", field.name),
                    ));
                }
            }

            for ctor in def.constructors() {
                if !ctor.body.is_empty()
                    && ctor.body.last() != Some(&crate::members::Instruction::Return)
                {
                    return Err(ImageError::malformed(
                        assembly,
                        format!("constructor of '{full_name}' does not return"),
                    ));
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Encoding
    // -------------------------------------------------------------------------

    /// Decode an image from its byte streams. Symbols are optional; the
    /// decoded graph must pass [`validate`](Self::validate).
    pub fn read(pe: &[u8], pdb: Option<&[u8]>) -> Result<Self, ImageError> {
        let encoded: EncodedImage = serde_json::from_slice(pe).map_err(ImageError::Decode)?;
        if encoded.format != IMAGE_FORMAT || encoded.version > IMAGE_FORMAT_VERSION {
            return Err(ImageError::UnsupportedFormat {
                format: encoded.format,
                version: encoded.version,
            });
        }

        let mut image = encoded.assembly;
        image.rebuild_lookup();
        image.validate()?;
        if let Some(pdb) = pdb {
            let symbols: DebugSymbols =
                serde_json::from_slice(pdb).map_err(ImageError::Decode)?;
            image.apply_symbols(&symbols);
        }
        debug!(
            assembly = %image.identity,
            types = image.len(),
            with_symbols = pdb.is_some(),
            "read assembly image"
        );
        Ok(image)
    }

    /// Validate and encode the image together with freshly generated symbols.
    pub fn write(&self) -> Result<ImageBytes, ImageError> {
        self.validate()?;
        let pe = serde_json::to_vec(&EncodedImageRef {
            format: IMAGE_FORMAT,
            version: IMAGE_FORMAT_VERSION,
            assembly: self,
        })
        .map_err(ImageError::Encode)?;
        let pdb = serde_json::to_vec(&self.symbols()).map_err(ImageError::Encode)?;
        Ok(ImageBytes { pe, pdb })
    }

    /// Read an image from disk, picking up a sibling `.pdb` when present.
    pub fn load(path: &Path) -> Result<Self, ImageError> {
        let pe = std::fs::read(path).map_err(|e| ImageError::io(path, e))?;
        let pdb_path = path.with_extension(SYMBOLS_EXTENSION);
        let pdb = if pdb_path.is_file() {
            Some(std::fs::read(&pdb_path).map_err(|e| ImageError::io(&pdb_path, e))?)
        } else {
            None
        };
        Self::read(&pe, pdb.as_deref())
    }

    /// Write the image and its sibling `.pdb` to disk.
    pub fn save(&self, path: &Path) -> Result<(), ImageError> {
        let ImageBytes { pe, pdb } = self.write()?;
        std::fs::write(path, pe).map_err(|e| ImageError::io(path, e))?;
        let pdb_path = path.with_extension(SYMBOLS_EXTENSION);
        std::fs::write(&pdb_path, pdb).map_err(|e| ImageError::io(&pdb_path, e))?;
        Ok(())
    }
}

impl Index<TypeDefId> for AssemblyImage {
    type Output = TypeDef;

    fn index(&self, id: TypeDefId) -> &TypeDef {
        &self.types[id.index()]
    }
}

#[cfg(test)]
#[path = "../tests/image_tests.rs"]
mod tests;
