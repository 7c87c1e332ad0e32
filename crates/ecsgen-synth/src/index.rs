//! Assembly index.
//!
//! A snapshot of a target image keyed by unique type identity
//! (`Full.Name/Assembly`). It is derived state: [`AssemblyIndex::build`]
//! rebuilds it from an image at any time, and synthesis passes keep a live
//! copy current with [`AssemblyIndex::add_type`]. Two snapshots taken around
//! a pass diff into the identities the pass added and removed.

use ecsgen_model::{AssemblyImage, TypeContext, TypeDefId, TypeRef, TypeRelations};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use tracing::trace;

/// Identity -> node snapshot of one image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssemblyIndex {
    types: IndexMap<String, TypeDefId>,
}

/// Identities added and removed between two snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeDiff {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
}

impl TypeDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl AssemblyIndex {
    /// Index every top-level and nested node of `image`, depth-first in
    /// declaration order.
    pub fn build(image: &AssemblyImage) -> Self {
        let mut index = Self::default();
        for id in image.type_ids() {
            index.add_type(image, id);
        }
        index
    }

    /// Register `id`. An identity already present keeps its first node and
    /// the call is a no-op; returns whether the node was inserted.
    pub fn add_type(&mut self, image: &AssemblyImage, id: TypeDefId) -> bool {
        let identity = image.unique_name(id);
        if self.types.contains_key(&identity) {
            trace!(%identity, "AssemblyIndex::add_type already indexed");
            return false;
        }
        self.types.insert(identity, id);
        true
    }

    pub fn lookup(&self, identity: &str) -> Option<TypeDefId> {
        self.types.get(identity).copied()
    }

    /// Node behind a reference, by the reference's unique name.
    pub fn lookup_ref(&self, ty: &TypeRef) -> Option<TypeDefId> {
        self.lookup(&ty.unique_name())
    }

    /// First node, in index order, whose identity starts with `hint`.
    pub fn lookup_by_prefix(&self, hint: &str) -> Option<TypeDefId> {
        self.types
            .iter()
            .find(|(identity, _)| identity.starts_with(hint))
            .map(|(_, &id)| id)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.types.contains_key(identity)
    }

    /// Indexed identities in insertion order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Indexed nodes in insertion order.
    pub fn types(&self) -> impl Iterator<Item = TypeDefId> + '_ {
        self.types.values().copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Every generic instantiation found in the base chain of every indexed
    /// node, in index order. Nodes are read from the context's target image.
    pub fn generic_base_references(&self, ctx: &TypeContext) -> Vec<TypeRef> {
        let relations = TypeRelations::new(ctx);
        let target = ctx.target();
        self.types()
            .flat_map(|id| relations.base_chain(&target.reference_to(id)))
            .filter(TypeRef::is_generic_instance)
            .collect()
    }

    /// Set difference of identity keys.
    pub fn diff(before: &Self, after: &Self) -> TypeDiff {
        TypeDiff {
            added: after
                .type_names()
                .filter(|name| !before.contains(name))
                .map(String::from)
                .collect(),
            removed: before
                .type_names()
                .filter(|name| !after.contains(name))
                .map(String::from)
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/index_tests.rs"]
mod tests;
