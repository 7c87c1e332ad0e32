//! Type nodes.
//!
//! A `TypeDef` is one class, struct or interface declaration inside an
//! [`crate::AssemblyImage`]. Nodes live in the image's arena and refer to
//! each other by [`TypeDefId`]: a nested node records its declaring node's id
//! and the parent lists its nested ids, so ownership stays with the arena and
//! no node holds a pointer back into it.

use crate::members::{CustomAttribute, FieldDef, MethodDef};
use crate::symbols::SourceLocation;
use crate::type_ref::TypeRef;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// =============================================================================
// TypeDefId - Arena Handle
// =============================================================================

/// Index of a type node inside its image's arena.
///
/// Ids are only meaningful for the image that allocated them and stay valid
/// for the image's lifetime: nodes are added, never removed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeDefId(pub u32);

impl TypeDefId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

// =============================================================================
// TypeKind / TypeAttributes
// =============================================================================

/// Kind of declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
}

bitflags! {
    /// Visibility and layout flags of a type node.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TypeAttributes: u32 {
        const PUBLIC = 0x0000_0001;
        const NESTED_PUBLIC = 0x0000_0002;
        const ABSTRACT = 0x0000_0080;
        const SEALED = 0x0000_0100;
        const SERIALIZABLE = 0x0000_2000;
    }
}

// =============================================================================
// TypeDef
// =============================================================================

/// A class, struct or interface declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    /// Namespace; empty for nested types.
    #[serde(default)]
    pub namespace: String,

    /// Simple name (generic definitions keep their arity suffix, e.g. `Baker`1`).
    pub name: String,

    pub kind: TypeKind,

    pub attributes: TypeAttributes,

    /// Base type; `None` for interfaces and the root object type.
    #[serde(default)]
    pub base: Option<TypeRef>,

    /// Implemented interfaces in declaration order.
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,

    /// Generic parameter names in declaration order.
    #[serde(default)]
    pub generic_params: Vec<String>,

    /// Declaring type when nested.
    #[serde(default)]
    pub declaring: Option<TypeDefId>,

    /// Nested types in declaration order.
    #[serde(default)]
    pub nested: Vec<TypeDefId>,

    #[serde(default)]
    pub fields: Vec<FieldDef>,

    #[serde(default)]
    pub methods: Vec<MethodDef>,

    #[serde(default)]
    pub custom_attributes: Vec<CustomAttribute>,

    /// Declaration site, carried by debug symbols rather than the image.
    #[serde(skip)]
    pub source: Option<SourceLocation>,
}

impl TypeDef {
    fn new(kind: TypeKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind,
            attributes: TypeAttributes::PUBLIC,
            base: None,
            interfaces: Vec::new(),
            generic_params: Vec::new(),
            declaring: None,
            nested: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            custom_attributes: Vec::new(),
            source: None,
        }
    }

    /// Create a new public class declaration.
    pub fn class(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(TypeKind::Class, namespace, name)
    }

    /// Create a new public struct declaration.
    pub fn structure(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(TypeKind::Struct, namespace, name)
    }

    /// Create a new public interface declaration.
    pub fn interface(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let mut def = Self::new(TypeKind::Interface, namespace, name);
        def.attributes |= TypeAttributes::ABSTRACT;
        def
    }

    /// Set the base type.
    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    /// Set implemented interfaces.
    pub fn with_interfaces(mut self, interfaces: Vec<TypeRef>) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Set generic parameter names.
    pub fn with_generic_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generic_params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the attribute flags.
    pub const fn with_attributes(mut self, attributes: TypeAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_custom_attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }

    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = Some(source);
        self
    }

    pub const fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface)
    }

    pub fn is_generic_definition(&self) -> bool {
        !self.generic_params.is_empty()
    }

    pub const fn is_nested(&self) -> bool {
        self.declaring.is_some()
    }

    /// Instance constructors in declaration order.
    pub fn constructors(&self) -> impl Iterator<Item = &MethodDef> {
        self.methods.iter().filter(|m| m.is_constructor())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}
