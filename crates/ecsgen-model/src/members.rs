//! Member declarations: fields, methods and custom attributes.

use crate::type_ref::TypeRef;
use bitflags::bitflags;
use ecsgen_common::names::CONSTRUCTOR_NAME;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Field visibility and storage flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FieldAttributes: u16 {
        const PRIVATE = 0x0001;
        const PUBLIC = 0x0006;
        const STATIC = 0x0010;
        const INIT_ONLY = 0x0020;
        const NOT_SERIALIZED = 0x0080;
    }
}

bitflags! {
    /// Method visibility and naming flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct MethodAttributes: u16 {
        const PRIVATE = 0x0001;
        const PUBLIC = 0x0006;
        const STATIC = 0x0010;
        const VIRTUAL = 0x0040;
        const HIDE_BY_SIG = 0x0080;
        const ABSTRACT = 0x0400;
        const SPECIAL_NAME = 0x0800;
        const RT_SPECIAL_NAME = 0x1000;
    }
}

/// A field declared on a type node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: String,
    pub attributes: FieldAttributes,
    pub field_type: TypeRef,
}

impl FieldDef {
    /// Public instance field.
    pub fn public(name: impl Into<String>, field_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            attributes: FieldAttributes::PUBLIC,
            field_type,
        }
    }

    pub fn is_public(&self) -> bool {
        self.attributes.contains(FieldAttributes::PUBLIC)
    }
}

/// A method parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDef {
    pub name: String,
    pub param_type: TypeRef,
}

impl ParamDef {
    pub fn new(name: impl Into<String>, param_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            param_type,
        }
    }
}

/// Reference to a method on a (possibly instantiated) declaring type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRef {
    pub declaring_type: TypeRef,
    pub name: String,
    pub parameters: Vec<TypeRef>,
    pub return_type: TypeRef,
}

/// The handful of instructions a synthesized body needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "operand", rename_all = "camelCase")]
pub enum Instruction {
    /// Push the receiver (`ldarg.0`).
    LoadThis,
    /// Call a method non-virtually.
    Call(MethodRef),
    /// Return from the method.
    Return,
}

/// A method declared on a type node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDef {
    pub name: String,
    pub attributes: MethodAttributes,
    #[serde(default)]
    pub parameters: Vec<ParamDef>,
    pub return_type: TypeRef,
    #[serde(default)]
    pub body: Vec<Instruction>,
}

impl MethodDef {
    /// Public instance constructor with the given parameters and no body.
    ///
    /// Used for constructors declared by referenced assemblies, whose bodies
    /// are never inspected.
    pub fn constructor(parameters: Vec<ParamDef>, void: TypeRef) -> Self {
        Self {
            name: CONSTRUCTOR_NAME.to_string(),
            attributes: Self::constructor_attributes(),
            parameters,
            return_type: void,
            body: Vec::new(),
        }
    }

    /// Parameterless constructor whose body calls `base_constructor` on the
    /// receiver and returns.
    pub fn default_constructor(base_constructor: MethodRef, void: TypeRef) -> Self {
        Self {
            name: CONSTRUCTOR_NAME.to_string(),
            attributes: Self::constructor_attributes(),
            parameters: Vec::new(),
            return_type: void,
            body: vec![
                Instruction::LoadThis,
                Instruction::Call(base_constructor),
                Instruction::Return,
            ],
        }
    }

    const fn constructor_attributes() -> MethodAttributes {
        MethodAttributes::PUBLIC
            .union(MethodAttributes::HIDE_BY_SIG)
            .union(MethodAttributes::SPECIAL_NAME)
            .union(MethodAttributes::RT_SPECIAL_NAME)
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME && !self.attributes.contains(MethodAttributes::STATIC)
    }

    /// Reference to this method as declared on `declaring_type`.
    pub fn reference(&self, declaring_type: TypeRef) -> MethodRef {
        MethodRef {
            declaring_type,
            name: self.name.clone(),
            parameters: self.parameters.iter().map(|p| p.param_type.clone()).collect(),
            return_type: self.return_type.clone(),
        }
    }
}

/// Value carried by a custom attribute argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum AttributeValue {
    Type(TypeRef),
    String(String),
    Int(i64),
    Bool(bool),
}

/// A constructor argument of a custom attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeArgument {
    pub arg_type: TypeRef,
    pub value: AttributeValue,
}

/// An attribute instance attached to a type node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAttribute {
    pub constructor: MethodRef,
    #[serde(default)]
    pub arguments: Vec<AttributeArgument>,
}

impl CustomAttribute {
    /// The attribute's type.
    pub fn attribute_type(&self) -> &TypeRef {
        &self.constructor.declaring_type
    }
}
