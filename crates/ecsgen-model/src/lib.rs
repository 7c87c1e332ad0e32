//! Assembly Image Model
//!
//! An editor-independent object model of compiled assemblies, used to reason
//! about code outside any live reflection context:
//!
//! - **Images**: arena-backed metadata graphs ([`AssemblyImage`], [`TypeDef`])
//!   with read/write of the image and debug-symbol streams
//! - **References**: unresolved type pointers ([`TypeRef`]) and their
//!   resolution through a [`TypeContext`] built by an [`AssemblyResolver`]
//! - **Relations**: base chains and structural assignability
//!   ([`TypeRelations`])
mod context;
mod error;
pub mod image;
pub mod members;
pub mod relations;
pub mod resolver;
pub mod symbols;
mod type_def;
mod type_ref;

pub use context::{ResolvedType, TypeContext};
pub use error::ImageError;
pub use image::{AssemblyImage, IMAGE_FORMAT, IMAGE_FORMAT_VERSION, ImageBytes};
pub use members::{
    AttributeArgument, AttributeValue, CustomAttribute, FieldAttributes, FieldDef, Instruction,
    MethodAttributes, MethodDef, MethodRef, ParamDef,
};
pub use relations::{BaseChain, TypeRelations, base_chain, definition_name, is_assignable};
pub use resolver::{AssemblyCache, AssemblyResolver};
pub use symbols::{DebugSymbols, SourceLocation, SymbolEntry};
pub use type_def::{TypeAttributes, TypeDef, TypeDefId, TypeKind};
pub use type_ref::TypeRef;
