//! Type references.
//!
//! A `TypeRef` is a possibly-unresolved pointer to a type node. It never
//! borrows from an image: named references carry the simple name of the
//! assembly that declares the type (`scope`) plus the type's full name, and
//! are resolved on demand through a [`crate::TypeContext`].
//!
//! | Variant | Example | Resolves to |
//! |---------|---------|-------------|
//! | `Named` | `Game.Health` in `Game` | the declared node |
//! | `Generic` | `GenericBaker<Game.Health>` | the element's node |
//! | `Array` | `Game.Segment[]` | nothing (arrays have no node) |
//! | `GenericParam` | `T` (position 0) | nothing |

use ecsgen_common::names::IDENTITY_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A possibly-unresolved pointer to a type node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeRef {
    /// A concrete declared type.
    Named { scope: String, full_name: String },

    /// A generic type bound to a fixed, ordered list of arguments.
    Generic {
        element: Box<TypeRef>,
        arguments: Vec<TypeRef>,
    },

    /// A single-dimension array of `element`.
    Array { element: Box<TypeRef> },

    /// A generic parameter of the enclosing generic definition.
    GenericParam { position: u16, name: String },
}

impl TypeRef {
    /// Reference to `full_name` declared in assembly `scope`.
    pub fn named(scope: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self::Named {
            scope: scope.into(),
            full_name: full_name.into(),
        }
    }

    /// Instantiate `element` with `arguments`.
    pub fn generic(element: TypeRef, arguments: Vec<TypeRef>) -> Self {
        Self::Generic {
            element: Box::new(element),
            arguments,
        }
    }

    /// Array of `element`.
    pub fn array(element: TypeRef) -> Self {
        Self::Array {
            element: Box::new(element),
        }
    }

    /// Generic parameter at `position`.
    pub fn param(position: u16, name: impl Into<String>) -> Self {
        Self::GenericParam {
            position,
            name: name.into(),
        }
    }

    /// Whether this is a generic instantiation.
    pub const fn is_generic_instance(&self) -> bool {
        matches!(self, Self::Generic { .. })
    }

    /// Whether this is an array.
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array { .. })
    }

    /// The element type of an instantiation or array, otherwise `self`.
    pub fn element_type(&self) -> &TypeRef {
        match self {
            Self::Generic { element, .. } | Self::Array { element } => element,
            _ => self,
        }
    }

    /// Generic arguments, empty unless this is an instantiation.
    pub fn arguments(&self) -> &[TypeRef] {
        match self {
            Self::Generic { arguments, .. } => arguments,
            _ => &[],
        }
    }

    /// Full name of the underlying declared type, if any.
    pub fn full_name(&self) -> Option<&str> {
        match self {
            Self::Named { full_name, .. } => Some(full_name),
            Self::Generic { element, .. } => element.full_name(),
            Self::Array { .. } | Self::GenericParam { .. } => None,
        }
    }

    /// Assembly scope of the underlying declared type, if any.
    pub fn scope(&self) -> Option<&str> {
        match self {
            Self::Named { scope, .. } => Some(scope),
            Self::Generic { element, .. } => element.scope(),
            Self::Array { .. } | Self::GenericParam { .. } => None,
        }
    }

    /// Simple name: the last segment of the full name, past any namespace
    /// or declaring type.
    pub fn simple_name(&self) -> String {
        match self {
            Self::Named { full_name, .. } => full_name
                .rsplit(['.', '/'])
                .next()
                .unwrap_or(full_name)
                .to_string(),
            Self::Generic { element, .. } => element.simple_name(),
            Self::Array { element } => format!("{}[]", element.simple_name()),
            Self::GenericParam { name, .. } => name.clone(),
        }
    }

    /// Deterministic identity combining the full name and owning assembly.
    ///
    /// Instantiations include their arguments' identities so that
    /// `G<A>` and `G<B>` are distinct; the result is purely syntactic and
    /// therefore stable across re-resolution.
    pub fn unique_name(&self) -> String {
        match self {
            Self::Named { scope, full_name } => {
                format!("{full_name}{IDENTITY_SEPARATOR}{scope}")
            }
            Self::Generic { element, arguments } => {
                let args = arguments
                    .iter()
                    .map(|a| format!("[{}]", a.unique_name()))
                    .collect::<Vec<_>>()
                    .join(",");
                match element.as_ref() {
                    Self::Named { scope, full_name } => {
                        format!("{full_name}[{args}]{IDENTITY_SEPARATOR}{scope}")
                    }
                    other => format!("{}[{args}]", other.unique_name()),
                }
            }
            Self::Array { element } => format!("{}[]", element.unique_name()),
            Self::GenericParam { position, .. } => format!("!{position}"),
        }
    }

    /// Replace generic parameters with the matching entries of `arguments`.
    ///
    /// Parameters without a matching argument are kept as-is.
    pub fn substitute(&self, arguments: &[TypeRef]) -> TypeRef {
        if arguments.is_empty() {
            return self.clone();
        }
        match self {
            Self::GenericParam { position, .. } => arguments
                .get(usize::from(*position))
                .cloned()
                .unwrap_or_else(|| self.clone()),
            Self::Generic {
                element,
                arguments: own,
            } => Self::Generic {
                element: element.clone(),
                arguments: own.iter().map(|a| a.substitute(arguments)).collect(),
            },
            Self::Array { element } => Self::array(element.substitute(arguments)),
            Self::Named { .. } => self.clone(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { full_name, .. } => f.write_str(full_name),
            Self::Generic { element, arguments } => {
                write!(f, "{element}<")?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
            Self::Array { element } => write!(f, "{element}[]"),
            Self::GenericParam { name, .. } => f.write_str(name),
        }
    }
}
