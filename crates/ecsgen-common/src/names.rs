//! Metadata naming conventions.

/// Name every instance constructor carries in metadata.
pub const CONSTRUCTOR_NAME: &str = ".ctor";

/// Separator between a declaring type and a nested type in a full name
/// (`Outer/Inner`).
pub const NESTED_SEPARATOR: char = '/';

/// Separator between a full type name and its owning assembly in a unique
/// identity (`Ns.Type/Assembly`).
pub const IDENTITY_SEPARATOR: char = '/';

/// Full name of the runtime type-descriptor type. Attribute constructor
/// parameters of this type accept any type argument.
pub const TYPE_DESCRIPTOR: &str = "System.Type";

/// Full name of the root object type.
pub const OBJECT_TYPE: &str = "System.Object";

/// Full name of the void type used as constructor return type.
pub const VOID_TYPE: &str = "System.Void";

/// File extension of on-disk assembly images.
pub const IMAGE_EXTENSION: &str = "dll";

/// File extension of debug-symbol companions.
pub const SYMBOLS_EXTENSION: &str = "pdb";

/// Build a full type name from a namespace and a simple name.
///
/// An empty namespace yields the bare name.
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

/// Build the full name of a type nested inside `declaring_full_name`.
pub fn nest(declaring_full_name: &str, name: &str) -> String {
    format!("{declaring_full_name}{NESTED_SEPARATOR}{name}")
}

/// Case-insensitive substring test used by assembly filters.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}
