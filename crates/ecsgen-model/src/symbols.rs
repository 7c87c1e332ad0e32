//! Debug symbols.
//!
//! The symbol stream travels next to an image and maps each type's full name
//! to the place it was declared. Symbols are regenerated on every write, so
//! types synthesized during a pass show up with a hidden (sourceless) entry.

use serde::{Deserialize, Serialize};

/// Declaration site of a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub document: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(document: impl Into<String>, line: u32) -> Self {
        Self {
            document: document.into(),
            line,
        }
    }
}

/// One symbol table row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolEntry {
    pub type_name: String,
    /// `None` marks a hidden entry (compiler- or generator-produced type).
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

/// Symbol table of one assembly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSymbols {
    pub assembly: String,
    #[serde(default)]
    pub entries: Vec<SymbolEntry>,
}

impl DebugSymbols {
    pub fn location_of(&self, type_name: &str) -> Option<&SourceLocation> {
        self.entries
            .iter()
            .find(|e| e.type_name == type_name)
            .and_then(|e| e.location.as_ref())
    }

    /// Number of entries without a source location.
    pub fn hidden_count(&self) -> usize {
        self.entries.iter().filter(|e| e.location.is_none()).count()
    }
}
