//! Assembly identities.
//!
//! An assembly is identified by its simple name plus a four-part version.
//! Type references are scoped by the simple name only; the full display form
//! (`Name, Version=1.0.0.0`) keys the reference cache so that two versions of
//! the same assembly never alias each other.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name and version of an assembly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssemblyIdentity {
    /// Simple name, e.g. `Game.Components`.
    pub name: String,
    /// Four-part version.
    #[serde(default)]
    pub version: [u16; 4],
}

impl AssemblyIdentity {
    /// Identity with version `0.0.0.0`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: [0; 4],
        }
    }

    /// Set the version.
    pub const fn with_version(mut self, version: [u16; 4]) -> Self {
        self.version = version;
        self
    }

    /// Display form used as the reference cache key.
    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.version;
        write!(f, "{}, Version={a}.{b}.{c}.{d}", self.name)
    }
}

/// Error returned when an assembly display name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityParseError {
    pub input: String,
    pub reason: &'static str,
}

impl fmt::Display for IdentityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid assembly identity '{}': {}",
            self.input, self.reason
        )
    }
}

impl std::error::Error for IdentityParseError {}

impl FromStr for AssemblyIdentity {
    type Err = IdentityParseError;

    /// Parse `Name` or `Name, Version=a.b.c.d`. Other comma-separated
    /// properties (culture, public key token) are accepted and ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = |reason| IdentityParseError {
            input: s.to_string(),
            reason,
        };

        let mut parts = s.split(',').map(str::trim);
        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(error("missing assembly name"));
        }

        let mut identity = Self::new(name);
        for part in parts {
            let Some(version) = part.strip_prefix("Version=") else {
                continue;
            };
            let mut numbers = [0u16; 4];
            let mut count = 0;
            for (slot, piece) in numbers.iter_mut().zip(version.split('.')) {
                *slot = piece.parse().map_err(|_| error("non-numeric version"))?;
                count += 1;
            }
            if count == 0 || version.split('.').count() > 4 {
                return Err(error("version must have one to four parts"));
            }
            identity.version = numbers;
        }
        Ok(identity)
    }
}

#[cfg(test)]
#[path = "../tests/identity_tests.rs"]
mod tests;
