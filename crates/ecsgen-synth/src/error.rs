//! Errors raised by the synthesis passes and the post-process pipeline.

use ecsgen_model::ImageError;
use std::fmt;

/// A synthesis pass could not build what it was asked to build.
///
/// Every variant is fatal: it means the host contracts the generator was
/// configured with do not match the assemblies it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// A template or attribute type does not resolve against the target
    /// image and its references.
    UnresolvedType { ty: String, role: &'static str },
    /// A companion template declares no parameterless constructor to chain to.
    MissingConstructor { ty: String },
    /// No constructor of an attribute type accepts the given arguments.
    NoMatchingConstructor {
        attribute: String,
        arguments: Vec<String>,
    },
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedType { ty, role } => {
                write!(f, "cannot resolve {role} '{ty}'")
            }
            Self::MissingConstructor { ty } => {
                write!(f, "template '{ty}' has no parameterless constructor")
            }
            Self::NoMatchingConstructor {
                attribute,
                arguments,
            } => write!(
                f,
                "could not find a suitable constructor for attribute '{attribute}' with parameters ({})",
                arguments.join(", ")
            ),
        }
    }
}

impl std::error::Error for SynthesisError {}

/// A post-process pass failed; no output was produced.
#[derive(Debug)]
pub enum PostProcessError {
    Image(ImageError),
    Synthesis(SynthesisError),
}

impl fmt::Display for PostProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image(err) => write!(f, "{err}"),
            Self::Synthesis(err) => write!(f, "synthesis failed: {err}"),
        }
    }
}

impl std::error::Error for PostProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(err) => Some(err),
            Self::Synthesis(err) => Some(err),
        }
    }
}

impl From<ImageError> for PostProcessError {
    fn from(err: ImageError) -> Self {
        Self::Image(err)
    }
}

impl From<SynthesisError> for PostProcessError {
    fn from(err: SynthesisError) -> Self {
        Self::Synthesis(err)
    }
}
