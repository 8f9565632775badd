// src/error.rs

//! Error types for recipe loading and cooking

use crate::recipe::{LanguageStandard, Phase};
use thiserror::Error;

/// Errors that can occur while loading or cooking a recipe
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or unsatisfiable version constraint
    #[error("Invalid version constraint '{constraint}' for {package}: {reason}")]
    ConstraintError {
        package: String,
        constraint: String,
        reason: String,
    },

    /// Selected compiler cannot satisfy the recipe's minimum C++ standard
    #[error(
        "{phase} failed: recipe requires C++{required} but the selected compiler provides C++{detected}"
    )]
    StandardTooOld {
        phase: Phase,
        required: LanguageStandard,
        detected: LanguageStandard,
    },

    /// A toolchain/dependency descriptor generator failed
    #[error("Generator {generator} failed: {reason}")]
    GeneratorFailure { generator: String, reason: String },

    /// Native build system configure step failed
    #[error("{phase} failed during configure: {message}")]
    ConfigureFailure { phase: Phase, message: String },

    /// Native build system compile step failed
    #[error("{phase} failed during compile: {message}")]
    CompileFailure { phase: Phase, message: String },

    /// Hook invoked out of order or more than once
    #[error("Hook {phase} rejected: {reason}")]
    PhaseOrder { phase: Phase, reason: String },

    /// Layout could not be resolved
    #[error("Layout error: {0}")]
    LayoutError(String),

    /// Profile lacks a value for a settings axis the recipe varies over
    #[error("Profile does not define setting '{0}'")]
    MissingSetting(String),

    /// Recipe violates a structural invariant
    #[error("Invalid recipe: {0}")]
    InvalidRecipe(String),

    /// Profile is inconsistent or unusable
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// TOML or descriptor parse error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// I/O error with context
    #[error("I/O error: {0}")]
    IoError(String),

    /// Required file or tool not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Raw I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for recipe operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The hook this error was raised in, when known
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Error::StandardTooOld { phase, .. }
            | Error::ConfigureFailure { phase, .. }
            | Error::CompileFailure { phase, .. }
            | Error::PhaseOrder { phase, .. } => Some(*phase),
            Error::GeneratorFailure { .. } => Some(Phase::GenerateToolchain),
            Error::LayoutError(_) => Some(Phase::ResolveLayout),
            _ => None,
        }
    }
}
