//! Error types for document loading, schema resolution, and code generation.

use std::path::PathBuf;
use thiserror::Error;

use crate::node::CompositionKind;

/// Errors while loading and validating an OpenAPI document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("Unsupported file format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Invalid JSON format: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid YAML format: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    // Validation errors (exit code 2)
    #[error("Invalid specification: not an object")]
    NotAnObject,

    #[error("Missing required field: {path}")]
    MissingField { path: String },

    #[error("Unsupported OpenAPI version: {version}. Only 3.0.x is supported.")]
    UnsupportedVersion { version: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}

/// The malformed shape a composition keyword was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureProblem {
    Null,
    NotAnArray,
    Empty,
}

fn structure_message(kind: CompositionKind, problem: StructureProblem) -> String {
    match (kind, problem) {
        (CompositionKind::AnyOf, StructureProblem::Empty) => {
            "anyOf schema must contain at least one variant".to_string()
        }
        (kind, StructureProblem::Empty) => format!("{kind} array cannot be empty"),
        (kind, StructureProblem::Null) => format!("{kind} cannot be null"),
        (kind, StructureProblem::NotAnArray) => format!("{kind} must be an array"),
    }
}

/// Errors during reference and composition resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[cfg(feature = "remote")]
    #[error("Failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Remote references are disabled: {url}")]
    RemoteDisabled { url: String },

    #[error("Fetch previously failed for {location}: {message}")]
    CachedFailure { location: String, message: String },

    #[error("Malformed reference: {reference}")]
    MalformedReference { reference: String },

    #[error("Reference not found: {reference}")]
    ReferenceNotFound { reference: String },

    #[error("Circular reference detected: {reference}")]
    CircularReference { reference: String },

    #[error("Maximum reference depth ({max_depth}) exceeded at {reference}")]
    DepthExceeded { reference: String, max_depth: usize },

    #[error("External resolution failed for {reference}: {source}")]
    ExternalResolutionFailed {
        reference: String,
        #[source]
        source: Box<ResolveError>,
    },

    #[error("{}", structure_message(*kind, *problem))]
    CompositionStructure {
        kind: CompositionKind,
        problem: StructureProblem,
    },

    #[error("Property '{property}' has conflicting types in allOf schemas")]
    ConflictingTypes { property: String },

    #[error("oneOf schema without discriminator property")]
    MissingDiscriminator,
}

impl ResolveError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ResolveError::Load(e) => e.exit_code(),
            #[cfg(feature = "remote")]
            ResolveError::NetworkError { .. } => 3,
            ResolveError::ExternalResolutionFailed { source, .. } => source.exit_code(),
            _ => 2,
        }
    }
}

/// Errors during Kotlin code generation.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Cannot write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GenerateError::Load(e) => e.exit_code(),
            GenerateError::Resolve(e) => e.exit_code(),
            GenerateError::WriteError { .. } => 3,
        }
    }
}
