//! Loading OpenAPI documents and raw schema files from disk.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::document::Document;
use crate::error::LoadError;

/// Load and validate an OpenAPI document from a JSON or YAML file.
///
/// The format is chosen by extension: `.json`, `.yaml`, or `.yml`.
///
/// # Errors
///
/// Returns [`LoadError::FileNotFound`] if the path does not exist,
/// [`LoadError::UnsupportedFormat`] for any other extension,
/// [`LoadError::ReadError`] on I/O failure, [`LoadError::InvalidJson`] /
/// [`LoadError::InvalidYaml`] on syntax errors, and the document validation
/// errors described on [`Document::from_value`].
pub fn load_document(path: &Path) -> Result<Document, LoadError> {
    let root = load_value(path)?;
    let document = Document::new(root, Some(path.to_path_buf()))?;
    debug!(
        path = %path.display(),
        title = document.title(),
        "loaded OpenAPI document"
    );
    Ok(document)
}

/// Load a JSON or YAML file into a raw value tree, without spec validation.
///
/// External reference targets come through here: they are schema containers,
/// not necessarily complete OpenAPI documents.
///
/// # Errors
///
/// Same loading errors as [`load_document`], without the validation step.
pub fn load_value(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let format = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !matches!(format.as_str(), "json" | "yaml" | "yml") {
        return Err(LoadError::UnsupportedFormat {
            format: format!(".{format}"),
        });
    }

    let content = fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    match format.as_str() {
        "json" => serde_json::from_str(&content).map_err(|source| LoadError::InvalidJson { source }),
        _ => serde_yaml::from_str(&content).map_err(|source| LoadError::InvalidYaml { source }),
    }
}
