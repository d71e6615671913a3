//! Validated OpenAPI document wrapper.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value};

use crate::error::LoadError;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// A parsed, validated OpenAPI 3.0 document.
///
/// Read-only input for resolution — the engine never mutates the tree, it
/// produces new resolved nodes. Each instance carries a session-unique id
/// used to scope cache keys, so the same reference string in two documents
/// never collides.
#[derive(Debug)]
pub struct Document {
    id: u64,
    source: Option<PathBuf>,
    root: Value,
}

impl Document {
    pub(crate) fn new(root: Value, source: Option<PathBuf>) -> Result<Document, LoadError> {
        validate(&root)?;
        Ok(Document {
            id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
            source,
            root,
        })
    }

    /// Build a document from an already-parsed value tree.
    ///
    /// # Errors
    ///
    /// Fails when the tree is not a valid OpenAPI 3.0 document (see
    /// [`validate`] rules: version, `info.title`, `info.version`, `paths`).
    pub fn from_value(root: Value) -> Result<Document, LoadError> {
        Document::new(root, None)
    }

    /// Parse a JSON string into a validated document.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidJson`] on syntax errors, then validation
    /// errors as in [`Document::from_value`].
    pub fn from_json_str(content: &str) -> Result<Document, LoadError> {
        let root = serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?;
        Document::new(root, None)
    }

    /// Parse a YAML string into a validated document.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidYaml`] on syntax errors, then validation
    /// errors as in [`Document::from_value`].
    pub fn from_yaml_str(content: &str) -> Result<Document, LoadError> {
        let root: Value =
            serde_yaml::from_str(content).map_err(|source| LoadError::InvalidYaml { source })?;
        Document::new(root, None)
    }

    /// Session-unique identity, part of every document-scoped cache key.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Directory the document was loaded from, for resolving relative
    /// external references. `None` for in-memory documents.
    pub fn base_dir(&self) -> Option<&Path> {
        self.source.as_deref().and_then(Path::parent)
    }

    /// The declared `openapi` version string.
    pub fn openapi(&self) -> &str {
        self.root
            .get("openapi")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// `info.title`.
    pub fn title(&self) -> &str {
        self.info_field("title")
    }

    /// `info.version`.
    pub fn version(&self) -> &str {
        self.info_field("version")
    }

    fn info_field(&self, key: &str) -> &str {
        self.root
            .get("info")
            .and_then(|info| info.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// The `components.schemas` registry, in declaration order.
    pub fn schemas(&self) -> Option<&Map<String, Value>> {
        self.root
            .get("components")
            .and_then(|components| components.get("schemas"))
            .and_then(Value::as_object)
    }

    /// Look up one declared schema by name.
    pub fn schema(&self, name: &str) -> Option<&Value> {
        self.schemas().and_then(|schemas| schemas.get(name))
    }

    /// The `paths` object.
    pub fn paths(&self) -> Option<&Map<String, Value>> {
        self.root.get("paths").and_then(Value::as_object)
    }

    /// The full document tree.
    pub fn root(&self) -> &Value {
        &self.root
    }
}

/// Top-level structural validation, run before any resolution.
///
/// The document must be an object declaring an `openapi` version with
/// major.minor exactly `3.0`, a non-empty `info.title` and `info.version`,
/// and a `paths` field (which may be an empty object).
fn validate(root: &Value) -> Result<(), LoadError> {
    let obj = root.as_object().ok_or(LoadError::NotAnObject)?;

    let version = obj
        .get("openapi")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("openapi"))?;
    if !version_supported(version) {
        return Err(LoadError::UnsupportedVersion {
            version: version.to_string(),
        });
    }

    let info = obj
        .get("info")
        .and_then(Value::as_object)
        .ok_or_else(|| missing("info"))?;
    for field in ["title", "version"] {
        let present = info
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|value| !value.is_empty());
        if !present {
            return Err(missing(&format!("info.{field}")));
        }
    }

    if !obj.contains_key("paths") {
        return Err(missing("paths"));
    }

    Ok(())
}

fn missing(path: &str) -> LoadError {
    LoadError::MissingField {
        path: path.to_string(),
    }
}

/// Exactly major 3, minor 0; any patch level.
fn version_supported(version: &str) -> bool {
    let mut parts = version.split('.');
    parts.next() == Some("3") && parts.next() == Some("0")
}
