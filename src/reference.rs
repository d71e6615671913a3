//! Reference pointer grammar: parsing, classification, and name extraction.

use serde_json::Value;

use crate::error::ResolveError;

/// Container path that every schema reference fragment must name.
const SCHEMA_CONTAINER: &str = "/components/schemas/";

/// URL schemes recognized when classifying an external location.
const URL_SCHEMES: &[&str] = &["http://", "https://", "ftp://"];

/// A `$ref` pointer split into its recognized forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReference {
    /// `#/components/schemas/<Name>` within the current document.
    Local { name: String },
    /// `<location>#/components/schemas/<Name>`, location is a file path or URL.
    External { location: String, name: String },
}

impl ParsedReference {
    /// Parse a reference string, rejecting anything outside the recognized
    /// grammar before any lookup happens.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MalformedReference`] when the string is empty,
    /// has no fragment, names a container other than `#/components/schemas/`,
    /// or has an empty or multi-segment schema name.
    pub fn parse(reference: &str) -> Result<ParsedReference, ResolveError> {
        let malformed = || ResolveError::MalformedReference {
            reference: reference.to_string(),
        };

        if reference.is_empty() {
            return Err(malformed());
        }

        let (location, fragment) = match reference.split_once('#') {
            Some((location, fragment)) => (location, fragment),
            None => return Err(malformed()),
        };

        let name = match fragment.strip_prefix(SCHEMA_CONTAINER) {
            Some(name) => name,
            None => return Err(malformed()),
        };
        if name.is_empty() || name.contains('/') {
            return Err(malformed());
        }

        // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
        let name = name.replace("~1", "/").replace("~0", "~");

        if location.is_empty() {
            Ok(ParsedReference::Local { name })
        } else {
            Ok(ParsedReference::External {
                location: location.to_string(),
                name,
            })
        }
    }
}

/// Check if a location looks like a URL (starts with a recognized scheme).
pub fn is_url(s: &str) -> bool {
    URL_SCHEMES.iter().any(|scheme| s.starts_with(scheme))
}

/// True iff the node carries a `$ref` key.
pub fn is_reference(node: &Value) -> bool {
    node.get("$ref").is_some()
}

/// Last path segment of a reference, after the final `/`.
pub fn extract_schema_name(reference: &str) -> &str {
    match reference.rsplit_once('/') {
        Some((_, name)) => name,
        None => reference,
    }
}
