//! Fetching externally referenced schemas from files and URLs.
//!
//! A fetched schema comes back self-contained: references local to the
//! external document are inlined against that document, and nested external
//! hops are followed up to a configured depth. Cross-file cycles are tracked
//! with location-scoped visit keys, canonicalized for file paths so the same
//! file reached through different relative spellings is recognized.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::ResolveError;
use crate::loader;
use crate::reference::{is_url, ParsedReference};

/// Default timeout for HTTP requests (10 seconds).
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on nested reference hops inside external documents.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// External resolution settings.
#[derive(Debug, Clone)]
pub struct ExternalConfig {
    /// Permit fetching URL references over HTTP.
    pub enable_remote: bool,
    /// Bound on nested reference hops inside external documents.
    pub max_depth: usize,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Remember failed fetch locations and fail fast on repeats.
    pub negative_cache: bool,
}

impl Default for ExternalConfig {
    fn default() -> Self {
        ExternalConfig {
            enable_remote: true,
            max_depth: DEFAULT_MAX_DEPTH,
            timeout: HTTP_TIMEOUT,
            negative_cache: false,
        }
    }
}

/// Where a location string points, relative to the referencing document.
enum Target {
    Url(String),
    File(PathBuf),
}

impl Target {
    fn locate(base_dir: Option<&Path>, location: &str) -> Target {
        if is_url(location) {
            Target::Url(location.to_string())
        } else {
            let path = match base_dir {
                Some(dir) => dir.join(location),
                None => PathBuf::from(location),
            };
            Target::File(path)
        }
    }

    /// Stable identity for visit keys and fetch memoization.
    fn label(&self) -> String {
        match self {
            Target::Url(url) => url.clone(),
            Target::File(path) => fs::canonicalize(path)
                .unwrap_or_else(|_| path.clone())
                .display()
                .to_string(),
        }
    }

    /// Base directory for references nested inside this target.
    fn parent_dir(&self) -> Option<PathBuf> {
        match self {
            Target::Url(_) => None,
            Target::File(path) => path.parent().map(Path::to_path_buf),
        }
    }
}

/// Fetches and inlines externally referenced schemas.
#[derive(Debug, Default)]
pub struct ExternalResolver {
    config: ExternalConfig,
    fetched: HashMap<String, Value>,
    failed: HashMap<String, String>,
}

impl ExternalResolver {
    pub fn new(config: ExternalConfig) -> ExternalResolver {
        ExternalResolver {
            config,
            fetched: HashMap::new(),
            failed: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ExternalConfig {
        &self.config
    }

    pub fn configure(&mut self, config: ExternalConfig) {
        self.config = config;
    }

    /// Drop memoized documents and recorded failures.
    pub fn clear(&mut self) {
        self.fetched.clear();
        self.failed.clear();
    }

    /// Fetch `<location>#/components/schemas/<name>` and return it with all
    /// nested references inlined.
    ///
    /// `base_dir` anchors relative file locations (the referencing document's
    /// directory).
    ///
    /// # Errors
    ///
    /// Fails on fetch problems (missing file, network error, remote
    /// disabled), a missing schema entry, a nested hop past the configured
    /// `max_depth`, or a cross-file reference cycle.
    pub fn resolve_external(
        &mut self,
        base_dir: Option<&Path>,
        location: &str,
        name: &str,
    ) -> Result<Value, ResolveError> {
        debug!(location, name, "resolving external reference");
        let mut visited = HashSet::new();
        self.resolve_at(base_dir, location, name, &mut visited, 0)
    }

    fn resolve_at(
        &mut self,
        base_dir: Option<&Path>,
        location: &str,
        name: &str,
        visited: &mut HashSet<String>,
        depth: usize,
    ) -> Result<Value, ResolveError> {
        let target = Target::locate(base_dir, location);
        let label = target.label();
        let root = self.fetch_document(&target, &label)?;
        let child_base = target.parent_dir();
        self.resolve_in_document(&root, child_base.as_deref(), &label, name, visited, depth)
    }

    /// Resolve one named schema inside an already-fetched document, inlining
    /// what it references.
    fn resolve_in_document(
        &mut self,
        root: &Value,
        base_dir: Option<&Path>,
        label: &str,
        name: &str,
        visited: &mut HashSet<String>,
        depth: usize,
    ) -> Result<Value, ResolveError> {
        let reference = format!("{label}#/components/schemas/{name}");
        let visit_key = format!("{label}#{name}");
        if visited.contains(&visit_key) {
            return Err(ResolveError::CircularReference { reference });
        }
        visited.insert(visit_key.clone());

        let node = lookup_schema(root, name)
            .ok_or(ResolveError::ReferenceNotFound { reference })?;
        let mut node = node.clone();
        self.inline_value(&mut node, root, base_dir, label, visited, depth)?;

        visited.remove(&visit_key);
        Ok(node)
    }

    /// Walk a value tree, replacing `$ref` nodes with their resolved content.
    fn inline_value(
        &mut self,
        node: &mut Value,
        root: &Value,
        base_dir: Option<&Path>,
        label: &str,
        visited: &mut HashSet<String>,
        depth: usize,
    ) -> Result<(), ResolveError> {
        match node {
            Value::Object(obj) => {
                let pointer = obj.get("$ref").and_then(Value::as_str).map(str::to_string);
                if let Some(pointer) = pointer {
                    if depth >= self.config.max_depth {
                        return Err(ResolveError::DepthExceeded {
                            reference: pointer,
                            max_depth: self.config.max_depth,
                        });
                    }
                    *node = match ParsedReference::parse(&pointer)? {
                        ParsedReference::Local { name } => self.resolve_in_document(
                            root,
                            base_dir,
                            label,
                            &name,
                            visited,
                            depth + 1,
                        )?,
                        ParsedReference::External { location, name } => {
                            self.resolve_at(base_dir, &location, &name, visited, depth + 1)?
                        }
                    };
                    return Ok(());
                }
                for (_, child) in obj.iter_mut() {
                    self.inline_value(child, root, base_dir, label, visited, depth)?;
                }
            }
            Value::Array(items) => {
                for child in items {
                    self.inline_value(child, root, base_dir, label, visited, depth)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Load a document, memoizing successes and (optionally) failures.
    fn fetch_document(&mut self, target: &Target, label: &str) -> Result<Value, ResolveError> {
        if let Some(document) = self.fetched.get(label) {
            return Ok(document.clone());
        }
        if let Some(message) = self.failed.get(label) {
            return Err(ResolveError::CachedFailure {
                location: label.to_string(),
                message: message.clone(),
            });
        }

        let result = match target {
            Target::Url(url) => self.fetch_url(url),
            Target::File(path) => loader::load_value(path).map_err(ResolveError::from),
        };

        match result {
            Ok(document) => {
                self.fetched.insert(label.to_string(), document.clone());
                Ok(document)
            }
            Err(error) => {
                if self.config.negative_cache {
                    self.failed.insert(label.to_string(), error.to_string());
                }
                Err(error)
            }
        }
    }

    #[cfg(feature = "remote")]
    fn fetch_url(&self, url: &str) -> Result<Value, ResolveError> {
        if !self.config.enable_remote {
            return Err(ResolveError::RemoteDisabled {
                url: url.to_string(),
            });
        }

        let network_error = |source| ResolveError::NetworkError {
            url: url.to_string(),
            source,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(network_error)?;

        let response = client.get(url).send().map_err(network_error)?;

        // Check for HTTP errors before parsing
        let response = response.error_for_status().map_err(network_error)?;
        response.json().map_err(network_error)
    }

    #[cfg(not(feature = "remote"))]
    fn fetch_url(&self, url: &str) -> Result<Value, ResolveError> {
        Err(ResolveError::RemoteDisabled {
            url: url.to_string(),
        })
    }
}

fn lookup_schema<'a>(root: &'a Value, name: &str) -> Option<&'a Value> {
    root.get("components")?.get("schemas")?.get(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn resolver() -> ExternalResolver {
        ExternalResolver::new(ExternalConfig::default())
    }

    #[test]
    fn resolves_schema_from_external_file() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "common.yaml",
            "components:\n  schemas:\n    Id:\n      type: integer\n      format: int64\n",
        );

        let node = resolver()
            .resolve_external(Some(dir.path()), "common.yaml", "Id")
            .unwrap();
        assert_eq!(node["type"], "integer");
        assert_eq!(node["format"], "int64");
    }

    #[test]
    fn inlines_local_refs_inside_external_document() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "common.yaml",
            concat!(
                "components:\n",
                "  schemas:\n",
                "    Address:\n",
                "      type: object\n",
                "      properties:\n",
                "        country:\n",
                "          $ref: '#/components/schemas/Country'\n",
                "    Country:\n",
                "      type: string\n",
            ),
        );

        let node = resolver()
            .resolve_external(Some(dir.path()), "common.yaml", "Address")
            .unwrap();
        assert_eq!(node["properties"]["country"]["type"], "string");
    }

    #[test]
    fn follows_nested_external_hops() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "a.yaml",
            concat!(
                "components:\n",
                "  schemas:\n",
                "    Outer:\n",
                "      type: object\n",
                "      properties:\n",
                "        inner:\n",
                "          $ref: 'b.yaml#/components/schemas/Inner'\n",
            ),
        );
        write_file(
            &dir,
            "b.yaml",
            "components:\n  schemas:\n    Inner:\n      type: boolean\n",
        );

        let node = resolver()
            .resolve_external(Some(dir.path()), "a.yaml", "Outer")
            .unwrap();
        assert_eq!(node["properties"]["inner"]["type"], "boolean");
    }

    #[test]
    fn missing_schema_entry_is_not_found() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "common.yaml", "components:\n  schemas: {}\n");

        let result = resolver().resolve_external(Some(dir.path()), "common.yaml", "Ghost");
        assert!(matches!(
            result,
            Err(ResolveError::ReferenceNotFound { .. })
        ));
    }

    #[test]
    fn missing_file_propagates_load_error() {
        let dir = TempDir::new().unwrap();
        let result = resolver().resolve_external(Some(dir.path()), "ghost.yaml", "Id");
        assert!(matches!(
            result,
            Err(ResolveError::Load(LoadError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn cross_file_cycle_is_detected() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "a.yaml",
            concat!(
                "components:\n",
                "  schemas:\n",
                "    A:\n",
                "      properties:\n",
                "        b:\n",
                "          $ref: 'b.yaml#/components/schemas/B'\n",
            ),
        );
        write_file(
            &dir,
            "b.yaml",
            concat!(
                "components:\n",
                "  schemas:\n",
                "    B:\n",
                "      properties:\n",
                "        a:\n",
                "          $ref: 'a.yaml#/components/schemas/A'\n",
            ),
        );

        let result = resolver().resolve_external(Some(dir.path()), "a.yaml", "A");
        assert!(matches!(
            result,
            Err(ResolveError::CircularReference { .. })
        ));
    }

    #[test]
    fn depth_bound_stops_long_chains() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "chain.yaml",
            concat!(
                "components:\n",
                "  schemas:\n",
                "    A:\n",
                "      properties:\n",
                "        next:\n",
                "          $ref: '#/components/schemas/B'\n",
                "    B:\n",
                "      properties:\n",
                "        next:\n",
                "          $ref: '#/components/schemas/C'\n",
                "    C:\n",
                "      type: string\n",
            ),
        );

        let mut resolver = ExternalResolver::new(ExternalConfig {
            max_depth: 1,
            ..ExternalConfig::default()
        });
        let result = resolver.resolve_external(Some(dir.path()), "chain.yaml", "A");
        assert!(matches!(
            result,
            Err(ResolveError::DepthExceeded { max_depth: 1, .. })
        ));
    }

    #[test]
    fn negative_cache_replays_failures() {
        let dir = TempDir::new().unwrap();
        let mut resolver = ExternalResolver::new(ExternalConfig {
            negative_cache: true,
            ..ExternalConfig::default()
        });

        let first = resolver.resolve_external(Some(dir.path()), "ghost.yaml", "Id");
        assert!(matches!(
            first,
            Err(ResolveError::Load(LoadError::FileNotFound { .. }))
        ));

        let second = resolver.resolve_external(Some(dir.path()), "ghost.yaml", "Id");
        assert!(matches!(second, Err(ResolveError::CachedFailure { .. })));
    }

    #[test]
    fn failures_are_not_remembered_by_default() {
        let dir = TempDir::new().unwrap();
        let mut resolver = resolver();

        let _ = resolver.resolve_external(Some(dir.path()), "ghost.yaml", "Id");
        write_file(
            &dir,
            "ghost.yaml",
            "components:\n  schemas:\n    Id:\n      type: integer\n",
        );

        let retry = resolver.resolve_external(Some(dir.path()), "ghost.yaml", "Id");
        assert!(retry.is_ok());
    }

    #[cfg(feature = "remote")]
    #[test]
    fn remote_disabled_rejects_urls() {
        let mut resolver = ExternalResolver::new(ExternalConfig {
            enable_remote: false,
            ..ExternalConfig::default()
        });

        let result =
            resolver.resolve_external(None, "https://example.invalid/api.json", "User");
        assert!(matches!(result, Err(ResolveError::RemoteDisabled { .. })));
    }

    #[cfg(feature = "remote")]
    #[test]
    fn fetches_schema_over_http() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/schemas/common.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"components": {"schemas": {"Money": {"type": "string", "format": "decimal"}}}}"#,
            )
            .create();

        let url = format!("{}/schemas/common.json", server.url());
        let node = resolver().resolve_external(None, &url, "Money").unwrap();

        mock.assert();
        assert_eq!(node["format"], "decimal");
    }

    #[cfg(feature = "remote")]
    #[test]
    fn http_error_status_is_a_network_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/schemas/missing.json")
            .with_status(404)
            .create();

        let url = format!("{}/schemas/missing.json", server.url());
        let result = resolver().resolve_external(None, &url, "Ghost");
        assert!(matches!(result, Err(ResolveError::NetworkError { .. })));
    }
}
