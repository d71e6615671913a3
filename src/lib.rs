//! OpenAPI Schema Resolution and Kotlin Code Generation
//!
//! Resolves `$ref` pointers and composition keywords (`allOf`, `oneOf`,
//! `anyOf`) in OpenAPI 3.0 documents, with cycle detection, layered
//! caching, and optional external document fetching. On top of the
//! resolution engine sits a generator that turns resolved schemas into
//! Spring-flavored Kotlin sources.
//!
//! # Example
//!
//! ```
//! use oas_codegen::{Document, Resolver};
//! use serde_json::json;
//!
//! let document = Document::from_value(json!({
//!     "openapi": "3.0.0",
//!     "info": { "title": "Pet Store", "version": "1.0.0" },
//!     "paths": {},
//!     "components": {
//!         "schemas": {
//!             "Pet": {
//!                 "type": "object",
//!                 "properties": { "name": { "type": "string" } },
//!                 "required": ["name"]
//!             }
//!         }
//!     }
//! })).unwrap();
//!
//! let mut resolver = Resolver::new();
//! let pet = resolver
//!     .resolve_reference(&document, "#/components/schemas/Pet")
//!     .unwrap();
//! assert_eq!(pet.type_name(), Some("object"));
//! ```
//!
//! # Reference Forms
//!
//! | Form | Meaning |
//! |------|---------|
//! | `#/components/schemas/Name` | Entry in the local schema registry |
//! | `./common.yaml#/components/schemas/Name` | Schema in a sibling file |
//! | `https://host/api.json#/components/schemas/Name` | Remote document (needs the `remote` feature) |
//!
//! Only the `#/components/schemas/` container is addressable; pointers into
//! other document sections are rejected as malformed.

mod cache;
mod compose;
mod document;
mod error;
mod external;
mod generator;
mod loader;
mod metrics;
mod node;
mod reference;
mod resolver;
mod templates;

pub use cache::{CacheConfig, CacheStats, DEFAULT_MAX_CACHE_SIZE};
pub use compose::{any_of_object, merge_all_of, one_of_object};
pub use document::Document;
pub use error::{GenerateError, LoadError, ResolveError, StructureProblem};
pub use external::{ExternalConfig, ExternalResolver, DEFAULT_MAX_DEPTH};
pub use generator::{
    ClassKind, GenerationSummary, Generator, GeneratorConfig, KotlinClass, KotlinController,
    KotlinMethod, KotlinParameter, KotlinProperty, ParameterLocation,
};
pub use loader::{load_document, load_value};
pub use metrics::{
    MemoryConfig, MemoryStats, MetricsConfig, MetricsReport, TimingSummary,
    DEFAULT_MEMORY_THRESHOLD,
};
pub use node::{
    ArrayNode, CompositionKind, CompositionNode, Constraints, ObjectNode, PrimitiveNode,
    SchemaNode, Variant,
};
pub use reference::{extract_schema_name, is_reference, is_url, ParsedReference};
pub use resolver::{Resolver, VisitedPath};
pub use templates::TemplateEngine;
