//! Kotlin source generation from resolved schemas.
//!
//! Registry schemas become Spring-flavored model classes (data classes,
//! sealed hierarchies for discriminated oneOf, value wrappers for anyOf),
//! path operations become controller interfaces grouped by tag, and every
//! run emits a Gradle build file alongside the sources.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::document::Document;
use crate::error::GenerateError;
use crate::loader;
use crate::node::{ArrayNode, ObjectNode, PrimitiveNode, SchemaNode, Variant};
use crate::reference;
use crate::resolver::Resolver;
use crate::templates::TemplateEngine;

const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Options controlling what a generation run emits.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub output_dir: PathBuf,
    pub base_package: String,
    pub generate_models: bool,
    pub generate_controllers: bool,
    pub include_validation: bool,
    pub include_swagger: bool,
}

impl Default for GeneratorConfig {
    fn default() -> GeneratorConfig {
        GeneratorConfig {
            output_dir: PathBuf::from("generated"),
            base_package: "com.example.api".to_string(),
            generate_models: true,
            generate_controllers: true,
            include_validation: true,
            include_swagger: true,
        }
    }
}

/// What one generation run produced.
#[derive(Debug)]
pub struct GenerationSummary {
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// A Kotlin model source file.
#[derive(Debug, Clone)]
pub struct KotlinClass {
    pub name: String,
    pub package: String,
    pub description: Option<String>,
    pub properties: Vec<KotlinProperty>,
    pub imports: Vec<String>,
    pub kind: ClassKind,
}

/// The shape a model class takes.
#[derive(Debug, Clone)]
pub enum ClassKind {
    /// Plain data class built from object properties.
    Data,
    /// Sealed hierarchy for a discriminated oneOf.
    Sealed {
        discriminator: String,
        subtypes: Vec<KotlinClass>,
    },
    /// Single-value wrapper for an anyOf union.
    Union,
    /// Type alias for non-object registry entries.
    Alias { target: String },
}

#[derive(Debug, Clone)]
pub struct KotlinProperty {
    pub name: String,
    pub kotlin_type: String,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub description: Option<String>,
    /// Original wire name when it differs from the Kotlin name.
    pub json_name: Option<String>,
    pub annotations: Vec<String>,
}

/// A controller interface grouped from one tag.
#[derive(Debug, Clone)]
pub struct KotlinController {
    pub name: String,
    pub package: String,
    pub description: Option<String>,
    pub methods: Vec<KotlinMethod>,
    pub imports: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct KotlinMethod {
    pub name: String,
    pub http_method: String,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<KotlinParameter>,
    pub request_body: Option<KotlinParameter>,
    pub return_type: String,
    pub response_description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct KotlinParameter {
    pub name: String,
    pub kotlin_type: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub annotations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
}

/// One operation pulled out of the paths section.
#[derive(Debug)]
struct TaggedOperation {
    path: String,
    method: String,
    detail: Map<String, Value>,
}

/// Drives a full generation run: load, resolve, convert, write.
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    resolver: Resolver,
    templates: TemplateEngine,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Generator {
        Generator::with_resolver(config, Resolver::new())
    }

    /// Use a pre-configured resolver (caching, memory, metrics, external
    /// fetch policy all carry over).
    pub fn with_resolver(config: GeneratorConfig, resolver: Resolver) -> Generator {
        let templates = TemplateEngine::new(config.include_swagger);
        Generator {
            config,
            resolver,
            templates,
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut Resolver {
        &mut self.resolver
    }

    /// Generate Kotlin sources for one specification file.
    ///
    /// # Errors
    ///
    /// Fails if the document does not load or validate, if any schema does
    /// not resolve, or if an output file cannot be written.
    pub fn generate(&mut self, input: &Path) -> Result<GenerationSummary, GenerateError> {
        let document = loader::load_document(input)?;
        info!(
            title = document.title(),
            version = document.version(),
            "generating Kotlin sources"
        );

        fs::create_dir_all(&self.config.output_dir).map_err(|source| {
            GenerateError::WriteError {
                path: self.config.output_dir.clone(),
                source,
            }
        })?;

        let mut files = Vec::new();
        if self.config.generate_models {
            files.extend(self.generate_models(&document)?);
        }
        if self.config.generate_controllers {
            files.extend(self.generate_controllers(&document)?);
        }
        files.push(self.write_build_file()?);

        info!(
            files = files.len(),
            output = %self.config.output_dir.display(),
            "generation complete"
        );
        Ok(GenerationSummary {
            output_dir: self.config.output_dir.clone(),
            files,
        })
    }

    fn generate_models(&mut self, document: &Document) -> Result<Vec<PathBuf>, GenerateError> {
        let schemas = self.resolver.all_schemas(document)?;
        debug!(count = schemas.len(), "converting registry schemas");

        let mut files = Vec::with_capacity(schemas.len());
        for (name, node) in &schemas {
            let class = self.model_class(name, node);
            let content = self.templates.kotlin_class(&class);
            let path =
                self.write_kotlin_file(&class.package, &format!("{}.kt", class.name), &content)?;
            debug!(model = %class.name, "generated model");
            files.push(path);
        }
        Ok(files)
    }

    fn generate_controllers(&mut self, document: &Document) -> Result<Vec<PathBuf>, GenerateError> {
        let tagged = operations_by_tag(document);
        let mut files = Vec::with_capacity(tagged.len());

        for (tag, operations) in &tagged {
            let controller = self.controller_class(document, tag, operations)?;
            let content = self.templates.kotlin_controller(&controller);
            let path = self.write_kotlin_file(
                &controller.package,
                &format!("{}.kt", controller.name),
                &content,
            )?;
            debug!(controller = %controller.name, operations = operations.len(), "generated controller");
            files.push(path);
        }
        Ok(files)
    }

    /// Convert one resolved registry entry into a model class.
    fn model_class(&self, name: &str, node: &SchemaNode) -> KotlinClass {
        match node {
            SchemaNode::Object(object) => {
                if let Some(variants) = &object.one_of_variants {
                    self.sealed_class(name, object, variants)
                } else if let Some(variants) = &object.any_of_variants {
                    self.union_class(name, object, variants)
                } else {
                    self.data_class(name, object)
                }
            }
            other => self.alias_class(name, other),
        }
    }

    fn data_class(&self, name: &str, object: &ObjectNode) -> KotlinClass {
        let properties = self.class_properties(object);
        let mut imports = self.base_model_imports();
        for property in &properties {
            add_type_imports(&property.kotlin_type, &mut imports);
        }

        KotlinClass {
            name: pascal_case(name),
            package: self.model_package(),
            description: object.description.clone(),
            properties,
            imports,
            kind: ClassKind::Data,
        }
    }

    fn sealed_class(&self, name: &str, object: &ObjectNode, variants: &[Variant]) -> KotlinClass {
        let mut imports = self.base_model_imports();
        imports.push("com.fasterxml.jackson.annotation.JsonTypeInfo".to_string());
        imports.push("com.fasterxml.jackson.annotation.JsonSubTypes".to_string());

        let subtypes = variants
            .iter()
            .map(|variant| {
                let properties = match &variant.node {
                    SchemaNode::Object(variant_object) => self.class_properties(variant_object),
                    other => vec![KotlinProperty {
                        name: "value".to_string(),
                        kotlin_type: kotlin_type(other),
                        nullable: false,
                        default_value: None,
                        description: None,
                        json_name: None,
                        annotations: Vec::new(),
                    }],
                };
                for property in &properties {
                    add_type_imports(&property.kotlin_type, &mut imports);
                }
                KotlinClass {
                    name: pascal_case(&variant.name),
                    package: self.model_package(),
                    description: node_description(&variant.node).map(str::to_string),
                    properties,
                    imports: Vec::new(),
                    kind: ClassKind::Data,
                }
            })
            .collect();

        KotlinClass {
            name: pascal_case(name),
            package: self.model_package(),
            description: object.description.clone(),
            properties: Vec::new(),
            imports,
            kind: ClassKind::Sealed {
                discriminator: object.discriminator.clone().unwrap_or_default(),
                subtypes,
            },
        }
    }

    fn union_class(&self, name: &str, object: &ObjectNode, variants: &[Variant]) -> KotlinClass {
        let mut imports = self.base_model_imports();
        imports.push("com.fasterxml.jackson.annotation.JsonValue".to_string());
        imports.push("com.fasterxml.jackson.annotation.JsonCreator".to_string());

        let names: Vec<&str> = variants.iter().map(|v| v.name.as_str()).collect();
        let description = object
            .description
            .clone()
            .unwrap_or_else(|| format!("Accepts any of: {}.", names.join(", ")));

        KotlinClass {
            name: pascal_case(name),
            package: self.model_package(),
            description: Some(description),
            properties: vec![KotlinProperty {
                name: "value".to_string(),
                kotlin_type: "Any".to_string(),
                nullable: false,
                default_value: None,
                description: None,
                json_name: None,
                annotations: vec!["@JsonValue".to_string()],
            }],
            imports,
            kind: ClassKind::Union,
        }
    }

    fn alias_class(&self, name: &str, node: &SchemaNode) -> KotlinClass {
        KotlinClass {
            name: pascal_case(name),
            package: self.model_package(),
            description: node_description(node).map(str::to_string),
            properties: Vec::new(),
            imports: Vec::new(),
            kind: ClassKind::Alias {
                target: kotlin_type(node),
            },
        }
    }

    fn class_properties(&self, object: &ObjectNode) -> Vec<KotlinProperty> {
        object
            .properties
            .iter()
            .map(|(name, node)| self.property(name, node, &object.required))
            .collect()
    }

    fn property(&self, name: &str, node: &SchemaNode, required: &[String]) -> KotlinProperty {
        let kotlin_name = camel_case(name);
        let is_required = required.iter().any(|r| r == name);
        let nullable = node_nullable(node) || !is_required;
        let kotlin_type = kotlin_type(node);

        let mut default_value = None;
        if let SchemaNode::Primitive(primitive) = node {
            if let Some(default) = &primitive.default {
                default_value = Some(default_literal(default, &kotlin_type));
            }
        }
        if default_value.is_none() && nullable {
            default_value = Some("null".to_string());
        }

        let annotations = if self.config.include_validation {
            validation_annotations(node, is_required)
        } else {
            Vec::new()
        };

        KotlinProperty {
            json_name: (kotlin_name != name).then(|| name.to_string()),
            name: kotlin_name,
            kotlin_type,
            nullable,
            default_value,
            description: node_description(node).map(str::to_string),
            annotations,
        }
    }

    fn controller_class(
        &mut self,
        document: &Document,
        tag: &str,
        operations: &[TaggedOperation],
    ) -> Result<KotlinController, GenerateError> {
        let mut methods = Vec::with_capacity(operations.len());
        for operation in operations {
            methods.push(self.controller_method(document, operation)?);
        }

        Ok(KotlinController {
            name: format!("{}Controller", pascal_case(tag)),
            package: format!("{}.controller", self.config.base_package),
            description: Some(format!("{} API controller interface", pascal_case(tag))),
            methods,
            imports: self.base_controller_imports(),
        })
    }

    fn controller_method(
        &mut self,
        document: &Document,
        operation: &TaggedOperation,
    ) -> Result<KotlinMethod, GenerateError> {
        let detail = &operation.detail;
        let name = detail
            .get("operationId")
            .and_then(Value::as_str)
            .map(camel_case)
            .unwrap_or_else(|| method_name(&operation.method, &operation.path));

        let mut parameters = Vec::new();
        if let Some(declared) = detail.get("parameters").and_then(Value::as_array) {
            for param in declared {
                let Some(param) = param.as_object() else {
                    continue;
                };
                // Referenced parameter objects are out of scope.
                if param.contains_key("$ref") {
                    continue;
                }
                parameters.push(self.operation_parameter(document, param)?);
            }
        }

        let request_body = self.request_body_parameter(document, detail)?;
        let (return_type, response_description) = self.success_response(document, detail)?;

        Ok(KotlinMethod {
            name,
            http_method: operation.method.clone(),
            path: operation.path.clone(),
            summary: detail.get("summary").and_then(Value::as_str).map(str::to_string),
            description: detail
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            parameters,
            request_body,
            return_type,
            response_description,
        })
    }

    fn operation_parameter(
        &mut self,
        document: &Document,
        param: &Map<String, Value>,
    ) -> Result<KotlinParameter, GenerateError> {
        let name = param.get("name").and_then(Value::as_str).unwrap_or("param");
        let location = match param.get("in").and_then(Value::as_str) {
            Some("path") => ParameterLocation::Path,
            Some("header") => ParameterLocation::Header,
            _ => ParameterLocation::Query,
        };
        let required = param
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let parameter_type = match param.get("schema") {
            Some(schema) => kotlin_type(&self.resolver.resolve_schema(document, schema)?),
            None => "String".to_string(),
        };
        let annotations = if self.config.include_validation && required {
            vec!["@NotNull".to_string()]
        } else {
            Vec::new()
        };

        Ok(KotlinParameter {
            name: camel_case(name),
            kotlin_type: parameter_type,
            location,
            required,
            annotations,
        })
    }

    fn request_body_parameter(
        &mut self,
        document: &Document,
        detail: &Map<String, Value>,
    ) -> Result<Option<KotlinParameter>, GenerateError> {
        let body = detail.get("requestBody");
        let Some(schema) = body
            .and_then(|body| body.get("content"))
            .and_then(|content| content.get("application/json"))
            .and_then(|media| media.get("schema"))
        else {
            return Ok(None);
        };

        let node = self.resolver.resolve_schema(document, schema)?;
        let required = body
            .and_then(|body| body.get("required"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let annotations = if self.config.include_validation {
            vec!["@Valid".to_string()]
        } else {
            Vec::new()
        };

        Ok(Some(KotlinParameter {
            name: "body".to_string(),
            kotlin_type: kotlin_type(&node),
            location: ParameterLocation::Body,
            required,
            annotations,
        }))
    }

    /// Return type and description from the first success response
    /// (200, then 201, then default).
    fn success_response(
        &mut self,
        document: &Document,
        detail: &Map<String, Value>,
    ) -> Result<(String, Option<String>), GenerateError> {
        let responses = detail.get("responses").and_then(Value::as_object);
        let success = responses.and_then(|responses| {
            responses
                .get("200")
                .or_else(|| responses.get("201"))
                .or_else(|| responses.get("default"))
        });
        let Some(response) = success else {
            return Ok(("ResponseEntity<Any>".to_string(), Some("Success".to_string())));
        };

        let description = response
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some("Success".to_string()));
        let return_type = match response
            .get("content")
            .and_then(|content| content.get("application/json"))
            .and_then(|media| media.get("schema"))
        {
            Some(schema) => format!(
                "ResponseEntity<{}>",
                kotlin_type(&self.resolver.resolve_schema(document, schema)?)
            ),
            None => "ResponseEntity<Any>".to_string(),
        };

        Ok((return_type, description))
    }

    fn write_kotlin_file(
        &self,
        package: &str,
        file_name: &str,
        content: &str,
    ) -> Result<PathBuf, GenerateError> {
        let mut dir = self.config.output_dir.join("src").join("main").join("kotlin");
        for segment in package.split('.') {
            dir.push(segment);
        }
        fs::create_dir_all(&dir).map_err(|source| GenerateError::WriteError {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(file_name);
        fs::write(&path, content).map_err(|source| GenerateError::WriteError {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    fn write_build_file(&self) -> Result<PathBuf, GenerateError> {
        let content = self.templates.build_file(&self.config.base_package);
        let path = self.config.output_dir.join("build.gradle.kts");
        fs::write(&path, content).map_err(|source| GenerateError::WriteError {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    fn model_package(&self) -> String {
        format!("{}.model", self.config.base_package)
    }

    fn base_model_imports(&self) -> Vec<String> {
        let mut imports = Vec::new();
        if self.config.include_validation {
            imports.push("javax.validation.constraints.*".to_string());
            imports.push("javax.validation.Valid".to_string());
        }
        imports.push("com.fasterxml.jackson.annotation.JsonProperty".to_string());
        if self.config.include_swagger {
            imports.push("io.swagger.v3.oas.annotations.media.Schema".to_string());
        }
        imports
    }

    fn base_controller_imports(&self) -> Vec<String> {
        let mut imports = vec![
            "org.springframework.http.ResponseEntity".to_string(),
            "org.springframework.web.bind.annotation.*".to_string(),
        ];
        if self.config.include_validation {
            imports.push("javax.validation.Valid".to_string());
            imports.push("javax.validation.constraints.*".to_string());
        }
        if self.config.include_swagger {
            imports.extend([
                "io.swagger.v3.oas.annotations.Operation".to_string(),
                "io.swagger.v3.oas.annotations.responses.ApiResponse".to_string(),
                "io.swagger.v3.oas.annotations.responses.ApiResponses".to_string(),
            ]);
        }
        imports
    }
}

/// Group path operations by their first tag, `default` when untagged.
fn operations_by_tag(document: &Document) -> indexmap::IndexMap<String, Vec<TaggedOperation>> {
    let mut tagged: indexmap::IndexMap<String, Vec<TaggedOperation>> = indexmap::IndexMap::new();
    let Some(paths) = document.paths() else {
        return tagged;
    };

    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };
        for method in HTTP_METHODS {
            let Some(detail) = item.get(method).and_then(Value::as_object) else {
                continue;
            };
            let tag = detail
                .get("tags")
                .and_then(Value::as_array)
                .and_then(|tags| tags.first())
                .and_then(Value::as_str)
                .unwrap_or("default")
                .to_string();
            tagged.entry(tag).or_default().push(TaggedOperation {
                path: path.clone(),
                method: method.to_string(),
                detail: detail.clone(),
            });
        }
    }
    tagged
}

/// Map a resolved node onto a Kotlin type.
fn kotlin_type(node: &SchemaNode) -> String {
    match node {
        SchemaNode::Reference { pointer } => pascal_case(reference::extract_schema_name(pointer)),
        SchemaNode::Primitive(primitive) => primitive_type(primitive),
        SchemaNode::Array(array) => array_type(array),
        SchemaNode::Object(_) => "Map<String, Any>".to_string(),
        SchemaNode::Composition(_) => "Any".to_string(),
    }
}

fn primitive_type(primitive: &PrimitiveNode) -> String {
    let format = primitive.format.as_deref();
    match primitive.type_name.as_deref() {
        Some("string") => match format {
            Some("date") => "java.time.LocalDate",
            Some("date-time") => "java.time.OffsetDateTime",
            Some("uuid") => "java.util.UUID",
            Some("uri") => "java.net.URI",
            Some("byte") | Some("binary") => "ByteArray",
            _ => "String",
        },
        Some("integer") => match format {
            Some("int64") => "Long",
            _ => "Int",
        },
        Some("number") => match format {
            Some("float") => "Float",
            Some("double") => "Double",
            _ => "java.math.BigDecimal",
        },
        Some("boolean") => "Boolean",
        _ => "Any",
    }
    .to_string()
}

fn array_type(array: &ArrayNode) -> String {
    match &array.items {
        Some(items) => format!("List<{}>", kotlin_type(items)),
        None => "List<Any>".to_string(),
    }
}

fn validation_annotations(node: &SchemaNode, required: bool) -> Vec<String> {
    let mut annotations = Vec::new();
    if required && !node_nullable(node) {
        annotations.push("@NotNull".to_string());
    }

    match node {
        SchemaNode::Primitive(primitive) => match primitive.type_name.as_deref() {
            Some("string") => {
                if primitive.format.as_deref() == Some("email") {
                    annotations.push("@Email".to_string());
                }
                let constraints = &primitive.constraints;
                if constraints.min_length.is_some() || constraints.max_length.is_some() {
                    let min = constraints.min_length.unwrap_or(0);
                    let max = constraints
                        .max_length
                        .map_or_else(|| "Integer.MAX_VALUE".to_string(), |v| v.to_string());
                    annotations.push(format!("@Size(min = {min}, max = {max})"));
                }
                if let Some(pattern) = &constraints.pattern {
                    annotations.push(format!("@Pattern(regexp = \"{pattern}\")"));
                }
            }
            Some("integer") | Some("number") => {
                if let Some(minimum) = primitive.constraints.minimum {
                    annotations.push(format!("@Min({})", minimum as i64));
                }
                if let Some(maximum) = primitive.constraints.maximum {
                    annotations.push(format!("@Max({})", maximum as i64));
                }
            }
            _ => {}
        },
        SchemaNode::Array(array) => {
            if array.min_items.is_some() || array.max_items.is_some() {
                let min = array.min_items.unwrap_or(0);
                let max = array
                    .max_items
                    .map_or_else(|| "Integer.MAX_VALUE".to_string(), |v| v.to_string());
                annotations.push(format!("@Size(min = {min}, max = {max})"));
            }
        }
        SchemaNode::Object(object) if !object.properties.is_empty() => {
            annotations.push("@Valid".to_string());
        }
        SchemaNode::Reference { .. } => {
            annotations.push("@Valid".to_string());
        }
        _ => {}
    }

    annotations
}

fn node_nullable(node: &SchemaNode) -> bool {
    match node {
        SchemaNode::Primitive(primitive) => primitive.nullable,
        SchemaNode::Object(object) => object.nullable,
        SchemaNode::Array(array) => array.nullable,
        SchemaNode::Reference { .. } | SchemaNode::Composition(_) => false,
    }
}

fn node_description(node: &SchemaNode) -> Option<&str> {
    match node {
        SchemaNode::Primitive(primitive) => primitive.description.as_deref(),
        SchemaNode::Object(object) => object.description.as_deref(),
        SchemaNode::Array(array) => array.description.as_deref(),
        SchemaNode::Composition(composition) => composition.description.as_deref(),
        SchemaNode::Reference { .. } => None,
    }
}

fn default_literal(value: &Value, kotlin_type: &str) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => {
            if kotlin_type == "String" {
                format!("\"{s}\"")
            } else {
                s.clone()
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Derived method name for operations without an operationId:
/// HTTP verb prefix plus the last concrete path segment.
fn method_name(http_method: &str, path: &str) -> String {
    let resource = path
        .split('/')
        .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .last()
        .unwrap_or("resource");
    let prefix = match http_method {
        "get" => "get",
        "post" => "create",
        "put" => "update",
        "delete" => "delete",
        "patch" => "patch",
        other => other,
    };
    format!("{prefix}{}", pascal_case(resource))
}

fn add_type_imports(kotlin_type: &str, imports: &mut Vec<String>) {
    for qualified in [
        "java.time.LocalDate",
        "java.time.OffsetDateTime",
        "java.util.UUID",
        "java.net.URI",
        "java.math.BigDecimal",
    ] {
        if kotlin_type.contains(qualified) && !imports.iter().any(|import| import == qualified) {
            imports.push(qualified.to_string());
        }
    }
}

pub(crate) fn pascal_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut upper_next = true;
    for ch in input.chars() {
        if ch == '-' || ch == '_' || ch.is_whitespace() {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

pub(crate) fn camel_case(input: &str) -> String {
    let pascal = pascal_case(input);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}
