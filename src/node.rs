//! Typed schema node model and classification of raw document values.
//!
//! Resolution never probes raw JSON for `$ref` keys mid-flight: a value is
//! classified once into a [`SchemaNode`] variant and the engine matches on
//! that. Classification is structural only — it never follows references.

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{ResolveError, StructureProblem};

/// Which composition keyword a node was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositionKind {
    AllOf,
    OneOf,
    AnyOf,
}

impl CompositionKind {
    /// The OpenAPI keyword for this composition kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            CompositionKind::AllOf => "allOf",
            CompositionKind::OneOf => "oneOf",
            CompositionKind::AnyOf => "anyOf",
        }
    }
}

impl fmt::Display for CompositionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A named variant of a resolved `oneOf`/`anyOf` composition, in declaration
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub name: String,
    pub node: SchemaNode,
}

/// Value constraints carried by a primitive schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
}

impl Constraints {
    fn is_empty(&self) -> bool {
        self.minimum.is_none()
            && self.maximum.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
    }
}

/// A scalar schema (`string`, `integer`, `number`, `boolean`), or an untyped
/// schema when `type_name` is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveNode {
    pub type_name: Option<String>,
    pub format: Option<String>,
    pub description: Option<String>,
    pub nullable: bool,
    pub default: Option<Value>,
    pub enum_values: Vec<Value>,
    pub constraints: Constraints,
}

/// An object schema with named properties in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectNode {
    pub title: Option<String>,
    pub description: Option<String>,
    pub properties: IndexMap<String, SchemaNode>,
    pub required: Vec<String>,
    pub nullable: bool,
    /// Discriminator property name, populated when this node came out of a
    /// resolved `oneOf`.
    pub discriminator: Option<String>,
    pub one_of_variants: Option<Vec<Variant>>,
    pub any_of_variants: Option<Vec<Variant>>,
}

/// An array schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayNode {
    pub items: Option<Box<SchemaNode>>,
    pub description: Option<String>,
    pub nullable: bool,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,
}

/// An unresolved `allOf`/`oneOf`/`anyOf` node. Members stay raw until the
/// composition resolver walks them.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionNode {
    pub kind: CompositionKind,
    pub members: Vec<Value>,
    pub discriminator: Option<String>,
    pub description: Option<String>,
}

/// A schema node, classified into exactly one variant.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A `$ref` pointer, carried verbatim.
    Reference { pointer: String },
    Primitive(PrimitiveNode),
    Object(ObjectNode),
    Array(ArrayNode),
    Composition(CompositionNode),
}

impl SchemaNode {
    /// Classify a raw document value into a typed node.
    ///
    /// Precedence: `$ref`, then a composition keyword (`allOf` before `oneOf`
    /// before `anyOf`), then object/array markers, then primitive. Properties
    /// and item schemas are classified recursively; references inside them are
    /// kept as [`SchemaNode::Reference`] without being followed.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MalformedReference`] for a non-string `$ref`
    /// and [`ResolveError::CompositionStructure`] when a composition keyword
    /// is null, not an array, or an empty array.
    pub fn classify(value: &Value) -> Result<SchemaNode, ResolveError> {
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => return Ok(SchemaNode::Primitive(PrimitiveNode::default())),
        };

        if let Some(reference) = obj.get("$ref") {
            let pointer = match reference.as_str() {
                Some(pointer) => pointer.to_string(),
                None => {
                    return Err(ResolveError::MalformedReference {
                        reference: reference.to_string(),
                    })
                }
            };
            return Ok(SchemaNode::Reference { pointer });
        }

        for kind in [
            CompositionKind::AllOf,
            CompositionKind::OneOf,
            CompositionKind::AnyOf,
        ] {
            if let Some(members) = obj.get(kind.keyword()) {
                return classify_composition(obj, kind, members);
            }
        }

        let declared_type = string_field(obj, "type");
        if declared_type.as_deref() == Some("object") || obj.contains_key("properties") {
            return classify_object(obj);
        }
        if declared_type.as_deref() == Some("array") || obj.contains_key("items") {
            return classify_array(obj);
        }

        Ok(SchemaNode::Primitive(PrimitiveNode {
            type_name: declared_type,
            format: string_field(obj, "format"),
            description: string_field(obj, "description"),
            nullable: bool_field(obj, "nullable"),
            default: obj.get("default").cloned(),
            enum_values: obj
                .get("enum")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            constraints: Constraints {
                minimum: f64_field(obj, "minimum"),
                maximum: f64_field(obj, "maximum"),
                min_length: u64_field(obj, "minLength"),
                max_length: u64_field(obj, "maxLength"),
                pattern: string_field(obj, "pattern"),
            },
        }))
    }

    /// Declared type name used by the allOf conflict rule. References and
    /// unresolved compositions have no comparable declared type.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            SchemaNode::Primitive(p) => p.type_name.as_deref(),
            SchemaNode::Object(_) => Some("object"),
            SchemaNode::Array(_) => Some("array"),
            SchemaNode::Reference { .. } | SchemaNode::Composition(_) => None,
        }
    }

    /// Rough in-memory footprint in bytes, used for cache accounting.
    /// Deliberately coarse: string payloads plus a fixed per-node overhead.
    pub fn estimated_size(&self) -> usize {
        const NODE_OVERHEAD: usize = 48;
        let opt_len = |s: &Option<String>| s.as_deref().map_or(0, str::len);

        match self {
            SchemaNode::Reference { pointer } => NODE_OVERHEAD + pointer.len(),
            SchemaNode::Primitive(p) => {
                NODE_OVERHEAD
                    + opt_len(&p.type_name)
                    + opt_len(&p.format)
                    + opt_len(&p.description)
                    + opt_len(&p.constraints.pattern)
                    + p.enum_values.len() * 16
            }
            SchemaNode::Object(o) => {
                let variants_size = |variants: &Option<Vec<Variant>>| {
                    variants.as_deref().map_or(0, |variants| {
                        variants
                            .iter()
                            .map(|v| v.name.len() + v.node.estimated_size())
                            .sum()
                    })
                };
                NODE_OVERHEAD
                    + opt_len(&o.title)
                    + opt_len(&o.description)
                    + opt_len(&o.discriminator)
                    + o.required.iter().map(String::len).sum::<usize>()
                    + o.properties
                        .iter()
                        .map(|(name, node)| name.len() + node.estimated_size())
                        .sum::<usize>()
                    + variants_size(&o.one_of_variants)
                    + variants_size(&o.any_of_variants)
            }
            SchemaNode::Array(a) => {
                NODE_OVERHEAD
                    + opt_len(&a.description)
                    + a.items.as_deref().map_or(0, SchemaNode::estimated_size)
            }
            SchemaNode::Composition(c) => NODE_OVERHEAD + c.members.len() * 64,
        }
    }

    /// Render this node back into a plain schema value.
    ///
    /// Resolved variant lists appear under the `x-one-of-variants` /
    /// `x-any-of-variants` extension keys.
    pub fn to_value(&self) -> Value {
        match self {
            SchemaNode::Reference { pointer } => {
                let mut out = Map::new();
                out.insert("$ref".to_string(), Value::String(pointer.clone()));
                Value::Object(out)
            }
            SchemaNode::Primitive(p) => {
                let mut out = Map::new();
                if let Some(type_name) = &p.type_name {
                    out.insert("type".to_string(), Value::String(type_name.clone()));
                }
                if let Some(format) = &p.format {
                    out.insert("format".to_string(), Value::String(format.clone()));
                }
                if let Some(description) = &p.description {
                    out.insert(
                        "description".to_string(),
                        Value::String(description.clone()),
                    );
                }
                if p.nullable {
                    out.insert("nullable".to_string(), Value::Bool(true));
                }
                if !p.enum_values.is_empty() {
                    out.insert("enum".to_string(), Value::Array(p.enum_values.clone()));
                }
                if let Some(default) = &p.default {
                    out.insert("default".to_string(), default.clone());
                }
                if !p.constraints.is_empty() {
                    write_constraints(&mut out, &p.constraints);
                }
                Value::Object(out)
            }
            SchemaNode::Object(o) => {
                let mut out = Map::new();
                out.insert("type".to_string(), Value::String("object".to_string()));
                if let Some(title) = &o.title {
                    out.insert("title".to_string(), Value::String(title.clone()));
                }
                if let Some(description) = &o.description {
                    out.insert(
                        "description".to_string(),
                        Value::String(description.clone()),
                    );
                }
                if !o.properties.is_empty() {
                    let mut properties = Map::new();
                    for (name, node) in &o.properties {
                        properties.insert(name.clone(), node.to_value());
                    }
                    out.insert("properties".to_string(), Value::Object(properties));
                }
                if !o.required.is_empty() {
                    out.insert(
                        "required".to_string(),
                        Value::Array(
                            o.required
                                .iter()
                                .map(|name| Value::String(name.clone()))
                                .collect(),
                        ),
                    );
                }
                if o.nullable {
                    out.insert("nullable".to_string(), Value::Bool(true));
                }
                if let Some(property_name) = &o.discriminator {
                    let mut discriminator = Map::new();
                    discriminator.insert(
                        "propertyName".to_string(),
                        Value::String(property_name.clone()),
                    );
                    out.insert("discriminator".to_string(), Value::Object(discriminator));
                }
                if let Some(variants) = &o.one_of_variants {
                    out.insert("x-one-of-variants".to_string(), variants_value(variants));
                }
                if let Some(variants) = &o.any_of_variants {
                    out.insert("x-any-of-variants".to_string(), variants_value(variants));
                }
                Value::Object(out)
            }
            SchemaNode::Array(a) => {
                let mut out = Map::new();
                out.insert("type".to_string(), Value::String("array".to_string()));
                if let Some(items) = &a.items {
                    out.insert("items".to_string(), items.to_value());
                }
                if let Some(description) = &a.description {
                    out.insert(
                        "description".to_string(),
                        Value::String(description.clone()),
                    );
                }
                if a.nullable {
                    out.insert("nullable".to_string(), Value::Bool(true));
                }
                if let Some(min_items) = a.min_items {
                    out.insert("minItems".to_string(), Value::from(min_items));
                }
                if let Some(max_items) = a.max_items {
                    out.insert("maxItems".to_string(), Value::from(max_items));
                }
                if a.unique_items {
                    out.insert("uniqueItems".to_string(), Value::Bool(true));
                }
                Value::Object(out)
            }
            SchemaNode::Composition(c) => {
                let mut out = Map::new();
                out.insert(
                    c.kind.keyword().to_string(),
                    Value::Array(c.members.clone()),
                );
                if let Some(description) = &c.description {
                    out.insert(
                        "description".to_string(),
                        Value::String(description.clone()),
                    );
                }
                if let Some(property_name) = &c.discriminator {
                    let mut discriminator = Map::new();
                    discriminator.insert(
                        "propertyName".to_string(),
                        Value::String(property_name.clone()),
                    );
                    out.insert("discriminator".to_string(), Value::Object(discriminator));
                }
                Value::Object(out)
            }
        }
    }
}

fn classify_composition(
    obj: &Map<String, Value>,
    kind: CompositionKind,
    members: &Value,
) -> Result<SchemaNode, ResolveError> {
    let members = match members {
        Value::Null => {
            return Err(ResolveError::CompositionStructure {
                kind,
                problem: StructureProblem::Null,
            })
        }
        Value::Array(members) if members.is_empty() => {
            return Err(ResolveError::CompositionStructure {
                kind,
                problem: StructureProblem::Empty,
            })
        }
        Value::Array(members) => members.clone(),
        _ => {
            return Err(ResolveError::CompositionStructure {
                kind,
                problem: StructureProblem::NotAnArray,
            })
        }
    };

    Ok(SchemaNode::Composition(CompositionNode {
        kind,
        members,
        discriminator: discriminator_property(obj),
        description: string_field(obj, "description"),
    }))
}

fn classify_object(obj: &Map<String, Value>) -> Result<SchemaNode, ResolveError> {
    let mut properties = IndexMap::new();
    if let Some(raw) = obj.get("properties").and_then(Value::as_object) {
        for (name, value) in raw {
            properties.insert(name.clone(), SchemaNode::classify(value)?);
        }
    }

    let required = obj
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Ok(SchemaNode::Object(ObjectNode {
        title: string_field(obj, "title"),
        description: string_field(obj, "description"),
        properties,
        required,
        nullable: bool_field(obj, "nullable"),
        discriminator: discriminator_property(obj),
        one_of_variants: None,
        any_of_variants: None,
    }))
}

fn classify_array(obj: &Map<String, Value>) -> Result<SchemaNode, ResolveError> {
    let items = match obj.get("items") {
        Some(items) => Some(Box::new(SchemaNode::classify(items)?)),
        None => None,
    };

    Ok(SchemaNode::Array(ArrayNode {
        items,
        description: string_field(obj, "description"),
        nullable: bool_field(obj, "nullable"),
        min_items: u64_field(obj, "minItems"),
        max_items: u64_field(obj, "maxItems"),
        unique_items: bool_field(obj, "uniqueItems"),
    }))
}

/// `discriminator.propertyName`, when present and a string.
fn discriminator_property(obj: &Map<String, Value>) -> Option<String> {
    obj.get("discriminator")
        .and_then(|d| d.get("propertyName"))
        .and_then(Value::as_str)
        .map(String::from)
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(String::from)
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn u64_field(obj: &Map<String, Value>, key: &str) -> Option<u64> {
    obj.get(key).and_then(Value::as_u64)
}

fn f64_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

fn write_constraints(out: &mut Map<String, Value>, constraints: &Constraints) {
    if let Some(minimum) = constraints.minimum {
        out.insert("minimum".to_string(), Value::from(minimum));
    }
    if let Some(maximum) = constraints.maximum {
        out.insert("maximum".to_string(), Value::from(maximum));
    }
    if let Some(min_length) = constraints.min_length {
        out.insert("minLength".to_string(), Value::from(min_length));
    }
    if let Some(max_length) = constraints.max_length {
        out.insert("maxLength".to_string(), Value::from(max_length));
    }
    if let Some(pattern) = &constraints.pattern {
        out.insert("pattern".to_string(), Value::String(pattern.clone()));
    }
}

fn variants_value(variants: &[Variant]) -> Value {
    Value::Array(
        variants
            .iter()
            .map(|variant| {
                let mut entry = Map::new();
                entry.insert("name".to_string(), Value::String(variant.name.clone()));
                entry.insert("schema".to_string(), variant.node.to_value());
                Value::Object(entry)
            })
            .collect(),
    )
}
