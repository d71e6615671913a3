//! Composition merging: allOf property union and oneOf/anyOf variant
//! assembly.
//!
//! These functions take members that are already resolved (no references,
//! no nested compositions) and build the single normalized object node the
//! engine hands downstream. The merge policy is explicit:
//!
//! - allOf merges in array order; properties union, required sets union,
//!   and a property declared with two different type names is a conflict.
//!   Type-name equality is the whole criterion — two `string` properties
//!   with different formats merge fine, the later one winning.
//! - oneOf keeps its members as an ordered variant list next to the
//!   discriminator property.
//! - anyOf keeps an ordered variant list with no discriminator.

use serde_json::Value;

use crate::error::ResolveError;
use crate::node::{ObjectNode, PrimitiveNode, SchemaNode, Variant};
use crate::reference::extract_schema_name;

/// Merge resolved allOf members, in array order, into one object node.
///
/// Non-object members (a primitive mixed into an allOf) contribute no
/// properties and are skipped. The first member description encountered is
/// kept.
///
/// # Errors
///
/// Returns [`ResolveError::ConflictingTypes`] when a property name appears
/// in more than one member with different declared types.
pub fn merge_all_of(
    members: &[SchemaNode],
    description: Option<String>,
) -> Result<SchemaNode, ResolveError> {
    let mut merged = ObjectNode {
        description,
        ..ObjectNode::default()
    };

    for member in members {
        let object = match member {
            SchemaNode::Object(object) => object,
            _ => continue,
        };

        for (name, node) in &object.properties {
            if let Some(existing) = merged.properties.get(name) {
                if let (Some(current), Some(incoming)) = (existing.type_name(), node.type_name())
                {
                    if current != incoming {
                        return Err(ResolveError::ConflictingTypes {
                            property: name.clone(),
                        });
                    }
                }
            }
            merged.properties.insert(name.clone(), node.clone());
        }

        for name in &object.required {
            if !merged.required.contains(name) {
                merged.required.push(name.clone());
            }
        }

        if merged.description.is_none() {
            merged.description = object.description.clone();
        }
        merged.nullable |= object.nullable;
    }

    Ok(SchemaNode::Object(merged))
}

/// Assemble a resolved oneOf: an object node carrying the discriminator as a
/// required string property plus the variant list in declaration order.
pub fn one_of_object(
    discriminator: String,
    variants: Vec<Variant>,
    description: Option<String>,
) -> SchemaNode {
    let mut object = ObjectNode {
        description,
        ..ObjectNode::default()
    };
    object.properties.insert(
        discriminator.clone(),
        SchemaNode::Primitive(PrimitiveNode {
            type_name: Some("string".to_string()),
            ..PrimitiveNode::default()
        }),
    );
    object.required.push(discriminator.clone());
    object.discriminator = Some(discriminator);
    object.one_of_variants = Some(variants);
    SchemaNode::Object(object)
}

/// Assemble a resolved anyOf: an object node carrying the variant list in
/// declaration order.
pub fn any_of_object(variants: Vec<Variant>, description: Option<String>) -> SchemaNode {
    SchemaNode::Object(ObjectNode {
        description,
        any_of_variants: Some(variants),
        ..ObjectNode::default()
    })
}

/// Name for a composition member: the referenced schema name, the member's
/// own title, or a positional fallback.
pub fn variant_name(raw: &Value, index: usize) -> String {
    if let Some(pointer) = raw.get("$ref").and_then(Value::as_str) {
        return extract_schema_name(pointer).to_string();
    }
    if let Some(title) = raw.get("title").and_then(Value::as_str) {
        return title.to_string();
    }
    format!("Variant{}", index + 1)
}
