//! Decoding of aggregated relation payloads
//!
//! The store hydrates relations with a single aggregate column per parent:
//! a JSON array of `{id, name, slug, type?, required}` objects, or NULL when
//! the parent has no linked children. Both the lazy and the eager paths feed
//! that column through these functions, so they return identical children.

use serde::{Deserialize, Deserializer};

use crate::errors::{EavError, Result};
use crate::model::{AttributeType, LinkedAttribute, LinkedEntity};

#[derive(Deserialize)]
struct RawAttribute {
    id: i64,
    name: String,
    slug: String,
    #[serde(rename = "type")]
    attribute_type: String,
    #[serde(deserialize_with = "flag")]
    required: bool,
}

#[derive(Deserialize)]
struct RawEntity {
    id: i64,
    name: String,
    slug: String,
    #[serde(deserialize_with = "flag")]
    required: bool,
}

/// SQLite hands booleans back as 0/1; accept a JSON bool as well
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(n) => Err(serde::de::Error::custom(format!(
            "required flag must be 0 or 1, found {}",
            n
        ))),
    }
}

fn parse_array<T: for<'de> Deserialize<'de>>(payload: Option<&[u8]>) -> Result<Vec<T>> {
    let Some(bytes) = payload else {
        return Ok(Vec::new());
    };
    let text = std::str::from_utf8(bytes).map_err(|e| EavError::MalformedPayload {
        reason: format!("not UTF-8: {}", e),
    })?;
    let items: Option<Vec<T>> =
        serde_json::from_str(text).map_err(|e| EavError::MalformedPayload {
            reason: e.to_string(),
        })?;
    Ok(items.unwrap_or_default())
}

/// Decode an entity's aggregated attributes, sorted by attribute id
///
/// Entries whose `type` is outside the vocabulary are dropped with a warning.
///
/// # Errors
///
/// Returns `MalformedPayload` when the bytes are not UTF-8 or not an array of
/// the expected objects.
pub fn parse_attribute_payload(payload: Option<&[u8]>) -> Result<Vec<LinkedAttribute>> {
    let raw: Vec<RawAttribute> = parse_array(payload)?;
    let mut attributes: Vec<LinkedAttribute> = raw
        .into_iter()
        .filter_map(|a| match a.attribute_type.parse::<AttributeType>() {
            Ok(attribute_type) => Some(LinkedAttribute {
                id: a.id,
                name: a.name,
                slug: a.slug,
                attribute_type,
                required: a.required,
            }),
            Err(_) => {
                tracing::warn!(
                    attribute_id = a.id,
                    attribute_type = %a.attribute_type,
                    "skipping linked attribute with invalid type"
                );
                None
            }
        })
        .collect();
    attributes.sort_by_key(|a| a.id);
    Ok(attributes)
}

/// Decode an attribute's aggregated entities, sorted by entity id
///
/// # Errors
///
/// Returns `MalformedPayload` when the bytes are not UTF-8 or not an array of
/// the expected objects.
pub fn parse_entity_payload(payload: Option<&[u8]>) -> Result<Vec<LinkedEntity>> {
    let raw: Vec<RawEntity> = parse_array(payload)?;
    let mut entities: Vec<LinkedEntity> = raw
        .into_iter()
        .map(|e| LinkedEntity {
            id: e.id,
            name: e.name,
            slug: e.slug,
            required: e.required,
        })
        .collect();
    entities.sort_by_key(|e| e.id);
    Ok(entities)
}
