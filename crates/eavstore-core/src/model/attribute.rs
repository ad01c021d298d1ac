use serde::{Deserialize, Serialize};

use super::attribute_type::AttributeType;
use super::relation::Relation;

/// Attribute - a typed field that can be linked to many entities
///
/// The type tag decides which codec reads and writes the attribute's values.
/// Changing it while values exist leaves those values unreadable under the
/// new tag; nothing prevents that.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub attribute_type: AttributeType,

    entities: Relation<LinkedEntity>,
}

impl Attribute {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        slug: impl Into<String>,
        attribute_type: AttributeType,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            attribute_type,
            entities: Relation::not_loaded(),
        }
    }

    pub fn with_entities(
        id: i64,
        name: impl Into<String>,
        slug: impl Into<String>,
        attribute_type: AttributeType,
        entities: Vec<LinkedEntity>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            attribute_type,
            entities: Relation::loaded(entities),
        }
    }

    pub fn entities(&self) -> &Relation<LinkedEntity> {
        &self.entities
    }
}

/// One entity as seen from an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedEntity {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub required: bool,
}
