use serde::{Deserialize, Serialize};

use super::attribute_type::AttributeType;
use super::relation::Relation;

/// Entity - a named record kind
///
/// Items are instances of an entity. The linked attributes are held in a
/// [`Relation`] that is either filled at construction (eager query) or on the
/// first lazy load, and then never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Surrogate row id
    pub id: i64,

    /// Human-readable name
    pub name: String,

    /// Unique alternate key, usable wherever an id is accepted
    pub slug: String,

    attributes: Relation<LinkedAttribute>,
}

impl Entity {
    /// Entity whose attributes have not been loaded
    pub fn new(id: i64, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            attributes: Relation::not_loaded(),
        }
    }

    /// Entity with its attributes already hydrated
    pub fn with_attributes(
        id: i64,
        name: impl Into<String>,
        slug: impl Into<String>,
        attributes: Vec<LinkedAttribute>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            attributes: Relation::loaded(attributes),
        }
    }

    pub fn attributes(&self) -> &Relation<LinkedAttribute> {
        &self.attributes
    }

    /// Linked attributes marked required, if the relation is loaded
    pub fn required_attributes(&self) -> Option<Vec<&LinkedAttribute>> {
        self.attributes
            .get()
            .map(|attrs| attrs.iter().filter(|a| a.required).collect())
    }
}

/// One attribute as seen from an entity, including the link's required flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAttribute {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    pub required: bool,
}

/// Row of the entity/attribute junction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAttributeLink {
    pub entity_id: i64,
    pub attribute_id: i64,
    pub required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(required: bool) -> LinkedAttribute {
        LinkedAttribute {
            id: 1,
            name: "Title".to_string(),
            slug: "title".to_string(),
            attribute_type: AttributeType::String,
            required,
        }
    }

    #[test]
    fn test_new_entity_is_unloaded() {
        let entity = Entity::new(1, "Book", "book");
        assert!(!entity.attributes().is_loaded());
        assert_eq!(entity.required_attributes(), None);
    }

    #[test]
    fn test_required_attributes_filters_links() {
        let pages = LinkedAttribute {
            id: 2,
            name: "Pages".to_string(),
            slug: "pages".to_string(),
            attribute_type: AttributeType::Uint16,
            required: false,
        };
        let entity = Entity::with_attributes(1, "Book", "book", vec![title(true), pages]);

        let required = entity.required_attributes().unwrap();
        assert_eq!(required.len(), 1);
        assert_eq!(required[0].slug, "title");
    }

    #[test]
    fn test_linked_attribute_serializes_type_field() {
        let json = serde_json::to_value(title(true)).unwrap();
        assert_eq!(json["type"], "string");
        assert_eq!(json["required"], true);
    }
}
