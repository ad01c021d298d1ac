use serde::{Deserialize, Serialize};

use super::attribute_type::AttributeType;
use crate::codec::{StoredValue, Value};

/// Item - one instance of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub entity_id: i64,
}

impl Item {
    pub fn new(id: i64, entity_id: i64) -> Self {
        Self { id, entity_id }
    }
}

/// A decoded value attached to an item for one attribute
///
/// `value` is `None` when the row holds no value, which is distinct from a
/// zero of the attribute's type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemAttributeValue {
    pub item_id: i64,
    pub attribute_id: i64,
    pub attribute_type: AttributeType,
    pub value: Option<Value>,
}

/// A value row as stored, before decoding
///
/// `attribute_type` is the attribute's type column verbatim, so rows whose
/// tag falls outside the vocabulary can still be listed.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredItemValue {
    pub item_id: i64,
    pub attribute_id: i64,
    pub attribute_type: String,
    pub stored: StoredValue,
}
