pub mod attribute;
pub mod attribute_type;
pub mod entity;
pub mod entity_draft;
pub mod item;
pub mod lookup;
pub mod relation;

pub use attribute::{Attribute, LinkedEntity};
pub use attribute_type::AttributeType;
pub use entity::{Entity, EntityAttributeLink, LinkedAttribute};
pub use entity_draft::{DraftAttribute, DraftLink, EntityDraft};
pub use item::{Item, ItemAttributeValue, StoredItemValue};
pub use lookup::{Lookup, LookupTable};
pub use relation::Relation;

/// How a registry get/list hydrates the linked collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hydration {
    /// Children are fetched on first access and memoized
    #[default]
    Lazy,
    /// Children are aggregated into the same query as the parent
    Eager,
}

impl Hydration {
    pub fn is_eager(self) -> bool {
        matches!(self, Hydration::Eager)
    }
}

impl From<bool> for Hydration {
    fn from(eager: bool) -> Self {
        if eager {
            Hydration::Eager
        } else {
            Hydration::Lazy
        }
    }
}
