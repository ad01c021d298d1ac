//! eavstore core - typed values and relation model for an EAV store
//!
//! This crate has no storage dependency. It provides:
//! - Entity, Attribute, Item and value models, with memoized relations
//! - The closed attribute type vocabulary and the per-type value codec
//! - Decoding of aggregated relation payloads produced by the store
//! - The error and logging facilities shared by the store and engine crates

pub mod codec;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod payload;

/// Field-name constants used by the logging macros
pub use eavstore_core_types as core_types;

// Re-export commonly used types
pub use codec::{StoredValue, UnparsablePolicy, Value};
pub use errors::{EavError, ExError, ExErrorKind, Result};
pub use model::{
    Attribute, AttributeType, DraftAttribute, Entity, EntityAttributeLink, EntityDraft, Hydration,
    Item, ItemAttributeValue, LinkedAttribute, LinkedEntity, Lookup, Relation, StoredItemValue,
};
