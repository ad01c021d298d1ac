//! Item command handlers with boundary logging.
//!
//! Items are created against an entity, and values are set from caller text
//! parsed through the codec of the attribute's type. Nothing here enforces
//! required attributes or checks that a value's attribute is linked to the
//! item's entity; `item_describe` reports such values separately.

use std::collections::HashMap;

use eavstore_core::codec::{self, UnparsablePolicy};
use eavstore_core::{
    log_op_end, log_op_error, log_op_start, Entity, ExError, Hydration, Item,
    ItemAttributeValue, LinkedAttribute, Lookup, Value,
};
use eavstore_store::errors::Result;
use eavstore_store::repo::{ItemStore, SchemaRegistry};
use eavstore_store::StoreConfig;
use rusqlite::{Connection, Transaction};
use serde::Serialize;

use super::{resolve_attribute, resolve_entity};

/// Whether setting a value inserts a new row or replaces an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetMode {
    #[default]
    Add,
    Replace,
}

/// An item with the entity it now belongs to
#[derive(Debug, Clone)]
pub struct ItemCreated {
    pub item: Item,
    pub entity: Entity,
    /// Attributes the entity marks as required; reported, not enforced
    pub required: Vec<LinkedAttribute>,
}

/// One stored value, labelled by the entity's link to its attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemValueView {
    pub attribute_id: i64,
    pub name: String,
    pub slug: String,
    pub required: bool,
    pub value: Option<Value>,
    /// Why the stored value could not be decoded; `value` is then `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ItemView {
    pub item: Item,
    pub entity: Entity,
    pub values: Vec<ItemValueView>,
    /// Values whose attribute is not linked to the entity
    pub unlinked: Vec<ItemAttributeValue>,
}

fn required_of(entity: &Entity) -> Vec<LinkedAttribute> {
    entity
        .required_attributes()
        .unwrap_or_default()
        .into_iter()
        .cloned()
        .collect()
}

/// Create an item for the entity named by `entity`
///
/// ## Errors
///
/// - `NotFound`: no such entity
pub fn item_create(conn: &Connection, entity: &Lookup) -> Result<ItemCreated> {
    log_op_start!("item_create", entity = %entity);
    let start = std::time::Instant::now();

    let created = item_create_impl(conn, entity).map_err(|e| {
        log_op_error!(
            "item_create",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "item_create",
        duration_ms = start.elapsed().as_millis() as u64,
        item_id = created.item.id,
        entity_id = created.entity.id
    );
    Ok(created)
}

fn item_create_impl(conn: &Connection, entity: &Lookup) -> Result<ItemCreated> {
    let entity = resolve_entity(conn, entity)?;
    let item = ItemStore::create_item(conn, entity.id)?;
    let required = required_of(&entity);
    if !required.is_empty() {
        tracing::debug!(
            item_id = item.id,
            row_count = required.len(),
            "item has required attributes"
        );
    }
    Ok(ItemCreated {
        item,
        entity,
        required,
    })
}

/// Parse `raw` for the attribute's type and store it on the item
///
/// With `UnparsablePolicy::StoreMissing`, text that does not parse is stored
/// as a missing value.
///
/// ## Errors
///
/// - `NotFound`: no such item or attribute, or `Replace` with no existing value
/// - `Conflict`: `Add` when the item already has a value for the attribute
/// - `InvalidInput`: unparsable text under `UnparsablePolicy::Reject`
pub fn item_set_value(
    conn: &Connection,
    item_id: i64,
    attribute: &Lookup,
    raw: &str,
    mode: SetMode,
    policy: UnparsablePolicy,
) -> Result<ItemAttributeValue> {
    log_op_start!(
        "item_set_value",
        item_id = item_id,
        attribute = %attribute,
        mode = ?mode
    );
    let start = std::time::Instant::now();

    let value = item_set_value_impl(conn, item_id, attribute, raw, mode, policy).map_err(|e| {
        log_op_error!(
            "item_set_value",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            item_id = item_id
        );
        e
    })?;

    log_op_end!(
        "item_set_value",
        duration_ms = start.elapsed().as_millis() as u64,
        attribute_id = value.attribute_id,
        attribute_type = value.attribute_type.as_str()
    );
    Ok(value)
}

/// [`item_set_value`] with the unparsable-input policy read from `config`
pub fn item_set_value_configured(
    conn: &Connection,
    config: &StoreConfig,
    item_id: i64,
    attribute: &Lookup,
    raw: &str,
    mode: SetMode,
) -> Result<ItemAttributeValue> {
    item_set_value(
        conn,
        item_id,
        attribute,
        raw,
        mode,
        config.unparsable_values,
    )
}

fn item_set_value_impl(
    conn: &Connection,
    item_id: i64,
    attribute: &Lookup,
    raw: &str,
    mode: SetMode,
    policy: UnparsablePolicy,
) -> Result<ItemAttributeValue> {
    let item = ItemStore::get_item(conn, item_id)?;
    let attribute = resolve_attribute(conn, attribute)?;
    let value = codec::parse_input(attribute.attribute_type, raw, policy).map_err(|e| {
        ExError::from(e)
            .with_op("item_set_value")
            .with_item_id(item.id)
            .with_attribute_id(attribute.id)
    })?;

    match mode {
        SetMode::Add => ItemStore::create_value(
            conn,
            item.id,
            attribute.id,
            attribute.attribute_type,
            value.as_ref(),
        ),
        SetMode::Replace => ItemStore::update_value(
            conn,
            item.id,
            attribute.id,
            attribute.attribute_type,
            value.as_ref(),
        ),
    }
}

/// Remove the item's value for one attribute
pub fn item_unset_value(conn: &Connection, item_id: i64, attribute: &Lookup) -> Result<()> {
    log_op_start!("item_unset_value", item_id = item_id, attribute = %attribute);
    let start = std::time::Instant::now();

    resolve_attribute(conn, attribute)
        .and_then(|attribute| ItemStore::delete_value(conn, item_id, attribute.id))
        .map_err(|e| {
            log_op_error!(
                "item_unset_value",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                item_id = item_id
            );
            e
        })?;

    log_op_end!(
        "item_unset_value",
        duration_ms = start.elapsed().as_millis() as u64
    );
    Ok(())
}

/// The item, its entity, and every stored value decoded
///
/// A value that no longer decodes under its attribute's type is reported
/// through [`ItemValueView::error`] rather than failing the item.
pub fn item_describe(conn: &Connection, item_id: i64) -> Result<ItemView> {
    log_op_start!("item_describe", item_id = item_id);
    let start = std::time::Instant::now();

    let view = ItemStore::get_item(conn, item_id)
        .and_then(|item| {
            let entity = resolve_entity(conn, &Lookup::Id(item.entity_id))?;
            describe(conn, item, entity)
        })
        .map_err(|e| {
            log_op_error!(
                "item_describe",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                item_id = item_id
            );
            e
        })?;

    log_op_end!(
        "item_describe",
        duration_ms = start.elapsed().as_millis() as u64,
        row_count = view.values.len()
    );
    Ok(view)
}

/// Every item, described
///
/// Entities come from one eager list query. Items whose entity row is gone
/// are skipped with a warning.
pub fn item_list(conn: &Connection) -> Result<Vec<ItemView>> {
    log_op_start!("item_list");
    let start = std::time::Instant::now();

    let views = item_list_impl(conn).map_err(|e| {
        log_op_error!(
            "item_list",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "item_list",
        duration_ms = start.elapsed().as_millis() as u64,
        row_count = views.len()
    );
    Ok(views)
}

fn item_list_impl(conn: &Connection) -> Result<Vec<ItemView>> {
    let entities: HashMap<i64, Entity> = SchemaRegistry::list_entities(conn, Hydration::Eager)?
        .into_iter()
        .map(|entity| (entity.id, entity))
        .collect();

    let mut views = Vec::new();
    for item in ItemStore::list_items(conn)? {
        let Some(entity) = entities.get(&item.entity_id) else {
            tracing::warn!(
                item_id = item.id,
                entity_id = item.entity_id,
                "skipping item whose entity is missing"
            );
            continue;
        };
        views.push(describe(conn, item, entity.clone())?);
    }
    Ok(views)
}

fn describe(conn: &Connection, item: Item, entity: Entity) -> Result<ItemView> {
    let linked = entity.attributes().get().unwrap_or_default();
    let mut values = Vec::new();
    let mut unlinked = Vec::new();

    for row in ItemStore::list_values(conn, item.id)? {
        let attribute = linked.iter().find(|a| a.id == row.attribute_id);
        let (value, error) = match ItemStore::decode_row(&row) {
            Ok(Some(decoded)) => (Some(decoded), None),
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(
                    item_id = item.id,
                    attribute_id = row.attribute_id,
                    err_kind = ?e.kind(),
                    "stored value does not decode"
                );
                (None, Some(e.to_string()))
            }
        };
        match (attribute, value) {
            (Some(attribute), decoded) => values.push(ItemValueView {
                attribute_id: attribute.id,
                name: attribute.name.clone(),
                slug: attribute.slug.clone(),
                required: attribute.required,
                value: decoded.and_then(|d| d.value),
                error,
            }),
            (None, Some(decoded)) => unlinked.push(decoded),
            (None, None) => {}
        }
    }

    Ok(ItemView {
        item,
        entity,
        values,
        unlinked,
    })
}

/// Move an item to another entity, dropping all of its values
pub fn item_change_entity(
    tx: &Transaction<'_>,
    item_id: i64,
    entity: &Lookup,
) -> Result<ItemCreated> {
    log_op_start!("item_change_entity", item_id = item_id, entity = %entity);
    let start = std::time::Instant::now();

    let moved = item_change_entity_impl(tx, item_id, entity).map_err(|e| {
        log_op_error!(
            "item_change_entity",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            item_id = item_id
        );
        e
    })?;

    log_op_end!(
        "item_change_entity",
        duration_ms = start.elapsed().as_millis() as u64,
        entity_id = moved.entity.id
    );
    Ok(moved)
}

fn item_change_entity_impl(
    tx: &Transaction<'_>,
    item_id: i64,
    entity: &Lookup,
) -> Result<ItemCreated> {
    let item = ItemStore::get_item(tx, item_id)?;
    let entity = resolve_entity(tx, entity)?;
    let item = ItemStore::change_entity(tx, &item, entity.id)?;
    let required = required_of(&entity);
    Ok(ItemCreated {
        item,
        entity,
        required,
    })
}

/// Delete an item and its values
pub fn item_delete(tx: &Transaction<'_>, item_id: i64) -> Result<()> {
    log_op_start!("item_delete", item_id = item_id);
    let start = std::time::Instant::now();

    ItemStore::delete_item(tx, item_id).map_err(|e| {
        log_op_error!(
            "item_delete",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            item_id = item_id
        );
        e
    })?;

    log_op_end!(
        "item_delete",
        duration_ms = start.elapsed().as_millis() as u64
    );
    Ok(())
}
