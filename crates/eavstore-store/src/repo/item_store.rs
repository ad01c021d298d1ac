//! Item store
//!
//! Items and their per-attribute values. Values are encoded and decoded
//! through the codec under the attribute type the caller passes in; nothing
//! checks that type against the attribute row, or that the attribute is
//! linked to the item's entity.

use eavstore_core::codec::{self, StoredValue, Value};
use eavstore_core::errors::EavError;
use eavstore_core::{AttributeType, ExError, Item, ItemAttributeValue, StoredItemValue};
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use crate::errors::{in_op, not_found, Result};
use crate::repo::sql_value::{stored_from_ref, SqlValue};

/// SQLite-backed store of items and item values
pub struct ItemStore;

fn item_not_found(op: &'static str, item_id: i64) -> ExError {
    not_found(op, EavError::ItemNotFound { item_id })
}

fn value_not_found(op: &'static str, item_id: i64, attribute_id: i64) -> ExError {
    not_found(
        op,
        EavError::ValueNotFound {
            item_id,
            attribute_id,
        },
    )
}

fn encode(
    op: &'static str,
    attribute_type: AttributeType,
    value: Option<&Value>,
) -> Result<StoredValue> {
    codec::encode(attribute_type, value).map_err(|e| ExError::from(e).with_op(op))
}

impl ItemStore {
    // ===== Items =====

    pub fn create_item(conn: &Connection, entity_id: i64) -> Result<Item> {
        let id: i64 = conn
            .query_row(
                "INSERT INTO items (entity_id) VALUES (?1) RETURNING id",
                [entity_id],
                |row| row.get(0),
            )
            .map_err(|e| in_op("create_item")(e).with_entity_id(entity_id))?;
        tracing::debug!(item_id = id, entity_id, "item created");
        Ok(Item::new(id, entity_id))
    }

    pub fn get_item(conn: &Connection, id: i64) -> Result<Item> {
        conn.query_row(
            "SELECT id, entity_id FROM items WHERE id = ?1",
            [id],
            |row| Ok(Item::new(row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(in_op("get_item"))?
        .ok_or_else(|| item_not_found("get_item", id))
    }

    pub fn list_items(conn: &Connection) -> Result<Vec<Item>> {
        let mut stmt = conn
            .prepare("SELECT id, entity_id FROM items ORDER BY id")
            .map_err(in_op("list_items"))?;
        let items = stmt
            .query_map([], |row| Ok(Item::new(row.get(0)?, row.get(1)?)))
            .map_err(in_op("list_items"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(in_op("list_items"))?;
        Ok(items)
    }

    /// Re-point an item at another entity
    ///
    /// All of the item's values are purged first, including values for
    /// attributes the two entities share. Both statements run inside the
    /// caller's transaction.
    pub fn change_entity(tx: &Transaction<'_>, item: &Item, entity_id: i64) -> Result<Item> {
        let purged = Self::delete_values_by_item(tx, item.id)?;
        let changed = tx
            .execute(
                "UPDATE items SET entity_id = ?2 WHERE id = ?1",
                params![item.id, entity_id],
            )
            .map_err(|e| in_op("change_entity")(e).with_entity_id(entity_id))?;
        if changed == 0 {
            return Err(item_not_found("change_entity", item.id));
        }
        tracing::debug!(
            item_id = item.id,
            entity_id,
            row_count = purged,
            "item re-pointed"
        );
        Ok(Item::new(item.id, entity_id))
    }

    /// Purge the item's values, then delete the item row
    pub fn delete_item(tx: &Transaction<'_>, id: i64) -> Result<()> {
        Self::delete_values_by_item(tx, id)?;
        let changed = tx
            .execute("DELETE FROM items WHERE id = ?1", [id])
            .map_err(in_op("delete_item"))?;
        if changed == 0 {
            return Err(item_not_found("delete_item", id));
        }
        tracing::debug!(item_id = id, "item deleted");
        Ok(())
    }

    // ===== Values =====

    /// Insert the value for an (item, attribute) pair
    ///
    /// Fails with `Conflict` if the pair already has a row.
    pub fn create_value(
        conn: &Connection,
        item_id: i64,
        attribute_id: i64,
        attribute_type: AttributeType,
        value: Option<&Value>,
    ) -> Result<ItemAttributeValue> {
        let stored = encode("create_value", attribute_type, value)?;
        conn.execute(
            "INSERT INTO item_attribute (item_id, attribute_id, value) VALUES (?1, ?2, ?3)",
            params![item_id, attribute_id, SqlValue(&stored)],
        )
        .map_err(|e| {
            in_op("create_value")(e)
                .with_item_id(item_id)
                .with_attribute_id(attribute_id)
        })?;
        tracing::debug!(
            item_id,
            attribute_id,
            attribute_type = attribute_type.as_str(),
            "value created"
        );
        Ok(ItemAttributeValue {
            item_id,
            attribute_id,
            attribute_type,
            value: value.cloned(),
        })
    }

    /// Replace the value of an existing (item, attribute) pair
    ///
    /// Fails with `NotFound` if the pair has no row.
    pub fn update_value(
        conn: &Connection,
        item_id: i64,
        attribute_id: i64,
        attribute_type: AttributeType,
        value: Option<&Value>,
    ) -> Result<ItemAttributeValue> {
        let stored = encode("update_value", attribute_type, value)?;
        let changed = conn
            .execute(
                "UPDATE item_attribute SET value = ?3 WHERE item_id = ?1 AND attribute_id = ?2",
                params![item_id, attribute_id, SqlValue(&stored)],
            )
            .map_err(in_op("update_value"))?;
        if changed == 0 {
            return Err(value_not_found("update_value", item_id, attribute_id));
        }
        Ok(ItemAttributeValue {
            item_id,
            attribute_id,
            attribute_type,
            value: value.cloned(),
        })
    }

    /// Read and decode one value
    ///
    /// `Ok(None)` means the row exists but holds no value; a missing row is
    /// `NotFound`.
    pub fn get_value(
        conn: &Connection,
        item_id: i64,
        attribute_id: i64,
        attribute_type: AttributeType,
    ) -> Result<Option<Value>> {
        let stored = conn
            .query_row(
                "SELECT value FROM item_attribute WHERE item_id = ?1 AND attribute_id = ?2",
                params![item_id, attribute_id],
                |row| Ok(stored_from_ref(row.get_ref(0)?)),
            )
            .optional()
            .map_err(in_op("get_value"))?
            .ok_or_else(|| value_not_found("get_value", item_id, attribute_id))?;

        codec::decode(attribute_type, &stored).map_err(|e| {
            ExError::from(e)
                .with_op("get_value")
                .with_item_id(item_id)
                .with_attribute_id(attribute_id)
        })
    }

    pub fn delete_value(conn: &Connection, item_id: i64, attribute_id: i64) -> Result<()> {
        let changed = conn
            .execute(
                "DELETE FROM item_attribute WHERE item_id = ?1 AND attribute_id = ?2",
                params![item_id, attribute_id],
            )
            .map_err(in_op("delete_value"))?;
        if changed == 0 {
            return Err(value_not_found("delete_value", item_id, attribute_id));
        }
        Ok(())
    }

    pub fn delete_values_by_item(conn: &Connection, item_id: i64) -> Result<usize> {
        conn.execute("DELETE FROM item_attribute WHERE item_id = ?1", [item_id])
            .map_err(in_op("delete_values_by_item"))
    }

    /// Remove the attribute's values across all items
    pub fn delete_values_by_attribute(conn: &Connection, attribute_id: i64) -> Result<usize> {
        let removed = conn
            .execute(
                "DELETE FROM item_attribute WHERE attribute_id = ?1",
                [attribute_id],
            )
            .map_err(in_op("delete_values_by_attribute"))?;
        tracing::debug!(attribute_id, row_count = removed, "values removed");
        Ok(removed)
    }

    /// Every value row of an item, undecoded, ordered by attribute id
    ///
    /// The type column is returned as stored. Rows whose attribute no longer
    /// exists come back with an empty type.
    pub fn list_values(conn: &Connection, item_id: i64) -> Result<Vec<StoredItemValue>> {
        let mut stmt = conn
            .prepare(
                "SELECT item_attribute.item_id, item_attribute.attribute_id,
                        COALESCE(attributes.type, ''), item_attribute.value
                 FROM item_attribute
                 LEFT JOIN attributes ON attributes.id = item_attribute.attribute_id
                 WHERE item_attribute.item_id = ?1
                 ORDER BY item_attribute.attribute_id",
            )
            .map_err(in_op("list_values"))?;
        let values = stmt
            .query_map([item_id], |row| {
                Ok(StoredItemValue {
                    item_id: row.get(0)?,
                    attribute_id: row.get(1)?,
                    attribute_type: row.get(2)?,
                    stored: stored_from_ref(row.get_ref(3)?),
                })
            })
            .map_err(in_op("list_values"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(in_op("list_values"))?;
        Ok(values)
    }

    /// Every value of an item, decoded under its attribute's type
    ///
    /// Rows whose type is outside the vocabulary are skipped with a warning.
    /// The first row that fails to decode fails the whole listing.
    pub fn list_decoded_values(
        conn: &Connection,
        item_id: i64,
    ) -> Result<Vec<ItemAttributeValue>> {
        let mut decoded = Vec::new();
        for row in Self::list_values(conn, item_id)? {
            if let Some(value) = Self::decode_row(&row)? {
                decoded.push(value);
            }
        }
        Ok(decoded)
    }

    /// Decode one stored row under its attribute's type
    ///
    /// Returns `Ok(None)`, with a warning, when the type is outside the
    /// vocabulary.
    pub fn decode_row(row: &StoredItemValue) -> Result<Option<ItemAttributeValue>> {
        let Ok(attribute_type) = row.attribute_type.parse::<AttributeType>() else {
            tracing::warn!(
                item_id = row.item_id,
                attribute_id = row.attribute_id,
                attribute_type = %row.attribute_type,
                "skipping value with invalid attribute type"
            );
            return Ok(None);
        };
        let value = codec::decode(attribute_type, &row.stored).map_err(|e| {
            ExError::from(e)
                .with_op("decode_row")
                .with_item_id(row.item_id)
                .with_attribute_id(row.attribute_id)
        })?;
        Ok(Some(ItemAttributeValue {
            item_id: row.item_id,
            attribute_id: row.attribute_id,
            attribute_type,
            value,
        }))
    }
}
