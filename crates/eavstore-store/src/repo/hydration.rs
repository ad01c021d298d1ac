//! Relationship loader
//!
//! Hydrates an entity's attributes or an attribute's entities. The lazy path
//! runs one query per parent and memoizes it in the parent's `Relation`; the
//! eager path aggregates every parent's children into the parent query. Both
//! paths share the aggregate fragments below and the payload decoder in
//! `eavstore_core::payload`, so they produce the same children in the same
//! order.

use eavstore_core::errors::EavError;
use eavstore_core::model::LookupTable;
use eavstore_core::payload::{parse_attribute_payload, parse_entity_payload};
use eavstore_core::{Attribute, Entity, ExError, LinkedAttribute, LinkedEntity, Lookup};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::errors::{in_op, not_found, Result};
use crate::repo::schema_registry::{lookup_param, parse_stored_type};

/// Attributes seen from `entity_attribute`, NULL when there are none
const ATTRIBUTE_AGGREGATE: &str = "CASE WHEN COUNT(attributes.id) = 0 THEN NULL ELSE \
     json_group_array(json_object(\
         'id', attributes.id, 'name', attributes.name, 'slug', attributes.slug, \
         'type', attributes.type, 'required', entity_attribute.required\
     )) FILTER (WHERE attributes.id IS NOT NULL) END";

/// Entities seen from `entity_attribute`, NULL when there are none
const ENTITY_AGGREGATE: &str = "CASE WHEN COUNT(entities.id) = 0 THEN NULL ELSE \
     json_group_array(json_object(\
         'id', entities.id, 'name', entities.name, 'slug', entities.slug, \
         'required', entity_attribute.required\
     )) FILTER (WHERE entities.id IS NOT NULL) END";

/// Copy an aggregate column out of a row; NULL stays `None`
fn payload_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Vec<u8>>> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Ok(Some(bytes.to_vec())),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            idx,
            other.data_type(),
            "relation aggregate must be text".into(),
        )),
    }
}

fn decode_attributes(op: &'static str, payload: Option<&[u8]>) -> Result<Vec<LinkedAttribute>> {
    parse_attribute_payload(payload).map_err(|e| ExError::from(e).with_op(op))
}

fn decode_entities(op: &'static str, payload: Option<&[u8]>) -> Result<Vec<LinkedEntity>> {
    parse_entity_payload(payload).map_err(|e| ExError::from(e).with_op(op))
}

type EntityAggregateRow = (i64, String, String, Option<Vec<u8>>);
type AttributeAggregateRow = (i64, String, String, String, Option<Vec<u8>>);

fn entity_aggregate_row(row: &Row<'_>) -> rusqlite::Result<EntityAggregateRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, payload_column(row, 3)?))
}

fn attribute_aggregate_row(row: &Row<'_>) -> rusqlite::Result<AttributeAggregateRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        payload_column(row, 4)?,
    ))
}

fn entities_query(filter: &str) -> String {
    format!(
        "SELECT entities.id, entities.name, entities.slug, {}
         FROM entities
         LEFT JOIN entity_attribute ON entity_attribute.entity_id = entities.id
         LEFT JOIN attributes ON attributes.id = entity_attribute.attribute_id
         {}
         GROUP BY entities.id
         ORDER BY entities.id",
        ATTRIBUTE_AGGREGATE, filter
    )
}

fn attributes_query(filter: &str) -> String {
    format!(
        "SELECT attributes.id, attributes.name, attributes.slug, attributes.type, {}
         FROM attributes
         LEFT JOIN entity_attribute ON entity_attribute.attribute_id = attributes.id
         LEFT JOIN entities ON entities.id = entity_attribute.entity_id
         {}
         GROUP BY attributes.id
         ORDER BY attributes.id",
        ENTITY_AGGREGATE, filter
    )
}

fn build_entity(op: &'static str, row: EntityAggregateRow) -> Result<Entity> {
    let (id, name, slug, payload) = row;
    let attributes = decode_attributes(op, payload.as_deref())?;
    Ok(Entity::with_attributes(id, name, slug, attributes))
}

fn build_attribute(op: &'static str, row: AttributeAggregateRow) -> Result<Attribute> {
    let (id, name, slug, tag, payload) = row;
    let attribute_type = parse_stored_type(op, id, &tag)?;
    let entities = decode_entities(op, payload.as_deref())?;
    Ok(Attribute::with_entities(
        id,
        name,
        slug,
        attribute_type,
        entities,
    ))
}

/// Lazy and eager hydration of entity/attribute relations
pub struct RelationshipLoader;

impl RelationshipLoader {
    // ===== Lazy =====

    /// Attributes linked to `entity_id`, in one query
    ///
    /// An unknown entity id yields an empty list.
    pub fn load_attributes_by_entity(
        conn: &Connection,
        entity_id: i64,
    ) -> Result<Vec<LinkedAttribute>> {
        let sql = format!(
            "SELECT {} FROM entity_attribute
             LEFT JOIN attributes ON attributes.id = entity_attribute.attribute_id
             WHERE entity_attribute.entity_id = ?1",
            ATTRIBUTE_AGGREGATE
        );
        let payload = conn
            .query_row(&sql, [entity_id], |row| payload_column(row, 0))
            .map_err(in_op("load_attributes_by_entity"))?;
        tracing::debug!(entity_id, "attributes loaded");
        decode_attributes("load_attributes_by_entity", payload.as_deref())
    }

    /// Entities linked to `attribute_id`, in one query
    pub fn load_entities_by_attribute(
        conn: &Connection,
        attribute_id: i64,
    ) -> Result<Vec<LinkedEntity>> {
        let sql = format!(
            "SELECT {} FROM entity_attribute
             LEFT JOIN entities ON entities.id = entity_attribute.entity_id
             WHERE entity_attribute.attribute_id = ?1",
            ENTITY_AGGREGATE
        );
        let payload = conn
            .query_row(&sql, [attribute_id], |row| payload_column(row, 0))
            .map_err(in_op("load_entities_by_attribute"))?;
        tracing::debug!(attribute_id, "entities loaded");
        decode_entities("load_entities_by_attribute", payload.as_deref())
    }

    /// The entity's attributes, loading them on first access
    ///
    /// Later calls return the cached list without querying, even if links
    /// changed in the meantime.
    pub fn attributes_of<'e>(
        conn: &Connection,
        entity: &'e Entity,
    ) -> Result<&'e [LinkedAttribute]> {
        entity
            .attributes()
            .get_or_try_load(|| Self::load_attributes_by_entity(conn, entity.id))
    }

    /// The attribute's entities, loading them on first access
    pub fn entities_of<'a>(
        conn: &Connection,
        attribute: &'a Attribute,
    ) -> Result<&'a [LinkedEntity]> {
        attribute
            .entities()
            .get_or_try_load(|| Self::load_entities_by_attribute(conn, attribute.id))
    }

    // ===== Eager =====

    /// Every entity with its attributes, in one query
    pub fn list_entities_with_attributes(conn: &Connection) -> Result<Vec<Entity>> {
        let op = "list_entities_with_attributes";
        let mut stmt = conn.prepare(&entities_query("")).map_err(in_op(op))?;
        let rows = stmt
            .query_map([], entity_aggregate_row)
            .map_err(in_op(op))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(in_op(op))?;
        tracing::debug!(row_count = rows.len(), "entities hydrated");
        rows.into_iter().map(|row| build_entity(op, row)).collect()
    }

    /// Every attribute with its entities, in one query
    pub fn list_attributes_with_entities(conn: &Connection) -> Result<Vec<Attribute>> {
        let op = "list_attributes_with_entities";
        let mut stmt = conn.prepare(&attributes_query("")).map_err(in_op(op))?;
        let rows = stmt
            .query_map([], attribute_aggregate_row)
            .map_err(in_op(op))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(in_op(op))?;
        tracing::debug!(row_count = rows.len(), "attributes hydrated");
        rows.into_iter()
            .map(|row| build_attribute(op, row))
            .collect()
    }

    pub fn get_entity_with_attributes(conn: &Connection, lookup: &Lookup) -> Result<Entity> {
        let op = "get_entity_with_attributes";
        let filter = format!("WHERE {}", lookup.predicate(LookupTable::Entities));
        let row = conn
            .query_row(
                &entities_query(&filter),
                [lookup_param(lookup)],
                entity_aggregate_row,
            )
            .optional()
            .map_err(in_op(op))?
            .ok_or_else(|| {
                not_found(
                    op,
                    EavError::EntityNotFound {
                        selector: lookup.to_string(),
                    },
                )
            })?;
        build_entity(op, row)
    }

    pub fn get_attribute_with_entities(conn: &Connection, lookup: &Lookup) -> Result<Attribute> {
        let op = "get_attribute_with_entities";
        let filter = format!("WHERE {}", lookup.predicate(LookupTable::Attributes));
        let row = conn
            .query_row(
                &attributes_query(&filter),
                [lookup_param(lookup)],
                attribute_aggregate_row,
            )
            .optional()
            .map_err(in_op(op))?
            .ok_or_else(|| {
                not_found(
                    op,
                    EavError::AttributeNotFound {
                        selector: lookup.to_string(),
                    },
                )
            })?;
        build_attribute(op, row)
    }
}
