//! Schema command handlers with boundary logging.
//!
//! Entities, attributes and the links between them.
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging for schema operations:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal details.

use eavstore_core::{
    log_op_end, log_op_error, log_op_start, Attribute, AttributeType, Entity,
    EntityAttributeLink, EntityDraft, ExError,
};
use eavstore_store::errors::Result;
use eavstore_store::repo::{ItemStore, SchemaRegistry};
use rusqlite::{Connection, Transaction};

use super::{parse_lookup, resolve_attribute, resolve_entity};

/// Rows removed by a retire command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Retired {
    pub values_removed: usize,
    pub links_removed: usize,
}

/// Create an entity
///
/// ## Errors
///
/// - `Conflict`: the slug is taken
pub fn entity_create(conn: &Connection, name: &str, slug: &str) -> Result<Entity> {
    log_op_start!("entity_create", slug = slug);
    let start = std::time::Instant::now();

    let entity = SchemaRegistry::create_entity(conn, name, slug).map_err(|e| {
        log_op_error!(
            "entity_create",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "entity_create",
        duration_ms = start.elapsed().as_millis() as u64,
        entity_id = entity.id
    );
    Ok(entity)
}

/// Save an entity together with its attributes and links
///
/// ## Errors
///
/// - `Conflict`: a slug is taken or an attribute is named twice
/// - `NotFound`: an existing attribute does not resolve
pub fn entity_define(tx: &Transaction<'_>, draft: &EntityDraft) -> Result<Entity> {
    log_op_start!(
        "entity_define",
        slug = draft.slug.as_str(),
        row_count = draft.links().len()
    );
    let start = std::time::Instant::now();

    let entity = SchemaRegistry::save_entity(tx, draft).map_err(|e| {
        log_op_error!(
            "entity_define",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "entity_define",
        duration_ms = start.elapsed().as_millis() as u64,
        entity_id = entity.id
    );
    Ok(entity)
}

/// Create an attribute from a type tag string
///
/// The tag is checked against the vocabulary before anything is written.
///
/// ## Errors
///
/// - `InvalidInput`: unknown type tag
/// - `Conflict`: the slug is taken
pub fn attribute_create(
    conn: &Connection,
    name: &str,
    slug: &str,
    type_tag: &str,
) -> Result<Attribute> {
    log_op_start!("attribute_create", slug = slug, attribute_type = type_tag);
    let start = std::time::Instant::now();

    let attribute = attribute_create_impl(conn, name, slug, type_tag).map_err(|e| {
        log_op_error!(
            "attribute_create",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "attribute_create",
        duration_ms = start.elapsed().as_millis() as u64,
        attribute_id = attribute.id
    );
    Ok(attribute)
}

fn attribute_create_impl(
    conn: &Connection,
    name: &str,
    slug: &str,
    type_tag: &str,
) -> Result<Attribute> {
    let attribute_type: AttributeType = type_tag
        .parse()
        .map_err(|e| ExError::from(e).with_op("attribute_create"))?;
    SchemaRegistry::create_attribute(conn, name, slug, attribute_type)
}

/// Link an attribute to an entity, both given as id or slug
pub fn link_by_slug(
    conn: &Connection,
    entity: &str,
    attribute: &str,
    required: bool,
) -> Result<EntityAttributeLink> {
    log_op_start!(
        "link_by_slug",
        entity = entity,
        attribute = attribute,
        required = required
    );
    let start = std::time::Instant::now();

    let link = resolve_pair(conn, "link_by_slug", entity, attribute)
        .and_then(|(entity_id, attribute_id)| {
            SchemaRegistry::link(conn, entity_id, attribute_id, required)
        })
        .map_err(|e| {
            log_op_error!(
                "link_by_slug",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "link_by_slug",
        duration_ms = start.elapsed().as_millis() as u64,
        entity_id = link.entity_id,
        attribute_id = link.attribute_id
    );
    Ok(link)
}

pub fn set_required_by_slug(
    conn: &Connection,
    entity: &str,
    attribute: &str,
    required: bool,
) -> Result<EntityAttributeLink> {
    log_op_start!(
        "set_required_by_slug",
        entity = entity,
        attribute = attribute,
        required = required
    );
    let start = std::time::Instant::now();

    let link = resolve_pair(conn, "set_required_by_slug", entity, attribute)
        .and_then(|(entity_id, attribute_id)| {
            SchemaRegistry::set_required(conn, entity_id, attribute_id, required)?;
            Ok(EntityAttributeLink {
                entity_id,
                attribute_id,
                required,
            })
        })
        .map_err(|e| {
            log_op_error!(
                "set_required_by_slug",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "set_required_by_slug",
        duration_ms = start.elapsed().as_millis() as u64
    );
    Ok(link)
}

pub fn unlink_by_slug(conn: &Connection, entity: &str, attribute: &str) -> Result<()> {
    log_op_start!("unlink_by_slug", entity = entity, attribute = attribute);
    let start = std::time::Instant::now();

    resolve_pair(conn, "unlink_by_slug", entity, attribute)
        .and_then(|(entity_id, attribute_id)| {
            SchemaRegistry::unlink(conn, entity_id, attribute_id)
        })
        .map_err(|e| {
            log_op_error!(
                "unlink_by_slug",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "unlink_by_slug",
        duration_ms = start.elapsed().as_millis() as u64
    );
    Ok(())
}

fn resolve_pair(
    conn: &Connection,
    op: &'static str,
    entity: &str,
    attribute: &str,
) -> Result<(i64, i64)> {
    let entity = resolve_entity(conn, &parse_lookup(op, entity)?)?;
    let attribute = resolve_attribute(conn, &parse_lookup(op, attribute)?)?;
    Ok((entity.id, attribute.id))
}

/// Retire an attribute: its values, then its links, then the row
///
/// ## Errors
///
/// - `NotFound`: no attribute with this id
pub fn attribute_retire(tx: &Transaction<'_>, attribute_id: i64) -> Result<Retired> {
    log_op_start!("attribute_retire", attribute_id = attribute_id);
    let start = std::time::Instant::now();

    let retired = attribute_retire_impl(tx, attribute_id).map_err(|e| {
        log_op_error!(
            "attribute_retire",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            attribute_id = attribute_id
        );
        e
    })?;

    log_op_end!(
        "attribute_retire",
        duration_ms = start.elapsed().as_millis() as u64,
        values_removed = retired.values_removed,
        links_removed = retired.links_removed
    );
    Ok(retired)
}

fn attribute_retire_impl(tx: &Transaction<'_>, attribute_id: i64) -> Result<Retired> {
    let values_removed = ItemStore::delete_values_by_attribute(tx, attribute_id)?;
    let links_removed = SchemaRegistry::unlink_by_attribute(tx, attribute_id)?;
    SchemaRegistry::delete_attribute(tx, attribute_id)?;
    Ok(Retired {
        values_removed,
        links_removed,
    })
}

/// Retire an entity: its links, then the row
///
/// Items of the entity are left alone; with foreign keys on, an entity that
/// still has items cannot be retired.
pub fn entity_retire(tx: &Transaction<'_>, entity_id: i64) -> Result<Retired> {
    log_op_start!("entity_retire", entity_id = entity_id);
    let start = std::time::Instant::now();

    let retired = SchemaRegistry::unlink_by_entity(tx, entity_id)
        .and_then(|links_removed| {
            SchemaRegistry::delete_entity(tx, entity_id)?;
            Ok(Retired {
                values_removed: 0,
                links_removed,
            })
        })
        .map_err(|e| {
            log_op_error!(
                "entity_retire",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                entity_id = entity_id
            );
            e
        })?;

    log_op_end!(
        "entity_retire",
        duration_ms = start.elapsed().as_millis() as u64,
        links_removed = retired.links_removed
    );
    Ok(retired)
}
