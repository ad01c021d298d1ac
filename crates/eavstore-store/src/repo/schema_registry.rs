//! Schema registry
//!
//! Entities, attributes and the links between them. Updates and deletes that
//! match no row are reported as `NotFound`; unique-slug and duplicate-link
//! violations come back as `Conflict` from the storage layer.

use eavstore_core::errors::EavError;
use eavstore_core::model::LookupTable;
use eavstore_core::{
    Attribute, AttributeType, DraftAttribute, Entity, EntityAttributeLink, EntityDraft, Hydration,
    LinkedAttribute, Lookup,
};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::errors::{attribute_not_found, entity_not_found, in_op, not_found, Result};
use crate::repo::hydration::RelationshipLoader;

/// SQLite-backed registry of entities, attributes and links
pub struct SchemaRegistry;

/// Bind parameter for a lookup's `?1`
pub(crate) fn lookup_param(lookup: &Lookup) -> &dyn ToSql {
    match lookup {
        Lookup::Id(id) => id,
        Lookup::Slug(slug) => slug,
    }
}

/// Raw attribute row; the type column is parsed after the row is read
type AttributeRow = (i64, String, String, String);

fn attribute_row(row: &Row<'_>) -> rusqlite::Result<AttributeRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

pub(crate) fn parse_stored_type(op: &'static str, id: i64, tag: &str) -> Result<AttributeType> {
    tag.parse::<AttributeType>().map_err(|e| {
        eavstore_core::ExError::from(e)
            .with_op(op)
            .with_attribute_id(id)
    })
}

impl SchemaRegistry {
    // ===== Entities =====

    pub fn create_entity(conn: &Connection, name: &str, slug: &str) -> Result<Entity> {
        let id: i64 = conn
            .query_row(
                "INSERT INTO entities (name, slug) VALUES (?1, ?2) RETURNING id",
                params![name, slug],
                |row| row.get(0),
            )
            .map_err(in_op("create_entity"))?;
        tracing::debug!(entity_id = id, slug, "entity created");
        Ok(Entity::new(id, name, slug))
    }

    pub fn update_entity_name(conn: &Connection, id: i64, name: &str) -> Result<()> {
        let changed = conn
            .execute(
                "UPDATE entities SET name = ?2 WHERE id = ?1",
                params![id, name],
            )
            .map_err(in_op("update_entity_name"))?;
        if changed == 0 {
            return Err(entity_not_found("update_entity_name", id));
        }
        Ok(())
    }

    pub fn update_entity_slug(conn: &Connection, id: i64, slug: &str) -> Result<()> {
        let changed = conn
            .execute(
                "UPDATE entities SET slug = ?2 WHERE id = ?1",
                params![id, slug],
            )
            .map_err(in_op("update_entity_slug"))?;
        if changed == 0 {
            return Err(entity_not_found("update_entity_slug", id));
        }
        Ok(())
    }

    /// Delete the entity row only
    ///
    /// Links and items are left alone. With foreign keys on, an entity that
    /// is still referenced fails with `Conflict`.
    pub fn delete_entity(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn
            .execute("DELETE FROM entities WHERE id = ?1", [id])
            .map_err(in_op("delete_entity"))?;
        if changed == 0 {
            return Err(entity_not_found("delete_entity", id));
        }
        tracing::debug!(entity_id = id, "entity deleted");
        Ok(())
    }

    /// Fetch one entity by id or slug
    ///
    /// With `Hydration::Eager` the linked attributes are aggregated into the
    /// same query; otherwise they load on first access.
    pub fn get_entity(conn: &Connection, lookup: &Lookup, hydration: Hydration) -> Result<Entity> {
        if hydration.is_eager() {
            return RelationshipLoader::get_entity_with_attributes(conn, lookup);
        }
        let sql = format!(
            "SELECT entities.id, entities.name, entities.slug FROM entities WHERE {}",
            lookup.predicate(LookupTable::Entities)
        );
        conn.query_row(&sql, [lookup_param(lookup)], |row| {
            Ok(Entity::new(row.get(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })
        .optional()
        .map_err(in_op("get_entity"))?
        .ok_or_else(|| {
            not_found(
                "get_entity",
                EavError::EntityNotFound {
                    selector: lookup.to_string(),
                },
            )
        })
    }

    pub fn list_entities(conn: &Connection, hydration: Hydration) -> Result<Vec<Entity>> {
        if hydration.is_eager() {
            return RelationshipLoader::list_entities_with_attributes(conn);
        }
        let mut stmt = conn
            .prepare("SELECT id, name, slug FROM entities ORDER BY id")
            .map_err(in_op("list_entities"))?;
        let entities = stmt
            .query_map([], |row| {
                Ok(Entity::new(row.get(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            })
            .map_err(in_op("list_entities"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(in_op("list_entities"))?;
        Ok(entities)
    }

    // ===== Attributes =====

    pub fn create_attribute(
        conn: &Connection,
        name: &str,
        slug: &str,
        attribute_type: AttributeType,
    ) -> Result<Attribute> {
        let id: i64 = conn
            .query_row(
                "INSERT INTO attributes (name, slug, type) VALUES (?1, ?2, ?3) RETURNING id",
                params![name, slug, attribute_type.as_str()],
                |row| row.get(0),
            )
            .map_err(in_op("create_attribute"))?;
        tracing::debug!(
            attribute_id = id,
            slug,
            attribute_type = attribute_type.as_str(),
            "attribute created"
        );
        Ok(Attribute::new(id, name, slug, attribute_type))
    }

    pub fn update_attribute_name(conn: &Connection, id: i64, name: &str) -> Result<()> {
        let changed = conn
            .execute(
                "UPDATE attributes SET name = ?2 WHERE id = ?1",
                params![id, name],
            )
            .map_err(in_op("update_attribute_name"))?;
        if changed == 0 {
            return Err(attribute_not_found("update_attribute_name", id));
        }
        Ok(())
    }

    pub fn update_attribute_slug(conn: &Connection, id: i64, slug: &str) -> Result<()> {
        let changed = conn
            .execute(
                "UPDATE attributes SET slug = ?2 WHERE id = ?1",
                params![id, slug],
            )
            .map_err(in_op("update_attribute_slug"))?;
        if changed == 0 {
            return Err(attribute_not_found("update_attribute_slug", id));
        }
        Ok(())
    }

    /// Change the declared type
    ///
    /// Existing values are not converted; values written under the old type
    /// may no longer decode.
    pub fn update_attribute_type(
        conn: &Connection,
        id: i64,
        attribute_type: AttributeType,
    ) -> Result<()> {
        let changed = conn
            .execute(
                "UPDATE attributes SET type = ?2 WHERE id = ?1",
                params![id, attribute_type.as_str()],
            )
            .map_err(in_op("update_attribute_type"))?;
        if changed == 0 {
            return Err(attribute_not_found("update_attribute_type", id));
        }
        Ok(())
    }

    /// Delete the attribute row only
    ///
    /// Links and values are not cascaded. With foreign keys on, a referenced
    /// attribute fails with `Conflict`; with them off, the delete succeeds
    /// and leaves orphaned rows behind.
    pub fn delete_attribute(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn
            .execute("DELETE FROM attributes WHERE id = ?1", [id])
            .map_err(in_op("delete_attribute"))?;
        if changed == 0 {
            return Err(attribute_not_found("delete_attribute", id));
        }
        tracing::debug!(attribute_id = id, "attribute deleted");
        Ok(())
    }

    pub fn get_attribute(
        conn: &Connection,
        lookup: &Lookup,
        hydration: Hydration,
    ) -> Result<Attribute> {
        if hydration.is_eager() {
            return RelationshipLoader::get_attribute_with_entities(conn, lookup);
        }
        let sql = format!(
            "SELECT attributes.id, attributes.name, attributes.slug, attributes.type
             FROM attributes WHERE {}",
            lookup.predicate(LookupTable::Attributes)
        );
        let (id, name, slug, tag) = conn
            .query_row(&sql, [lookup_param(lookup)], attribute_row)
            .optional()
            .map_err(in_op("get_attribute"))?
            .ok_or_else(|| {
                not_found(
                    "get_attribute",
                    EavError::AttributeNotFound {
                        selector: lookup.to_string(),
                    },
                )
            })?;
        let attribute_type = parse_stored_type("get_attribute", id, &tag)?;
        Ok(Attribute::new(id, name, slug, attribute_type))
    }

    pub fn list_attributes(conn: &Connection, hydration: Hydration) -> Result<Vec<Attribute>> {
        if hydration.is_eager() {
            return RelationshipLoader::list_attributes_with_entities(conn);
        }
        let mut stmt = conn
            .prepare("SELECT id, name, slug, type FROM attributes ORDER BY id")
            .map_err(in_op("list_attributes"))?;
        let rows = stmt
            .query_map([], attribute_row)
            .map_err(in_op("list_attributes"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(in_op("list_attributes"))?;

        rows.into_iter()
            .map(|(id, name, slug, tag)| {
                let attribute_type = parse_stored_type("list_attributes", id, &tag)?;
                Ok(Attribute::new(id, name, slug, attribute_type))
            })
            .collect()
    }

    // ===== Links =====

    /// Link an attribute to an entity
    ///
    /// A second link for the same pair fails with `Conflict`.
    pub fn link(
        conn: &Connection,
        entity_id: i64,
        attribute_id: i64,
        required: bool,
    ) -> Result<EntityAttributeLink> {
        conn.execute(
            "INSERT INTO entity_attribute (entity_id, attribute_id, required) VALUES (?1, ?2, ?3)",
            params![entity_id, attribute_id, required],
        )
        .map_err(|e| {
            in_op("link")(e)
                .with_entity_id(entity_id)
                .with_attribute_id(attribute_id)
        })?;
        tracing::debug!(entity_id, attribute_id, required, "attribute linked");
        Ok(EntityAttributeLink {
            entity_id,
            attribute_id,
            required,
        })
    }

    pub fn get_link(
        conn: &Connection,
        entity_id: i64,
        attribute_id: i64,
    ) -> Result<EntityAttributeLink> {
        let required: bool = conn
            .query_row(
                "SELECT required FROM entity_attribute WHERE entity_id = ?1 AND attribute_id = ?2",
                params![entity_id, attribute_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(in_op("get_link"))?
            .ok_or_else(|| {
                not_found(
                    "get_link",
                    EavError::LinkNotFound {
                        entity_id,
                        attribute_id,
                    },
                )
            })?;
        Ok(EntityAttributeLink {
            entity_id,
            attribute_id,
            required,
        })
    }

    pub fn unlink(conn: &Connection, entity_id: i64, attribute_id: i64) -> Result<()> {
        let changed = conn
            .execute(
                "DELETE FROM entity_attribute WHERE entity_id = ?1 AND attribute_id = ?2",
                params![entity_id, attribute_id],
            )
            .map_err(in_op("unlink"))?;
        if changed == 0 {
            return Err(not_found(
                "unlink",
                EavError::LinkNotFound {
                    entity_id,
                    attribute_id,
                },
            ));
        }
        Ok(())
    }

    /// Remove every link of an entity; returns the number removed
    pub fn unlink_by_entity(conn: &Connection, entity_id: i64) -> Result<usize> {
        let removed = conn
            .execute(
                "DELETE FROM entity_attribute WHERE entity_id = ?1",
                [entity_id],
            )
            .map_err(in_op("unlink_by_entity"))?;
        tracing::debug!(entity_id, row_count = removed, "links removed");
        Ok(removed)
    }

    /// Remove every link of an attribute; returns the number removed
    pub fn unlink_by_attribute(conn: &Connection, attribute_id: i64) -> Result<usize> {
        let removed = conn
            .execute(
                "DELETE FROM entity_attribute WHERE attribute_id = ?1",
                [attribute_id],
            )
            .map_err(in_op("unlink_by_attribute"))?;
        tracing::debug!(attribute_id, row_count = removed, "links removed");
        Ok(removed)
    }

    pub fn set_required(
        conn: &Connection,
        entity_id: i64,
        attribute_id: i64,
        required: bool,
    ) -> Result<()> {
        let changed = conn
            .execute(
                "UPDATE entity_attribute SET required = ?3 WHERE entity_id = ?1 AND attribute_id = ?2",
                params![entity_id, attribute_id, required],
            )
            .map_err(in_op("set_required"))?;
        if changed == 0 {
            return Err(not_found(
                "set_required",
                EavError::LinkNotFound {
                    entity_id,
                    attribute_id,
                },
            ));
        }
        Ok(())
    }

    // ===== Definitions =====

    /// Save an entity definition in one transaction
    ///
    /// Creates the entity and every new attribute, then links each attribute
    /// with its required flag. The returned entity has its attributes loaded,
    /// ordered by attribute id as an eager get would return them.
    ///
    /// ## Errors
    ///
    /// - `Conflict`: a slug is taken, or the draft names an attribute twice
    /// - `NotFound`: an existing attribute does not resolve
    ///
    /// Nothing is written on error once `tx` is rolled back.
    pub fn save_entity(tx: &Transaction<'_>, draft: &EntityDraft) -> Result<Entity> {
        let entity = Self::create_entity(tx, &draft.name, &draft.slug)?;

        let mut linked = Vec::with_capacity(draft.links().len());
        for link in draft.links() {
            let attribute = match &link.attribute {
                DraftAttribute::Existing(lookup) => {
                    Self::get_attribute(tx, lookup, Hydration::Lazy)?
                }
                DraftAttribute::New {
                    name,
                    slug,
                    attribute_type,
                } => Self::create_attribute(tx, name, slug, *attribute_type)?,
            };
            Self::link(tx, entity.id, attribute.id, link.required)?;
            linked.push(LinkedAttribute {
                id: attribute.id,
                name: attribute.name,
                slug: attribute.slug,
                attribute_type: attribute.attribute_type,
                required: link.required,
            });
        }
        linked.sort_by_key(|a| a.id);

        tracing::debug!(
            entity_id = entity.id,
            row_count = linked.len(),
            "entity definition saved"
        );
        Ok(Entity::with_attributes(
            entity.id,
            entity.name,
            entity.slug,
            linked,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::apply_migrations;
    use eavstore_core::ExErrorKind;

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", true).unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_get_entity_by_id_and_slug() {
        let conn = setup();
        let book = SchemaRegistry::create_entity(&conn, "Book", "book").unwrap();

        let by_id = SchemaRegistry::get_entity(&conn, &Lookup::Id(book.id), Hydration::Lazy).unwrap();
        let by_slug =
            SchemaRegistry::get_entity(&conn, &Lookup::Slug("book".into()), Hydration::Lazy)
                .unwrap();
        assert_eq!(by_id, by_slug);
        assert_eq!(by_id.name, "Book");
        assert!(!by_id.attributes().is_loaded());
    }

    #[test]
    fn test_missing_entity_is_not_found() {
        let conn = setup();
        let err = SchemaRegistry::get_entity(&conn, &Lookup::Id(99), Hydration::Lazy).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);

        let err = SchemaRegistry::update_entity_name(&conn, 99, "Nope").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
        assert_eq!(err.entity_id(), Some(99));
    }

    #[test]
    fn test_update_attribute_fields_touch_attributes_table() {
        let conn = setup();
        SchemaRegistry::create_entity(&conn, "Book", "book").unwrap();
        let attr =
            SchemaRegistry::create_attribute(&conn, "Pages", "pages", AttributeType::Int).unwrap();

        SchemaRegistry::update_attribute_name(&conn, attr.id, "Page count").unwrap();
        SchemaRegistry::update_attribute_slug(&conn, attr.id, "page-count").unwrap();
        SchemaRegistry::update_attribute_type(&conn, attr.id, AttributeType::Uint16).unwrap();

        let reloaded =
            SchemaRegistry::get_attribute(&conn, &Lookup::Id(attr.id), Hydration::Lazy).unwrap();
        assert_eq!(reloaded.name, "Page count");
        assert_eq!(reloaded.slug, "page-count");
        assert_eq!(reloaded.attribute_type, AttributeType::Uint16);

        let book = SchemaRegistry::get_entity(&conn, &Lookup::Slug("book".into()), Hydration::Lazy)
            .unwrap();
        assert_eq!(book.name, "Book");
    }

    #[test]
    fn test_set_required_flips_flag() {
        let conn = setup();
        let book = SchemaRegistry::create_entity(&conn, "Book", "book").unwrap();
        let title =
            SchemaRegistry::create_attribute(&conn, "Title", "title", AttributeType::String)
                .unwrap();
        SchemaRegistry::link(&conn, book.id, title.id, false).unwrap();

        SchemaRegistry::set_required(&conn, book.id, title.id, true).unwrap();
        assert!(SchemaRegistry::get_link(&conn, book.id, title.id).unwrap().required);

        let err = SchemaRegistry::set_required(&conn, book.id, title.id + 1, true).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[test]
    fn test_stored_type_outside_vocabulary_is_invalid() {
        let err = parse_stored_type("get_attribute", 3, "decimal").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
        assert_eq!(err.attribute_id(), Some(3));
    }
}
