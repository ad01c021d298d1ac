// Integration tests for schema command handlers.
// Covers create, link management and the retire cascades.

mod common;

use common::{book_item, count_rows, seed_book, setup_db};
use eavstore_core::{AttributeType, ExErrorKind, Hydration, Lookup};
use eavstore_engine::commands::schema::{
    attribute_create, attribute_retire, entity_create, entity_retire, link_by_slug,
    set_required_by_slug, unlink_by_slug,
};
use eavstore_store::repo::{RelationshipLoader, SchemaRegistry};

#[test]
fn test_attribute_create_rejects_unknown_tag_before_writing() {
    let (_tmp, conn) = setup_db();

    let err = attribute_create(&conn, "Colour", "colour", "colour").unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(count_rows(&conn, "attributes"), 0);
}

#[test]
fn test_attribute_create_parses_tag() {
    let (_tmp, conn) = setup_db();

    let attribute = attribute_create(&conn, "Pages", "pages", "uint16").unwrap();

    assert_eq!(attribute.attribute_type, AttributeType::Uint16);
}

#[test]
fn test_entity_create_duplicate_slug_conflicts() {
    let (_tmp, conn) = setup_db();
    entity_create(&conn, "Book", "book").unwrap();

    let err = entity_create(&conn, "Novel", "book").unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Conflict);
}

#[test]
fn test_link_accepts_ids_and_slugs() {
    // Given: Book and Title
    let (_tmp, conn) = setup_db();
    let book = entity_create(&conn, "Book", "book").unwrap();
    let title = attribute_create(&conn, "Title", "title", "string").unwrap();

    // When: They are linked by id on one side, slug on the other
    let link = link_by_slug(&conn, &book.id.to_string(), "title", false).unwrap();

    // Then: The link is stored
    assert_eq!(link.attribute_id, title.id);
    let attrs = RelationshipLoader::load_attributes_by_entity(&conn, book.id).unwrap();
    assert_eq!(attrs.len(), 1);
}

#[test]
fn test_link_with_empty_selector_is_invalid() {
    let (_tmp, conn) = setup_db();
    entity_create(&conn, "Book", "book").unwrap();

    let err = link_by_slug(&conn, "book", "  ", false).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_set_required_then_unlink() {
    let (_tmp, conn) = setup_db();
    seed_book(&conn);

    let link = set_required_by_slug(&conn, "book", "released", true).unwrap();
    assert!(link.required);
    let book =
        SchemaRegistry::get_entity(&conn, &Lookup::Slug("book".into()), Hydration::Eager).unwrap();
    assert_eq!(book.required_attributes().unwrap().len(), 2);

    unlink_by_slug(&conn, "book", "released").unwrap();
    let err = unlink_by_slug(&conn, "book", "released").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_attribute_delete_without_retire_conflicts() {
    // Given: Title is linked and has a value
    let (_tmp, conn) = setup_db();
    seed_book(&conn);
    book_item(&conn, "Dune");

    // When: The attribute row is deleted directly
    let err = SchemaRegistry::delete_attribute(&conn, 1).unwrap_err();

    // Then: Foreign keys refuse it and nothing is removed
    assert_eq!(err.kind(), ExErrorKind::Conflict);
    assert_eq!(count_rows(&conn, "entity_attribute"), 2);
    assert_eq!(count_rows(&conn, "item_attribute"), 1);
}

#[test]
fn test_attribute_retire_cascades() {
    // Given: Title is linked and has values on two items
    let (_tmp, mut conn) = setup_db();
    seed_book(&conn);
    book_item(&conn, "Dune");
    book_item(&conn, "Hyperion");

    // When: Title is retired
    let tx = conn.transaction().unwrap();
    let retired = attribute_retire(&tx, 1).unwrap();
    tx.commit().unwrap();

    // Then: Values, link and attribute are gone; Released is untouched
    assert_eq!(retired.values_removed, 2);
    assert_eq!(retired.links_removed, 1);
    assert_eq!(count_rows(&conn, "item_attribute"), 0);
    assert_eq!(count_rows(&conn, "entity_attribute"), 1);
    assert_eq!(count_rows(&conn, "attributes"), 1);
}

#[test]
fn test_attribute_retire_missing_rolls_back() {
    let (_tmp, mut conn) = setup_db();

    let tx = conn.transaction().unwrap();
    let err = attribute_retire(&tx, 42).unwrap_err();
    drop(tx);

    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.attribute_id(), Some(42));
}

#[test]
fn test_entity_retire_with_items_conflicts() {
    // Given: Book has an item
    let (_tmp, mut conn) = setup_db();
    seed_book(&conn);
    book_item(&conn, "Dune");

    // When: Book is retired
    let tx = conn.transaction().unwrap();
    let err = entity_retire(&tx, 1).unwrap_err();
    drop(tx);

    // Then: Conflict, and the rolled-back transaction keeps the links
    assert_eq!(err.kind(), ExErrorKind::Conflict);
    assert_eq!(count_rows(&conn, "entity_attribute"), 2);
}

#[test]
fn test_entity_retire_removes_links() {
    let (_tmp, mut conn) = setup_db();
    seed_book(&conn);

    let tx = conn.transaction().unwrap();
    let retired = entity_retire(&tx, 1).unwrap();
    tx.commit().unwrap();

    assert_eq!(retired.links_removed, 2);
    assert_eq!(count_rows(&conn, "entities"), 0);
    assert_eq!(count_rows(&conn, "attributes"), 2);
}
