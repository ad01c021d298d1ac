// Integration tests for saving entity definitions

mod common;

use common::{attribute, count_rows, entity, setup_test_db};
use eavstore_core::{AttributeType, DraftAttribute, EntityDraft, ExErrorKind, Hydration, Lookup};
use eavstore_store::repo::SchemaRegistry;

#[test]
fn test_save_entity_creates_new_and_reuses_existing_attributes() {
    // Given: A registry that already holds a "released" date attribute
    let mut conn = setup_test_db();
    let released = attribute(&conn, "Released", "released", AttributeType::Date);

    // When: Book is saved with a new required Title and the existing Released
    let draft = EntityDraft::new("Book", "book")
        .with_required_attribute(DraftAttribute::new("Title", "title", AttributeType::String))
        .with_attribute(Lookup::Slug("released".to_string()));
    let tx = conn.transaction().unwrap();
    let book = SchemaRegistry::save_entity(&tx, &draft).unwrap();
    tx.commit().unwrap();

    // Then: Only the new attribute was created
    assert_eq!(count_rows(&conn, "attributes"), 2);
    assert_eq!(count_rows(&conn, "entity_attribute"), 2);

    // And: The returned entity has its attributes loaded, ordered by id
    let linked = book.attributes().get().unwrap();
    assert_eq!(linked.len(), 2);
    assert_eq!(linked[0].id, released.id);
    assert!(!linked[0].required);
    assert_eq!(linked[1].slug, "title");
    assert_eq!(linked[1].attribute_type, AttributeType::String);
    assert!(linked[1].required);

    // And: It matches what an eager get reads back
    let stored = SchemaRegistry::get_entity(&conn, &Lookup::Id(book.id), Hydration::Eager).unwrap();
    assert_eq!(stored, book);
}

#[test]
fn test_save_entity_without_attributes() {
    let mut conn = setup_test_db();
    let tx = conn.transaction().unwrap();
    let author = SchemaRegistry::save_entity(&tx, &EntityDraft::new("Author", "author")).unwrap();
    tx.commit().unwrap();

    assert_eq!(author.attributes().get(), Some(&[][..]));
    assert_eq!(count_rows(&conn, "entities"), 1);
}

#[test]
fn test_save_entity_rolls_back_on_missing_attribute() {
    // Given: A draft naming an attribute that does not exist
    let mut conn = setup_test_db();
    let draft = EntityDraft::new("Book", "book")
        .with_required_attribute(DraftAttribute::new("Title", "title", AttributeType::String))
        .with_attribute(Lookup::Slug("isbn".to_string()));

    // When: It is saved and the transaction dropped
    let err = {
        let tx = conn.transaction().unwrap();
        SchemaRegistry::save_entity(&tx, &draft).unwrap_err()
    };

    // Then: NotFound, and neither the entity nor the new attribute remain
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(count_rows(&conn, "entities"), 0);
    assert_eq!(count_rows(&conn, "attributes"), 0);
}

#[test]
fn test_save_entity_with_taken_slug_conflicts() {
    let mut conn = setup_test_db();
    entity(&conn, "Book", "book");

    let tx = conn.transaction().unwrap();
    let err = SchemaRegistry::save_entity(&tx, &EntityDraft::new("Novel", "book")).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Conflict);
}

#[test]
fn test_save_entity_naming_attribute_twice_conflicts() {
    let mut conn = setup_test_db();
    let title = attribute(&conn, "Title", "title", AttributeType::String);
    let draft = EntityDraft::new("Book", "book")
        .with_attribute(Lookup::Id(title.id))
        .with_required_attribute(Lookup::Slug("title".to_string()));

    let tx = conn.transaction().unwrap();
    let err = SchemaRegistry::save_entity(&tx, &draft).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Conflict);
}
