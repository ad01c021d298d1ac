//! Engine-level commands applied inside a caller-owned transaction.

use crate::commands::item::{self, ItemCreated, ItemView, SetMode};
use crate::commands::schema::{self, Retired};
use eavstore_core::{
    Attribute, Entity, EntityAttributeLink, EntityDraft, ItemAttributeValue, Lookup,
    UnparsablePolicy,
};
use eavstore_store::errors::Result;
use rusqlite::Transaction;

/// Commands a process entry point can dispatch.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    EntityCreate {
        name: String,
        slug: String,
    },
    EntityDefine {
        draft: EntityDraft,
    },
    AttributeCreate {
        name: String,
        slug: String,
        type_tag: String,
    },
    Link {
        entity: String,
        attribute: String,
        required: bool,
    },
    SetRequired {
        entity: String,
        attribute: String,
        required: bool,
    },
    Unlink {
        entity: String,
        attribute: String,
    },
    AttributeRetire {
        attribute_id: i64,
    },
    EntityRetire {
        entity_id: i64,
    },
    ItemCreate {
        entity: Lookup,
    },
    ItemSetValue {
        item_id: i64,
        attribute: Lookup,
        raw: String,
        mode: SetMode,
        policy: UnparsablePolicy,
    },
    ItemUnsetValue {
        item_id: i64,
        attribute: Lookup,
    },
    ItemDescribe {
        item_id: i64,
    },
    ItemList,
    ItemChangeEntity {
        item_id: i64,
        entity: Lookup,
    },
    ItemDelete {
        item_id: i64,
    },
}

/// Result of applying an engine command.
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    Entity(Entity),
    Attribute(Attribute),
    Link(EntityAttributeLink),
    Retired(Retired),
    Item(ItemCreated),
    Value(ItemAttributeValue),
    Described(ItemView),
    Listed(Vec<ItemView>),
    Done,
}

/// Apply one command. The caller commits or rolls back `tx`.
pub fn apply_engine_command(
    cmd: EngineCommand,
    tx: &Transaction<'_>,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::EntityCreate { name, slug } => {
            schema::entity_create(tx, &name, &slug).map(EngineCommandResult::Entity)
        }
        EngineCommand::EntityDefine { draft } => {
            schema::entity_define(tx, &draft).map(EngineCommandResult::Entity)
        }
        EngineCommand::AttributeCreate {
            name,
            slug,
            type_tag,
        } => schema::attribute_create(tx, &name, &slug, &type_tag)
            .map(EngineCommandResult::Attribute),
        EngineCommand::Link {
            entity,
            attribute,
            required,
        } => schema::link_by_slug(tx, &entity, &attribute, required)
            .map(EngineCommandResult::Link),
        EngineCommand::SetRequired {
            entity,
            attribute,
            required,
        } => schema::set_required_by_slug(tx, &entity, &attribute, required)
            .map(EngineCommandResult::Link),
        EngineCommand::Unlink { entity, attribute } => {
            schema::unlink_by_slug(tx, &entity, &attribute).map(|()| EngineCommandResult::Done)
        }
        EngineCommand::AttributeRetire { attribute_id } => {
            schema::attribute_retire(tx, attribute_id).map(EngineCommandResult::Retired)
        }
        EngineCommand::EntityRetire { entity_id } => {
            schema::entity_retire(tx, entity_id).map(EngineCommandResult::Retired)
        }
        EngineCommand::ItemCreate { entity } => {
            item::item_create(tx, &entity).map(EngineCommandResult::Item)
        }
        EngineCommand::ItemSetValue {
            item_id,
            attribute,
            raw,
            mode,
            policy,
        } => item::item_set_value(tx, item_id, &attribute, &raw, mode, policy)
            .map(EngineCommandResult::Value),
        EngineCommand::ItemUnsetValue { item_id, attribute } => {
            item::item_unset_value(tx, item_id, &attribute).map(|()| EngineCommandResult::Done)
        }
        EngineCommand::ItemDescribe { item_id } => {
            item::item_describe(tx, item_id).map(EngineCommandResult::Described)
        }
        EngineCommand::ItemList => item::item_list(tx).map(EngineCommandResult::Listed),
        EngineCommand::ItemChangeEntity { item_id, entity } => {
            item::item_change_entity(tx, item_id, &entity).map(EngineCommandResult::Item)
        }
        EngineCommand::ItemDelete { item_id } => {
            item::item_delete(tx, item_id).map(|()| EngineCommandResult::Done)
        }
    }
}
