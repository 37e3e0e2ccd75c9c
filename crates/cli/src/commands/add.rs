// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use kt_core::item::validate_name;
use kt_core::{Category, Item, ItemKind, Note, Store, Tree};

use crate::cli::KindArg;
use crate::error::{Error, Result};
use crate::id::{unique_id, IdKind};

use super::open_workspace;

/// Fields of a new item as given on the command line.
pub(crate) struct NewItem {
    pub kind: ItemKind,
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
    pub content: Option<String>,
}

pub fn run(
    kind: KindArg,
    name: String,
    category: Category,
    description: Option<String>,
    content: Option<String>,
) -> Result<()> {
    let workspace = open_workspace()?;
    let new = NewItem {
        kind: kind.into(),
        name,
        category,
        description,
        content,
    };
    let item = run_impl(workspace.store.as_ref(), new, Utc::now())?;

    let label = match item.kind() {
        ItemKind::Tree => "tree",
        ItemKind::Note => "note",
    };
    println!("Created {} {}: {}", label, item.id(), item.name());
    Ok(())
}

/// Validates and stores a new item, returning it with its generated id.
pub(crate) fn run_impl(store: &dyn Store, new: NewItem, now: DateTime<Utc>) -> Result<Item> {
    validate_name(&new.name)?;
    let name = new.name.trim();

    let item = match new.kind {
        ItemKind::Tree => {
            if new.content.is_some() {
                return Err(Error::InvalidValue {
                    key: "--content".to_string(),
                    reason: "only notes have content, use --description".to_string(),
                });
            }
            let id = fresh_id(store, ItemKind::Tree, IdKind::Tree, name, now)?;
            let mut tree = Tree::new(id, name, new.category, now);
            tree.description = new.description.unwrap_or_default();
            Item::Tree(tree)
        }
        ItemKind::Note => {
            if new.description.is_some() {
                return Err(Error::InvalidValue {
                    key: "--description".to_string(),
                    reason: "only trees have a description, use --content".to_string(),
                });
            }
            let id = fresh_id(store, ItemKind::Note, IdKind::Note, name, now)?;
            let mut note = Note::new(id, name, new.category, now);
            note.content = new.content.unwrap_or_default();
            Item::Note(note)
        }
    };

    store.upsert(item.clone())?;
    Ok(item)
}

fn fresh_id(
    store: &dyn Store,
    kind: ItemKind,
    id_kind: IdKind,
    name: &str,
    now: DateTime<Utc>,
) -> Result<String> {
    let taken: HashSet<String> = store
        .all_items(kind)?
        .iter()
        .map(|item| item.id().to_string())
        .collect();
    Ok(unique_id(id_kind, name, &now, |candidate| {
        taken.contains(candidate)
    }))
}

#[cfg(test)]
#[path = "add_tests.rs"]
mod tests;
