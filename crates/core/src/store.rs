// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The local item store consumed by sync.
//!
//! The store exclusively owns the tree and note collections. Sync reads
//! snapshots through [`Store::all_items`] and only writes when applying a
//! restore, via [`apply_restore`].

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::item::{Item, ItemKind, Note, Tree};
use crate::merge::{Merge, MergeOutcome};

/// Callback invoked after a collection changed.
pub type ChangeListener = Box<dyn Fn(ItemKind) + Send + Sync>;

/// Access to the authoritative local dataset.
pub trait Store: Send + Sync {
    /// Returns a snapshot of one collection.
    fn all_items(&self, kind: ItemKind) -> Result<Vec<Item>>;

    /// Replaces a whole collection. Every item must be of `kind`.
    fn replace_all(&self, kind: ItemKind, items: Vec<Item>) -> Result<()>;

    /// Inserts an item, or replaces the item with the same id.
    fn upsert(&self, item: Item) -> Result<()>;

    /// Registers a listener called after every mutation.
    fn on_change(&self, listener: ChangeListener);

    fn trees(&self) -> Result<Vec<Tree>> {
        Ok(self
            .all_items(ItemKind::Tree)?
            .into_iter()
            .filter_map(|item| match item {
                Item::Tree(tree) => Some(tree),
                Item::Note(_) => None,
            })
            .collect())
    }

    fn notes(&self) -> Result<Vec<Note>> {
        Ok(self
            .all_items(ItemKind::Note)?
            .into_iter()
            .filter_map(|item| match item {
                Item::Note(note) => Some(note),
                Item::Tree(_) => None,
            })
            .collect())
    }

    /// Returns both collections as of one instant.
    ///
    /// The default reads each collection separately; stores that can be
    /// mutated concurrently override it to read both under one lock.
    fn dataset(&self) -> Result<Dataset> {
        Ok(Dataset {
            trees: self.trees()?,
            notes: self.notes()?,
        })
    }
}

/// How restored items are combined with local ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    /// Overwrite matching ids, append the rest, keep local-only items.
    #[default]
    Merge,
    /// Discard local collections entirely.
    Replace,
}

/// Writes restored collections into a store.
///
/// A collection is only written when it changed; with [`ApplyMode::Replace`]
/// both collections are always written.
pub fn apply_restore(
    store: &dyn Store,
    trees: Vec<Tree>,
    notes: Vec<Note>,
    mode: ApplyMode,
) -> Result<MergeOutcome> {
    match mode {
        ApplyMode::Replace => {
            let outcome = MergeOutcome {
                inserted: trees.len() + notes.len(),
                updated: 0,
            };
            store.replace_all(ItemKind::Tree, trees.into_iter().map(Item::from).collect())?;
            store.replace_all(ItemKind::Note, notes.into_iter().map(Item::from).collect())?;
            Ok(outcome)
        }
        ApplyMode::Merge => {
            let mut outcome = MergeOutcome::default();
            if !trees.is_empty() {
                let mut local = store.trees()?;
                outcome = outcome + local.merge_all(trees);
                store.replace_all(ItemKind::Tree, local.into_iter().map(Item::from).collect())?;
            }
            if !notes.is_empty() {
                let mut local = store.notes()?;
                outcome = outcome + local.merge_all(notes);
                store.replace_all(ItemKind::Note, local.into_iter().map(Item::from).collect())?;
            }
            Ok(outcome)
        }
    }
}

/// Both collections, in the shape persisted by file-backed stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Dataset {
    pub fn items(&self, kind: ItemKind) -> Vec<Item> {
        match kind {
            ItemKind::Tree => self.trees.iter().cloned().map(Item::from).collect(),
            ItemKind::Note => self.notes.iter().cloned().map(Item::from).collect(),
        }
    }

    /// Replaces one collection; on a kind mismatch nothing changes.
    pub fn replace(&mut self, kind: ItemKind, items: Vec<Item>) -> Result<()> {
        match kind {
            ItemKind::Tree => {
                self.trees = items
                    .into_iter()
                    .map(|item| match item {
                        Item::Tree(tree) => Ok(tree),
                        other => Err(kind_mismatch(kind, &other)),
                    })
                    .collect::<Result<_>>()?;
            }
            ItemKind::Note => {
                self.notes = items
                    .into_iter()
                    .map(|item| match item {
                        Item::Note(note) => Ok(note),
                        other => Err(kind_mismatch(kind, &other)),
                    })
                    .collect::<Result<_>>()?;
            }
        }
        Ok(())
    }

    pub fn upsert(&mut self, item: Item) {
        match item {
            Item::Tree(tree) => upsert_by_id(&mut self.trees, tree, |t| &t.id),
            Item::Note(note) => upsert_by_id(&mut self.notes, note, |n| &n.id),
        }
    }

    pub fn find_tree_mut(&mut self, id: &str) -> Option<&mut Tree> {
        self.trees.iter_mut().find(|t| t.id == id)
    }
}

fn kind_mismatch(expected: ItemKind, item: &Item) -> Error {
    Error::InvalidKind(format!(
        "{} '{}' in {} collection",
        item.kind(),
        item.id(),
        expected
    ))
}

fn upsert_by_id<T>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> &String) {
    match items.iter().position(|existing| id(existing) == id(&item)) {
        Some(index) => items[index] = item,
        None => items.push(item),
    }
}

/// An in-memory store, used when nothing needs persisting.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Dataset>,
    listeners: Mutex<Vec<ChangeListener>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: Dataset) -> Self {
        MemoryStore {
            data: Mutex::new(data),
            listeners: Mutex::new(Vec::new()),
        }
    }

    fn notify(&self, kind: ItemKind) {
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        for listener in listeners.iter() {
            listener(kind);
        }
    }
}

impl Store for MemoryStore {
    fn all_items(&self, kind: ItemKind) -> Result<Vec<Item>> {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        Ok(data.items(kind))
    }

    fn dataset(&self) -> Result<Dataset> {
        Ok(self.data.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn replace_all(&self, kind: ItemKind, items: Vec<Item>) -> Result<()> {
        self.data
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(kind, items)?;
        self.notify(kind);
        Ok(())
    }

    fn upsert(&self, item: Item) -> Result<()> {
        let kind = item.kind();
        self.data
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .upsert(item);
        self.notify(kind);
        Ok(())
    }

    fn on_change(&self, listener: ChangeListener) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(listener);
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
