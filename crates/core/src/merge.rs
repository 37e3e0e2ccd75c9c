// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Merge incoming backup items into a local collection.
//!
//! Merge rule (last-write-wins, no timestamps):
//! - an incoming item whose id exists locally overwrites every field of the
//!   local item except the id; unknown fields present only locally survive
//! - an incoming item with a new id is appended
//!
//! Timestamps are never compared. When both sides edited the same item,
//! whatever was applied last wins and the other side's changes are lost.

use crate::item::{Note, Tree};

/// Items with a stable identity that can be overwritten in place.
pub trait Identified {
    fn id(&self) -> &str;

    /// Replaces every field except the id with `incoming`'s values.
    fn overwrite_from(&mut self, incoming: Self);
}

impl Identified for Tree {
    fn id(&self) -> &str {
        &self.id
    }

    fn overwrite_from(&mut self, incoming: Self) {
        let Tree {
            id: _,
            name,
            description,
            category,
            nodes,
            created_at,
            updated_at,
            extra,
        } = incoming;
        self.name = name;
        self.description = description;
        self.category = category;
        self.nodes = nodes;
        self.created_at = created_at;
        self.updated_at = updated_at;
        self.extra.extend(extra);
    }
}

impl Identified for Note {
    fn id(&self) -> &str {
        &self.id
    }

    fn overwrite_from(&mut self, incoming: Self) {
        let Note {
            id: _,
            name,
            content,
            category,
            created_at,
            updated_at,
            extra,
        } = incoming;
        self.name = name;
        self.content = content;
        self.category = category;
        self.created_at = created_at;
        self.updated_at = updated_at;
        self.extra.extend(extra);
    }
}

/// Counts reported after a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Items appended because their id was new.
    pub inserted: usize,
    /// Local items overwritten by an incoming item with the same id.
    pub updated: usize,
}

impl MergeOutcome {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

impl std::ops::Add for MergeOutcome {
    type Output = MergeOutcome;

    fn add(self, rhs: MergeOutcome) -> MergeOutcome {
        MergeOutcome {
            inserted: self.inserted + rhs.inserted,
            updated: self.updated + rhs.updated,
        }
    }
}

/// Trait for applying incoming items with last-write-wins resolution.
pub trait Merge<T: Identified> {
    /// Applies one item. Returns true if it replaced an existing item.
    fn merge_item(&mut self, incoming: T) -> bool;

    /// Applies items in order.
    fn merge_all(&mut self, incoming: Vec<T>) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        for item in incoming {
            if self.merge_item(item) {
                outcome.updated += 1;
            } else {
                outcome.inserted += 1;
            }
        }
        outcome
    }
}

impl<T: Identified> Merge<T> for Vec<T> {
    fn merge_item(&mut self, incoming: T) -> bool {
        match self.iter().position(|existing| existing.id() == incoming.id()) {
            Some(index) => {
                self[index].overwrite_from(incoming);
                true
            }
            None => {
                self.push(incoming);
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
