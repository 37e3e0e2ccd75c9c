// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core item types for the ktree organizer.
//!
//! This module contains the two item variants (Tree and Note), their
//! shared Category and ItemKind classifications, and the recursive Node
//! forest carried by trees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Maximum length of a tree or note name, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// Topical classification shared by trees and notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Processes, strategy, planning.
    Business,
    /// IT, programming, new technology.
    Technology,
    /// Research, discoveries, theories.
    Science,
    /// Courses and learning material.
    Education,
    /// Personal goals and plans.
    Personal,
    /// Anything else.
    #[default]
    Other,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 6] = [
        Category::Business,
        Category::Technology,
        Category::Science,
        Category::Education,
        Category::Personal,
        Category::Other,
    ];

    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Business => "business",
            Category::Technology => "technology",
            Category::Science => "science",
            Category::Education => "education",
            Category::Personal => "personal",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "business" => Ok(Category::Business),
            "technology" => Ok(Category::Technology),
            "science" => Ok(Category::Science),
            "education" => Ok(Category::Education),
            "personal" => Ok(Category::Personal),
            "other" => Ok(Category::Other),
            _ => Err(Error::InvalidCategory(s.to_string())),
        }
    }
}

/// Which of the two item collections an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Tree,
    Note,
}

impl ItemKind {
    /// Returns the collection name used in backup documents ("trees"/"notes").
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Tree => "trees",
            ItemKind::Note => "notes",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tree" | "trees" => Ok(ItemKind::Tree),
            "note" | "notes" => Ok(ItemKind::Note),
            _ => Err(Error::InvalidKind(s.to_string())),
        }
    }
}

/// A single node in a tree's forest.
///
/// The parent is referenced by id only; ownership flows strictly downward
/// through `children`, so the structure cannot contain cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub title: String,
    /// Depth in the forest, 0 for roots.
    pub level: u8,
    /// Id of the enclosing node, `None` for roots.
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
    /// Fields this crate does not interpret (icon, content, expanded, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// Creates a root node (level 0, no parent).
    pub fn root(id: impl Into<String>, title: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            title: title.into(),
            level: 0,
            parent_id: None,
            children: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Creates a node to be nested under `parent`.
    pub fn child_of(parent: &Node, id: impl Into<String>, title: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            title: title.into(),
            level: parent.level.saturating_add(1),
            parent_id: Some(parent.id.clone()),
            children: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// A knowledge tree: a named, categorized forest of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tree {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub nodes: Vec<Node>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tree {
    /// Creates an empty tree stamped with `now`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        now: DateTime<Utc>,
    ) -> Self {
        Tree {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category,
            nodes: Vec::new(),
            created_at: now,
            updated_at: now,
            extra: Map::new(),
        }
    }
}

/// A free-form note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Note {
    /// Creates an empty note stamped with `now`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        now: DateTime<Utc>,
    ) -> Self {
        Note {
            id: id.into(),
            name: name.into(),
            content: String::new(),
            category,
            created_at: now,
            updated_at: now,
            extra: Map::new(),
        }
    }
}

/// Either kind of item, as exchanged with a [`Store`](crate::store::Store).
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Tree(Tree),
    Note(Note),
}

impl Item {
    pub fn id(&self) -> &str {
        match self {
            Item::Tree(t) => &t.id,
            Item::Note(n) => &n.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Item::Tree(t) => &t.name,
            Item::Note(n) => &n.name,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Item::Tree(t) => t.category,
            Item::Note(n) => n.category,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Tree(_) => ItemKind::Tree,
            Item::Note(_) => ItemKind::Note,
        }
    }
}

impl From<Tree> for Item {
    fn from(tree: Tree) -> Self {
        Item::Tree(tree)
    }
}

impl From<Note> for Item {
    fn from(note: Note) -> Self {
        Item::Note(note)
    }
}

/// Validates a tree or note name (non-blank, at most [`MAX_NAME_LEN`] chars).
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidName("name cannot be empty".to_string()));
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(Error::InvalidName(format!(
            "name too long ({len} chars, max {MAX_NAME_LEN})"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
