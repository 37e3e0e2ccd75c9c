// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Operations on a tree's node forest.
//!
//! Invariants maintained here:
//! - roots have level 0, every child has `parent.level + 1`
//! - no level exceeds [`MAX_LEVEL`]
//! - node ids are unique within one tree
//! - `parent_id` names the enclosing node (roots have none)

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::item::Node;

/// Deepest allowed node level.
pub const MAX_LEVEL: u8 = 5;

/// Checks level and uniqueness invariants for a whole forest.
pub fn validate_forest(nodes: &[Node]) -> Result<()> {
    let mut seen = HashSet::new();
    validate_level(nodes, 0, &mut seen)
}

fn validate_level<'a>(nodes: &'a [Node], expected: u8, seen: &mut HashSet<&'a str>) -> Result<()> {
    for node in nodes {
        if node.level > MAX_LEVEL {
            return Err(Error::InvalidNodeLevel {
                node_id: node.id.clone(),
                level: node.level,
                max: MAX_LEVEL,
            });
        }
        if node.level != expected {
            return Err(Error::LevelMismatch {
                node_id: node.id.clone(),
                expected,
                actual: node.level,
            });
        }
        if !seen.insert(node.id.as_str()) {
            return Err(Error::DuplicateId(node.id.clone()));
        }
        validate_level(&node.children, expected.saturating_add(1), seen)?;
    }
    Ok(())
}

/// Rewrites every `parent_id` from the actual nesting.
///
/// Returns the number of nodes whose parent reference changed.
pub fn relink_parents(nodes: &mut [Node]) -> usize {
    relink(nodes, None)
}

fn relink(nodes: &mut [Node], parent: Option<&str>) -> usize {
    let mut fixed = 0;
    for node in nodes {
        if node.parent_id.as_deref() != parent {
            node.parent_id = parent.map(str::to_string);
            fixed += 1;
        }
        let id = node.id.clone();
        fixed += relink(&mut node.children, Some(&id));
    }
    fixed
}

/// Counts nodes at every depth.
pub fn count_nodes(nodes: &[Node]) -> usize {
    nodes.iter().map(|n| 1 + count_nodes(&n.children)).sum()
}

/// Finds a node anywhere in the forest.
pub fn find_node<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_node_mut<'a>(nodes: &'a mut [Node], id: &str) -> Option<&'a mut Node> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Attaches `node` as a root or under `parent_id`.
///
/// The node's level and parent reference are set from its position; its
/// own children are discarded.
pub fn add_node(nodes: &mut Vec<Node>, parent_id: Option<&str>, mut node: Node) -> Result<()> {
    if find_node(nodes, &node.id).is_some() {
        return Err(Error::DuplicateId(node.id));
    }
    node.children.clear();

    let Some(parent_id) = parent_id else {
        node.level = 0;
        node.parent_id = None;
        nodes.push(node);
        return Ok(());
    };

    let parent = find_node_mut(nodes, parent_id)
        .ok_or_else(|| Error::NodeNotFound(parent_id.to_string()))?;
    let level = parent.level.saturating_add(1);
    if level > MAX_LEVEL {
        return Err(Error::InvalidNodeLevel {
            node_id: node.id,
            level,
            max: MAX_LEVEL,
        });
    }
    node.level = level;
    node.parent_id = Some(parent.id.clone());
    parent.children.push(node);
    Ok(())
}

/// Detaches a node (with its subtree) from the forest.
pub fn remove_node(nodes: &mut Vec<Node>, id: &str) -> Option<Node> {
    if let Some(pos) = nodes.iter().position(|n| n.id == id) {
        return Some(nodes.remove(pos));
    }
    nodes
        .iter_mut()
        .find_map(|n| remove_node(&mut n.children, id))
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
