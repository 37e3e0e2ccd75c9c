// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};

use kt_core::node::{add_node, count_nodes, find_node, remove_node};
use kt_core::Node;

use crate::cli::NodeCommand;
use crate::error::{Error, Result};
use crate::id::{unique_id, IdKind};
use crate::store::FileStore;

use super::open_workspace;

/// Execute a node subcommand.
pub fn run(cmd: NodeCommand) -> Result<()> {
    match cmd {
        NodeCommand::Add {
            tree_id,
            title,
            parent,
        } => {
            let workspace = open_workspace()?;
            let node = add(
                &workspace.store,
                &tree_id,
                &title,
                parent.as_deref(),
                Utc::now(),
            )?;
            println!(
                "Added node {} to {} at level {}",
                node.id, tree_id, node.level
            );
        }
        NodeCommand::Remove { tree_id, node_id } => {
            let workspace = open_workspace()?;
            let removed = remove(&workspace.store, &tree_id, &node_id, Utc::now())?;
            println!("Removed {} nodes from {}", removed, tree_id);
        }
    }
    Ok(())
}

/// Adds a node titled `title` to a tree, as a root or under `parent`.
pub(crate) fn add(
    store: &FileStore,
    tree_id: &str,
    title: &str,
    parent: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Node> {
    let title = title.trim();
    let mut created = None;

    let found = store.update_tree(tree_id, |tree| {
        let id = unique_id(IdKind::Node, title, &now, |candidate| {
            find_node(&tree.nodes, candidate).is_some()
        });
        add_node(&mut tree.nodes, parent, Node::root(id.clone(), title))?;
        tree.updated_at = now;
        created = find_node(&tree.nodes, &id).cloned();
        Ok(())
    })?;

    if !found {
        return Err(Error::TreeNotFound(tree_id.to_string()));
    }
    created.ok_or_else(|| Error::TreeNotFound(tree_id.to_string()))
}

/// Removes a node with its subtree. Returns the number of nodes removed.
pub(crate) fn remove(
    store: &FileStore,
    tree_id: &str,
    node_id: &str,
    now: DateTime<Utc>,
) -> Result<usize> {
    let mut removed = 0;
    let found = store.update_tree(tree_id, |tree| {
        let node = remove_node(&mut tree.nodes, node_id)
            .ok_or_else(|| kt_core::Error::NodeNotFound(node_id.to_string()))?;
        removed = count_nodes(std::slice::from_ref(&node));
        tree.updated_at = now;
        Ok(())
    })?;

    if !found {
        return Err(Error::TreeNotFound(tree_id.to_string()));
    }
    Ok(removed)
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
