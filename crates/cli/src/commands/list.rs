// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt::Write;

use kt_core::node::count_nodes;
use kt_core::{Dataset, ItemKind};

use crate::cli::KindArg;
use crate::error::Result;

use super::open_workspace;

pub fn run(kind: Option<KindArg>) -> Result<()> {
    let workspace = open_workspace()?;
    print!(
        "{}",
        render(&workspace.store.snapshot(), kind.map(ItemKind::from))
    );
    Ok(())
}

/// Renders one section per collection, or only the one asked for.
pub(crate) fn render(data: &Dataset, kind: Option<ItemKind>) -> String {
    let mut out = String::new();
    if kind != Some(ItemKind::Note) {
        let _ = writeln!(out, "Trees ({}):", data.trees.len());
        if data.trees.is_empty() {
            out.push_str("  (none)\n");
        }
        for tree in &data.trees {
            let nodes = count_nodes(&tree.nodes);
            let _ = writeln!(
                out,
                "  {}  {} [{}] ({} node{})",
                tree.id,
                tree.name,
                tree.category,
                nodes,
                if nodes == 1 { "" } else { "s" }
            );
        }
    }
    if kind.is_none() {
        out.push('\n');
    }
    if kind != Some(ItemKind::Tree) {
        let _ = writeln!(out, "Notes ({}):", data.notes.len());
        if data.notes.is_empty() {
            out.push_str("  (none)\n");
        }
        for note in &data.notes {
            let _ = writeln!(out, "  {}  {} [{}]", note.id, note.name, note.category);
        }
    }
    out
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
