// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed item store.
//!
//! The whole dataset lives in `.ktree/data.json` and is rewritten on every
//! mutation via a temporary file and a rename. Other `kt` processes edit
//! the same file, so long-running commands call
//! [`FileStore::reload_if_changed`] to pick up their writes.

use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use kt_core::store::ChangeListener;
use kt_core::{Dataset, Item, ItemKind, Store, Tree};

struct Loaded {
    data: Dataset,
    /// SHA-256 of the file as last read or written.
    digest: Option<[u8; 32]>,
}

pub struct FileStore {
    path: PathBuf,
    state: Mutex<Loaded>,
    listeners: Mutex<Vec<ChangeListener>>,
}

fn digest(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(bytes));
    out
}

fn read(path: &Path) -> kt_core::Result<Loaded> {
    if !path.exists() {
        return Ok(Loaded {
            data: Dataset::default(),
            digest: None,
        });
    }
    let bytes = fs::read(path)?;
    let data = if bytes.iter().all(u8::is_ascii_whitespace) {
        Dataset::default()
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok(Loaded {
        data,
        digest: Some(digest(&bytes)),
    })
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty dataset.
    pub fn open(path: &Path) -> kt_core::Result<Self> {
        Ok(FileStore {
            path: path.to_path_buf(),
            state: Mutex::new(read(path)?),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a copy of both collections.
    pub fn snapshot(&self) -> Dataset {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .data
            .clone()
    }

    fn persist(&self, state: &mut Loaded) -> kt_core::Result<()> {
        let json = serde_json::to_vec_pretty(&state.data)?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        state.digest = Some(digest(&json));
        Ok(())
    }

    fn mutate<R>(
        &self,
        kinds: &[ItemKind],
        f: impl FnOnce(&mut Dataset) -> kt_core::Result<R>,
    ) -> kt_core::Result<R> {
        let result = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let mut next = state.data.clone();
            let result = f(&mut next)?;
            let previous = std::mem::replace(&mut state.data, next);
            if let Err(e) = self.persist(&mut state) {
                state.data = previous;
                return Err(e);
            }
            result
        };
        for kind in kinds {
            self.notify(*kind);
        }
        Ok(result)
    }

    fn notify(&self, kind: ItemKind) {
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        for listener in listeners.iter() {
            listener(kind);
        }
    }

    /// Applies `f` to the tree with `id` and persists the result.
    ///
    /// Returns `Ok(false)` if no such tree exists.
    pub fn update_tree(
        &self,
        id: &str,
        f: impl FnOnce(&mut Tree) -> kt_core::Result<()>,
    ) -> kt_core::Result<bool> {
        self.mutate(&[ItemKind::Tree], |data| match data.find_tree_mut(id) {
            Some(tree) => f(tree).map(|()| true),
            None => Ok(false),
        })
    }

    /// Reloads the file if another process changed it.
    ///
    /// Listeners are notified for both collections after a reload.
    pub fn reload_if_changed(&self) -> kt_core::Result<bool> {
        let loaded = read(&self.path)?;
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if loaded.digest == state.digest {
                return Ok(false);
            }
            *state = loaded;
        }
        tracing::debug!(path = %self.path.display(), "data file changed on disk");
        self.notify(ItemKind::Tree);
        self.notify(ItemKind::Note);
        Ok(true)
    }
}

impl Store for FileStore {
    fn all_items(&self, kind: ItemKind) -> kt_core::Result<Vec<Item>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state.data.items(kind))
    }

    fn dataset(&self) -> kt_core::Result<Dataset> {
        Ok(self.snapshot())
    }

    fn replace_all(&self, kind: ItemKind, items: Vec<Item>) -> kt_core::Result<()> {
        self.mutate(&[kind], |data| data.replace(kind, items))
    }

    fn upsert(&self, item: Item) -> kt_core::Result<()> {
        let kind = item.kind();
        self.mutate(&[kind], |data| {
            data.upsert(item);
            Ok(())
        })
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
