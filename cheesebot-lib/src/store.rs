//! JSON document store shared by configuration, phrases and admin commands.
//!
//! Documents live in named tables and are persisted to a single JSON file
//! laid out as `{ "<table>": { "<id>": { ... } } }`. Every operation goes
//! through one mutex. Writes are cached in memory and reach the disk every
//! [`WRITE_CACHE_SIZE`] writes, on [`Store::flush`], or when the store drops.

use log::{debug, error};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::constants::WRITE_CACHE_SIZE;
use crate::error::Result;

/// A stored document: a JSON object.
pub type Document = Map<String, Value>;

/// Identifier of a document inside its table.
pub type DocId = u64;

type Tables = BTreeMap<String, BTreeMap<DocId, Document>>;

#[derive(Default)]
struct StoreState {
    tables: Tables,
    pending_writes: usize,
}

/// Locked, write-back cached document store.
pub struct Store {
    path: Option<PathBuf>,
    cache_size: usize,
    state: Mutex<StoreState>,
}

impl Store {
    /// Open the store at `path`, starting empty when the file is missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Arc<Self>> {
        Self::open_with_cache(path, WRITE_CACHE_SIZE)
    }

    /// Open the store flushing after every `cache_size` writes.
    pub fn open_with_cache(path: impl AsRef<Path>, cache_size: usize) -> Result<Arc<Self>> {
        let path = path.as_ref().to_path_buf();
        let tables = if path.exists() {
            let raw = fs::read(&path)?;
            if raw.iter().all(u8::is_ascii_whitespace) {
                Tables::new()
            } else {
                serde_json::from_slice(&raw)?
            }
        } else {
            debug!("storage {:?} not found, starting empty", path);
            Tables::new()
        };

        Ok(Arc::new(Self {
            path: Some(path),
            cache_size: cache_size.max(1),
            state: Mutex::new(StoreState {
                tables,
                pending_writes: 0,
            }),
        }))
    }

    /// Store that never touches the disk.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self {
            path: None,
            cache_size: usize::MAX,
            state: Mutex::new(StoreState::default()),
        })
    }

    /// Handle to the table called `name`.
    pub fn table(self: &Arc<Self>, name: &str) -> Table {
        Table {
            store: self.clone(),
            name: name.to_string(),
        }
    }

    /// Names of every non-empty table.
    pub fn tables(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .tables
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Write all cached changes to disk.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        self.write_out(&mut state)
    }

    fn write_out(&self, state: &mut StoreState) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            state.pending_writes = 0;
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(&state.tables)?)?;
        fs::rename(&tmp, path)?;
        state.pending_writes = 0;
        Ok(())
    }

    fn read<R>(
        &self,
        table: &str,
        f: impl FnOnce(Option<&BTreeMap<DocId, Document>>) -> R,
    ) -> R {
        let state = self.state.lock().unwrap();
        f(state.tables.get(table))
    }

    fn write<R>(
        &self,
        table: &str,
        f: impl FnOnce(&mut BTreeMap<DocId, Document>) -> R,
    ) -> Result<R> {
        let mut state = self.state.lock().unwrap();
        let result = f(state.tables.entry(table.to_string()).or_default());
        state.pending_writes += 1;
        if state.pending_writes >= self.cache_size {
            self.write_out(&mut state)?;
        }
        Ok(result)
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(|err| err.into_inner());
        if state.pending_writes == 0 {
            return;
        }
        let mut state = std::mem::take(state);
        if let Err(err) = self.write_out(&mut state) {
            error!("failed to flush storage on shutdown: {}", err);
        }
    }
}

/// Predicate matching documents whose `key` equals `value`.
pub fn field_eq(key: &str, value: impl Into<Value>) -> impl Fn(&Document) -> bool {
    let key = key.to_string();
    let value = value.into();
    move |doc| doc.get(&key) == Some(&value)
}

/// Handle to a single table of a [`Store`].
#[derive(Clone)]
pub struct Table {
    store: Arc<Store>,
    name: String,
}

impl Table {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every document, in insertion order.
    pub fn all(&self) -> Vec<Document> {
        self.search(|_| true)
    }

    /// Documents matching `pred`, in insertion order.
    pub fn search(&self, pred: impl Fn(&Document) -> bool) -> Vec<Document> {
        self.store.read(&self.name, |docs| {
            docs.map(|docs| docs.values().filter(|doc| pred(*doc)).cloned().collect())
                .unwrap_or_default()
        })
    }

    /// First document matching `pred`.
    pub fn get(&self, pred: impl Fn(&Document) -> bool) -> Option<Document> {
        self.store.read(&self.name, |docs| {
            docs.and_then(|docs| docs.values().find(|doc| pred(*doc)).cloned())
        })
    }

    /// Insert `doc`, returning its new id.
    pub fn insert(&self, doc: Document) -> Result<DocId> {
        self.store.write(&self.name, |docs| {
            let id = docs.keys().next_back().map_or(1, |last| last + 1);
            docs.insert(id, doc);
            id
        })
    }

    /// Merge `fields` into every document matching `pred`.
    pub fn update(&self, fields: Document, pred: impl Fn(&Document) -> bool) -> Result<Vec<DocId>> {
        self.store.write(&self.name, |docs| merge_matching(docs, &fields, &pred))
    }

    /// Apply `op` to every document matching `pred`.
    ///
    /// Nothing is changed when `op` fails for any of them.
    pub fn update_with(
        &self,
        op: impl Fn(&mut Document) -> Result<()>,
        pred: impl Fn(&Document) -> bool,
    ) -> Result<Vec<DocId>> {
        self.store.write(&self.name, |docs| -> Result<Vec<DocId>> {
            let mut updated = Vec::new();
            for (id, doc) in docs.iter().filter(|(_, doc)| pred(*doc)) {
                let mut doc = doc.clone();
                op(&mut doc)?;
                updated.push((*id, doc));
            }
            let ids = updated.iter().map(|(id, _)| *id).collect();
            docs.extend(updated);
            Ok(ids)
        })?
    }

    /// Update matching documents, or insert `doc` when none match.
    pub fn upsert(&self, doc: Document, pred: impl Fn(&Document) -> bool) -> Result<Vec<DocId>> {
        self.store.write(&self.name, |docs| {
            let ids = merge_matching(docs, &doc, &pred);
            if !ids.is_empty() {
                return ids;
            }
            let id = docs.keys().next_back().map_or(1, |last| last + 1);
            docs.insert(id, doc);
            vec![id]
        })
    }

    /// Remove every document matching `pred`, returning the removed ids.
    pub fn remove(&self, pred: impl Fn(&Document) -> bool) -> Result<Vec<DocId>> {
        self.store.write(&self.name, |docs| {
            let ids: Vec<DocId> = docs
                .iter()
                .filter(|(_, doc)| pred(*doc))
                .map(|(id, _)| *id)
                .collect();
            for id in &ids {
                docs.remove(id);
            }
            ids
        })
    }
}

fn merge_matching(
    docs: &mut BTreeMap<DocId, Document>,
    fields: &Document,
    pred: &impl Fn(&Document) -> bool,
) -> Vec<DocId> {
    let mut ids = Vec::new();
    for (id, doc) in docs.iter_mut() {
        if pred(doc) {
            for (key, value) in fields {
                doc.insert(key.clone(), value.clone());
            }
            ids.push(*id);
        }
    }
    ids
}

/// Build a [`Document`] from `key => value` pairs.
#[macro_export]
macro_rules! doc {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut doc = $crate::store::Document::new();
        $(doc.insert($key.to_string(), $crate::__serde_json::Value::from($value));)*
        doc
    }};
}
