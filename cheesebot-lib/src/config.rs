//! Layered runtime configuration backed by the `config` table.
//!
//! Each layer is one document tagged with `level_min`. The effective
//! configuration at level `L` merges every layer with `level_min <= L`,
//! lower levels first. Subscribers registered with [`Config::on_change`]
//! run whenever an effective value changes.

use log::debug;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use crate::doc;
use crate::error::Result;
use crate::store::{field_eq, Store, Table};

/// Key holding a layer's level inside its document.
const LEVEL_KEY: &str = "level_min";

/// Name of the storage table holding configuration layers.
pub const CONFIG_TABLE: &str = "config";

/// Change subscriber; receives the new effective value, `None` when unset.
pub type Handler = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

/// Effective configuration snapshot at one level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigView {
    values: BTreeMap<String, Value>,
}

impl ConfigView {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }
}

/// Live configuration at a fixed level with change notification.
pub struct Config {
    table: Table,
    level: Mutex<i64>,
    values: Mutex<ConfigView>,
    handlers: Mutex<HashMap<String, Vec<Handler>>>,
}

impl Config {
    /// Load the effective configuration at `level` from `store`.
    pub fn new(store: &Arc<Store>, level: i64) -> Self {
        let table = store.table(CONFIG_TABLE);
        let values = effective(&table, level);
        Self {
            table,
            level: Mutex::new(level),
            values: Mutex::new(values),
            handlers: Mutex::new(HashMap::new()),
        }
    }

    pub fn level(&self) -> i64 {
        *self.level.lock().unwrap()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// String value of `key`; non-string values are rendered as JSON.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| match value {
            Value::String(text) => text,
            other => other.to_string(),
        })
    }

    /// Unsigned integer value of `key`, also accepting numeric strings.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.get(key)? {
            Value::Number(number) => number.as_u64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Snapshot of the effective configuration at another level.
    pub fn at_level(&self, level: i64) -> ConfigView {
        if level == self.level() {
            return self.values.lock().unwrap().clone();
        }
        effective(&self.table, level)
    }

    /// Set `key` in this config's own layer.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.set_at(key, value, self.level())
    }

    /// Set `key` in the layer for `level`, affecting that level and above.
    pub fn set_at(&self, key: &str, value: impl Into<Value>, level: i64) -> Result<()> {
        let mut layer = doc!(LEVEL_KEY => level);
        layer.insert(key.to_string(), value.into());
        self.table.upsert(layer, field_eq(LEVEL_KEY, level))?;
        self.reload();
        Ok(())
    }

    /// Seed `key` in the base layer when no layer defines it.
    pub fn set_default(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        if self.get(key).is_some() {
            return Ok(());
        }
        debug!("seeding default config `{}`", key);
        self.set_at(key, value, 0)
    }

    /// Move to another level and notify about every value that changed.
    pub fn set_level(&self, level: i64) {
        *self.level.lock().unwrap() = level;
        self.reload();
    }

    /// Subscribe `handler` to changes of `key`.
    pub fn on_change(&self, key: &str, handler: impl Fn(Option<&Value>) + Send + Sync + 'static) {
        self.handlers
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Recompute the effective values from storage and fire handlers for
    /// keys whose value was added, removed or changed.
    pub fn reload(&self) {
        let fresh = effective(&self.table, self.level());
        let changed: Vec<(String, Option<Value>)> = {
            let mut values = self.values.lock().unwrap();
            let keys: BTreeSet<&String> = values.keys().chain(fresh.keys()).collect();
            let changed = keys
                .into_iter()
                .filter(|key| values.get(key) != fresh.get(key))
                .map(|key| (key.clone(), fresh.get(key).cloned()))
                .collect();
            *values = fresh.clone();
            changed
        };

        for (key, value) in changed {
            let handlers = self
                .handlers
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .unwrap_or_default();
            for handler in handlers {
                handler(value.as_ref());
            }
        }
    }
}

fn effective(table: &Table, level: i64) -> ConfigView {
    let mut layers: Vec<(i64, _)> = table
        .all()
        .into_iter()
        .filter_map(|doc| {
            let layer_level = doc.get(LEVEL_KEY)?.as_i64()?;
            (layer_level <= level).then_some((layer_level, doc))
        })
        .collect();
    layers.sort_by_key(|(layer_level, _)| *layer_level);

    let mut values = BTreeMap::new();
    for (_, layer) in layers {
        for (key, value) in layer {
            if key != LEVEL_KEY {
                values.insert(key, value);
            }
        }
    }
    ConfigView { values }
}
