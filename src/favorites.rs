//! Favorite applications, keyed by bundle identifier and persisted through a
//! small key-value store.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::AppDescriptor;

pub const FAVORITES_KEY: &str = "FavoriteApps";

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// JSON object on disk, one string value per key.
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match read_object(&path) {
            Ok(values) => values,
            Err(e) => {
                if path.exists() {
                    log::warn!("Starting with an empty store, {:#}", e);
                }
                Map::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Create dir {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(&self.values).context("Serialize store")?;
        fs::write(&self.path, json).with_context(|| format!("Write {:?}", self.path))
    }
}

fn read_object(path: &Path) -> Result<Map<String, Value>> {
    let raw = fs::read_to_string(path).with_context(|| format!("Read {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Parse {:?}", path))
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), Value::String(value));
        self.flush()
    }
}

pub struct Favorites {
    store: Box<dyn KeyValueStore>,
    ids: BTreeSet<String>,
}

impl Favorites {
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let ids = store
            .get(FAVORITES_KEY)
            .and_then(|raw| match serde_json::from_str::<BTreeSet<String>>(&raw) {
                Ok(ids) => Some(ids),
                Err(e) => {
                    log::warn!("Ignoring unreadable favorites: {}", e);
                    None
                }
            })
            .unwrap_or_default();
        Self { store, ids }
    }

    pub fn contains(&self, bundle_id: &str) -> bool {
        !bundle_id.is_empty() && self.ids.contains(bundle_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Flip the favorite flag and persist. Apps without a bundle id are ignored.
    /// Returns the new state.
    pub fn toggle(&mut self, bundle_id: &str) -> Result<bool> {
        if bundle_id.is_empty() {
            return Ok(false);
        }
        let now_favorite = if self.ids.remove(bundle_id) {
            false
        } else {
            self.ids.insert(bundle_id.to_string());
            true
        };
        let raw = serde_json::to_string(&self.ids).context("Serialize favorites")?;
        self.store.set(FAVORITES_KEY, raw)?;
        Ok(now_favorite)
    }

    /// Keep only favorites, preserving order.
    pub fn retain_favorites(&self, apps: Vec<AppDescriptor>) -> Vec<AppDescriptor> {
        apps.into_iter()
            .filter(|a| self.contains(&a.bundle_id))
            .collect()
    }
}
