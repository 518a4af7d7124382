//! Application settings loaded from
//! `~/Library/Application Support/AppMultiOpener/config.json`.

use anyhow::{Context, Result};
use home::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "AppMultiOpener";
const CONFIG_FILE: &str = "config.json";
const STORE_FILE: &str = "store.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directories scanned for `.app` bundles, in order.
    #[serde(default = "default_scan_roots")]
    pub scan_roots: Vec<PathBuf>,

    /// Decode bundle icons while scanning.
    #[serde(default = "default_load_icons")]
    pub load_icons: bool,

    /// Default log filter; `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Key-value store backing favorites.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

fn default_scan_roots() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/Applications"),
        PathBuf::from("/System/Applications"),
        PathBuf::from("/System/Library/CoreServices"),
        PathBuf::from("/usr/local/bin"),
    ]
}

fn default_load_icons() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scan_roots: default_scan_roots(),
            load_icons: default_load_icons(),
            log_level: default_log_level(),
            store_path: None,
        }
    }
}

impl AppConfig {
    /// `~/Library/Application Support/AppMultiOpener`
    pub fn config_dir() -> Option<PathBuf> {
        home_dir().map(|h| {
            h.join("Library")
                .join("Application Support")
                .join(APP_DIR_NAME)
        })
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join(CONFIG_FILE))
    }

    /// Load from the default location. Missing or malformed files yield defaults.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("Home directory unknown, using default configuration");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::read(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Ignoring config {:?}: {:#}", path, e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("Read {:?}", path))?;
        serde_json::from_str(&raw).with_context(|| format!("Parse {:?}", path))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Create dir {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("Serialize config")?;
        fs::write(path, json).with_context(|| format!("Write {:?}", path))
    }

    /// Store file for favorites: the configured one or `store.json` next to the config.
    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .or_else(|| Self::config_dir().map(|d| d.join(STORE_FILE)))
            .unwrap_or_else(|| std::env::temp_dir().join(APP_DIR_NAME).join(STORE_FILE))
    }
}
