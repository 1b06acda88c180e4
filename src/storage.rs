// src/storage.rs
//
// Holdings are kept the way a browser keeps local storage: one file of string
// values by key, with the whole holdings collection serialized under a single
// key and rewritten on every change.

use crate::models::{Holding, NewHolding};
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_STORAGE_KEY: &str = "portfolio_stocks";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read storage file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write storage file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("value under key `{key}` is not a holdings list: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },

    #[error("failed to encode holdings: {0}")]
    Encode(#[source] serde_json::Error),
}

/// File-backed string key-value store.
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| StorageError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No storage file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(source) => return Err(StorageError::Read { path, source }),
        };
        Ok(LocalStorage { path, entries })
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Persists `value` under `key`. The in-memory map only changes once the
    /// file write has succeeded.
    pub fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value);
        self.commit(next)
    }

    pub fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if !self.entries.contains_key(key) {
            return Ok(());
        }
        let mut next = self.entries.clone();
        next.remove(key);
        self.commit(next)
    }

    fn commit(&mut self, next: BTreeMap<String, String>) -> Result<(), StorageError> {
        self.flush(&next)?;
        self.entries = next;
        Ok(())
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let body = serde_json::to_string_pretty(entries).map_err(StorageError::Encode)?;
        let tmp = self.path.with_extension("tmp");
        let write_err = |source: io::Error| StorageError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&tmp, body).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)
    }
}

/// The holdings collection stored under one key of a [`LocalStorage`].
#[derive(Debug)]
pub struct HoldingStore {
    storage: LocalStorage,
    key: String,
}

impl HoldingStore {
    pub fn new(storage: LocalStorage, key: impl Into<String>) -> Self {
        HoldingStore {
            storage,
            key: key.into(),
        }
    }

    pub fn open(path: impl Into<PathBuf>, key: impl Into<String>) -> Result<Self, StorageError> {
        Ok(Self::new(LocalStorage::open(path)?, key))
    }

    pub fn get_holdings(&self) -> Result<Vec<Holding>, StorageError> {
        match self.storage.get_item(&self.key) {
            Some(raw) => serde_json::from_str(raw).map_err(|source| StorageError::Decode {
                key: self.key.clone(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    pub fn add_holding(&mut self, new_holding: NewHolding) -> Result<Holding, StorageError> {
        let mut holdings = self.get_holdings()?;
        let holding = new_holding.into_holding(Uuid::new_v4().to_string());
        holdings.push(holding.clone());
        self.save(&holdings)?;
        info!("Stored holding {} ({})", holding.symbol, holding.id);
        Ok(holding)
    }

    /// Replaces the record with the same id. Unknown ids leave storage untouched.
    pub fn update_holding(&mut self, holding: Holding) -> Result<bool, StorageError> {
        let mut holdings = self.get_holdings()?;
        let Some(slot) = holdings.iter_mut().find(|h| h.id == holding.id) else {
            warn!("Update skipped, no holding with id {}", holding.id);
            return Ok(false);
        };
        *slot = holding;
        self.save(&holdings)?;
        Ok(true)
    }

    pub fn delete_holding(&mut self, id: &str) -> Result<bool, StorageError> {
        let holdings = self.get_holdings()?;
        let before = holdings.len();
        let remaining: Vec<Holding> = holdings.into_iter().filter(|h| h.id != id).collect();
        self.save(&remaining)?;
        Ok(remaining.len() != before)
    }

    fn save(&mut self, holdings: &[Holding]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(holdings).map_err(StorageError::Encode)?;
        self.storage.set_item(&self.key, raw)
    }
}
