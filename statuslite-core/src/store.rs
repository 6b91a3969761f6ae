//! Service store
//!
//! An ordered list of service records persisted as one JSON blob under a
//! fixed key. Every mutation writes through to the key-value port.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::{ModelError, NewService, ServiceId, ServiceRecord, ServiceStatus};

pub const DEFAULT_STORAGE_KEY: &str = "status-lite-v2";

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// The persisted blob exists but is not a list of records
    Corrupt { key: String, reason: String },
    DuplicateId { id: ServiceId },
    NotFound { id: String },
    AmbiguousId { prefix: String, matches: Vec<ServiceId> },
    InvalidService(ModelError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::Corrupt { key, reason } => {
                write!(f, "stored services under '{}' are unreadable: {}", key, reason)
            }
            Self::DuplicateId { id } => write!(f, "service id already exists: {}", id),
            Self::NotFound { id } => write!(f, "service not found: {}", id),
            Self::AmbiguousId { prefix, matches } => {
                write!(f, "'{}' matches several services: {}", prefix, matches.join(", "))
            }
            Self::InvalidService(e) => write!(f, "invalid service: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::InvalidService(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

impl From<ModelError> for StoreError {
    fn from(e: ModelError) -> Self {
        StoreError::InvalidService(e)
    }
}

/// Flat string key-value persistence port
pub trait KvStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryKv {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// One file per key inside a data directory
#[derive(Clone, Debug)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path backing a key; characters outside `[A-Za-z0-9._-]` become `_`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// What a completed check does to a record's existing metrics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsPolicy {
    /// Each check replaces the whole map
    #[default]
    Replace,
    /// New values overwrite same-named ones; other keys are kept
    Merge,
}

pub struct ServiceStore {
    kv: Box<dyn KvStore>,
    key: String,
    defaults: Vec<ServiceRecord>,
    records: Vec<ServiceRecord>,
    policy: MetricsPolicy,
}

impl ServiceStore {
    /// Read the persisted list once, falling back to `defaults` when the key is absent
    pub fn load(
        kv: Box<dyn KvStore>,
        key: impl Into<String>,
        defaults: Vec<ServiceRecord>,
    ) -> Result<Self, StoreError> {
        let key = key.into();

        let (records, fresh) = match kv.get(&key)? {
            Some(raw) => {
                let records: Vec<ServiceRecord> =
                    serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
                        key: key.clone(),
                        reason: e.to_string(),
                    })?;
                (records, false)
            }
            None => (defaults.clone(), true),
        };

        let mut store = Self {
            kv,
            key,
            defaults,
            records: Vec::new(),
            policy: MetricsPolicy::default(),
        };

        if fresh {
            info!(key = %store.key, count = records.len(), "seeding default services");
            store.commit(records)?;
        } else {
            store.records = records;
            debug!(key = %store.key, count = store.records.len(), "loaded services");
        }

        Ok(store)
    }

    pub fn with_policy(mut self, policy: MetricsPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MetricsPolicy {
        self.policy
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn records(&self) -> &[ServiceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ServiceRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Resolve an exact id or a unique id prefix
    pub fn resolve(&self, id_or_prefix: &str) -> Result<ServiceId, StoreError> {
        if self.get(id_or_prefix).is_some() {
            return Ok(id_or_prefix.to_string());
        }

        let matches: Vec<ServiceId> = self
            .records
            .iter()
            .filter(|r| !id_or_prefix.is_empty() && r.id.starts_with(id_or_prefix))
            .map(|r| r.id.clone())
            .collect();

        match matches.len() {
            0 => Err(StoreError::NotFound {
                id: id_or_prefix.to_string(),
            }),
            1 => Ok(matches.into_iter().next().unwrap_or_default()),
            _ => Err(StoreError::AmbiguousId {
                prefix: id_or_prefix.to_string(),
                matches,
            }),
        }
    }

    /// Append a validated record
    pub fn add(&mut self, service: NewService) -> Result<&ServiceRecord, StoreError> {
        let record = service.build()?;
        self.insert(record)
    }

    /// Append an already-built record; its id must be unused
    pub fn insert(&mut self, record: ServiceRecord) -> Result<&ServiceRecord, StoreError> {
        if self.get(&record.id).is_some() {
            return Err(StoreError::DuplicateId { id: record.id });
        }

        let (id, name) = (record.id.clone(), record.name.clone());
        let mut next = self.records.clone();
        next.push(record);
        self.commit(next)?;
        info!(id = %id, name = %name, "service added");

        let last = self.records.len() - 1;
        Ok(&self.records[last])
    }

    pub fn remove(&mut self, id: &str) -> Result<ServiceRecord, StoreError> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        let mut next = self.records.clone();
        let removed = next.remove(pos);
        self.commit(next)?;
        info!(id = %removed.id, name = %removed.name, "service removed");
        Ok(removed)
    }

    /// Advance one record through the manual status cycle
    pub fn cycle(&mut self, id: &str) -> Result<ServiceStatus, StoreError> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        let mut next = self.records.clone();
        next[pos] = next[pos].cycled();
        let status = next[pos].status;
        self.commit(next)?;
        info!(id, status = %status, "status cycled");
        Ok(status)
    }

    /// Fold a finished batch of checks into the store with a single write.
    ///
    /// Only status and metrics are taken from a result. Results for records
    /// that no longer exist are dropped. Returns how many records were updated.
    pub fn apply_checks(&mut self, results: Vec<ServiceRecord>) -> Result<usize, StoreError> {
        let mut next = self.records.clone();
        let mut updated = 0;

        for result in results {
            let Some(record) = next.iter_mut().find(|r| r.id == result.id) else {
                debug!(id = %result.id, "dropping check result for removed service");
                continue;
            };

            record.status = result.status;
            match self.policy {
                MetricsPolicy::Replace => record.metrics = result.metrics,
                MetricsPolicy::Merge => record.metrics.extend(result.metrics),
            }
            updated += 1;
        }

        self.commit(next)?;
        Ok(updated)
    }

    /// Drop the stored list and write the defaults back in its place.
    ///
    /// If the write fails the key stays absent, so the next load seeds the
    /// defaults anyway.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.kv.remove(&self.key)?;
        let defaults = self.defaults.clone();
        self.commit(defaults)?;
        info!(count = self.records.len(), "services reset to defaults");
        Ok(())
    }

    /// Write `next` through to the port, then make it the in-memory list.
    /// On a failed write the in-memory list is left as it was.
    fn commit(&mut self, next: Vec<ServiceRecord>) -> Result<(), StoreError> {
        let blob = serde_json::to_string(&next)?;
        self.kv.set(&self.key, &blob)?;
        self.records = next;
        Ok(())
    }
}
