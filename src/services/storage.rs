//! Key-value storage areas with change notification.
//!
//! Every write that actually changes a value publishes one [`StorageChanges`]
//! event to all subscribers, whichever context made the write.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::types::errors::StorageError;
use crate::types::storage::{StorageChanges, StorageScope, ValueChange};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A persistent key-value area shared by all extension contexts.
#[async_trait]
pub trait StorageArea: Send + Sync {
    fn scope(&self) -> StorageScope;

    /// Reads the requested keys. Absent keys are simply missing from the map.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError>;

    /// Writes all entries as one change.
    async fn set(&self, values: HashMap<String, Value>) -> Result<(), StorageError>;

    /// Subscribes to change events published after this call.
    fn subscribe(&self) -> broadcast::Receiver<StorageChanges>;
}

/// Merges `values` into `current` and returns the entries that changed.
fn apply_values(
    current: &mut HashMap<String, Value>,
    values: HashMap<String, Value>,
) -> BTreeMap<String, ValueChange> {
    let mut changes = BTreeMap::new();
    for (key, value) in values {
        let old_value = current.insert(key.clone(), value.clone());
        if old_value.as_ref() != Some(&value) {
            changes.insert(
                key,
                ValueChange {
                    old_value,
                    new_value: Some(value),
                },
            );
        }
    }
    changes
}

fn pick(values: &HashMap<String, Value>, keys: &[&str]) -> HashMap<String, Value> {
    keys.iter()
        .filter_map(|k| values.get(*k).map(|v| (k.to_string(), v.clone())))
        .collect()
}

fn publish(sender: &broadcast::Sender<StorageChanges>, scope: StorageScope, changes: BTreeMap<String, ValueChange>) {
    if changes.is_empty() {
        return;
    }
    debug!(?scope, keys = ?changes.keys().collect::<Vec<_>>(), "Storage changed");
    // No receivers is fine; nobody is listening yet.
    let _ = sender.send(StorageChanges { scope, changes });
}

// === MemoryStorage ===

/// In-process storage area.
pub struct MemoryStorage {
    scope: StorageScope,
    values: Mutex<HashMap<String, Value>>,
    sender: broadcast::Sender<StorageChanges>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new(scope: StorageScope) -> Self {
        let (sender, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            scope,
            values: Mutex::new(HashMap::new()),
            sender,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Makes subsequent reads fail with `Unavailable`, as a disabled sync area does.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent writes fail with `Unavailable`, as an exceeded quota does.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Value>>, StorageError> {
        self.values
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(StorageScope::Sync)
    }
}

#[async_trait]
impl StorageArea for MemoryStorage {
    fn scope(&self) -> StorageScope {
        self.scope
    }

    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".to_string()));
        }
        Ok(pick(&*self.lock()?, keys))
    }

    async fn set(&self, values: HashMap<String, Value>) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        let changes = {
            let mut current = self.lock()?;
            apply_values(&mut current, values)
        };
        publish(&self.sender, self.scope, changes);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChanges> {
        self.sender.subscribe()
    }
}

// === JsonFileStorage ===

/// Storage area persisted as a JSON object on disk.
///
/// Values are cached in memory; every write rewrites the whole file. Writes are
/// serialized so the file always reflects the latest completed write.
pub struct JsonFileStorage {
    scope: StorageScope,
    path: PathBuf,
    values: Mutex<HashMap<String, Value>>,
    write_lock: tokio::sync::Mutex<()>,
    sender: broadcast::Sender<StorageChanges>,
}

impl JsonFileStorage {
    /// Opens the file at `path`.
    ///
    /// A missing file is an empty store. A malformed file is a serialization error.
    pub async fn open(path: impl Into<PathBuf>, scope: StorageScope) -> Result<Self, StorageError> {
        let path = path.into();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str::<HashMap<String, Value>>(&content).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse storage file: {}", e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(StorageError::Io(format!("Failed to read storage file: {}", e)));
            }
        };
        let (sender, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            scope,
            path,
            values: Mutex::new(values),
            write_lock: tokio::sync::Mutex::new(()),
            sender,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Value>>, StorageError> {
        self.values
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl StorageArea for JsonFileStorage {
    fn scope(&self) -> StorageScope {
        self.scope
    }

    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError> {
        Ok(pick(&*self.lock()?, keys))
    }

    async fn set(&self, values: HashMap<String, Value>) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let (snapshot, changes) = {
            let current = self.lock()?;
            let mut next = current.clone();
            let changes = apply_values(&mut next, values);
            (next, changes)
        };
        if changes.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        let json = serde_json::to_string_pretty(&snapshot).map_err(|e| {
            StorageError::Serialization(format!("Failed to serialize storage: {}", e))
        })?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Storage write failed");
            StorageError::Io(format!("Failed to write storage file: {}", e))
        })?;

        *self.lock()? = snapshot;
        publish(&self.sender, self.scope, changes);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChanges> {
        self.sender.subscribe()
    }
}
