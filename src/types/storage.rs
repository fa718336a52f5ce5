use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which storage area a change happened in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StorageScope {
    Sync,
    Local,
}

/// Old and new value of one key. `None` means the key was absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValueChange {
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// One change notification, covering every key touched by a single write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageChanges {
    pub scope: StorageScope,
    pub changes: BTreeMap<String, ValueChange>,
}

impl StorageChanges {
    pub fn get(&self, key: &str) -> Option<&ValueChange> {
        self.changes.get(key)
    }
}
