use super::{StoreChange, StoreError, Storage, Subscribers};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;

/// In-memory store holding serialized JSON, for tests
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    values: HashMap<String, String>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub(crate) fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Stands in for another writer of the same store
    pub(crate) fn write_raw(&mut self, key: &str, json: &str) {
        self.values.insert(key.to_owned(), json.to_owned());
        self.subscribers.notify(key);
    }

    pub(crate) fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl Storage for MemoryStore {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        self.values
            .get(key)
            .map(|json| serde_json::from_str(json))
            .transpose()
            .map_err(|source| StoreError::Json {
                path: PathBuf::from(key),
                source,
            })
    }

    fn save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|source| StoreError::Json {
            path: PathBuf::from(key),
            source,
        })?;
        self.values.insert(key.to_owned(), json);
        self.subscribers.notify(key);
        Ok(())
    }

    fn subscribe(&mut self) -> Receiver<StoreChange> {
        self.subscribers.subscribe()
    }
}
