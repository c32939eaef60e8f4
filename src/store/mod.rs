//! Key/value persistence with change notification.
//!
//! Values are JSON documents addressed by a string key.  Each store keeps a
//! list of subscribers and tells all of them whenever a key is written, so
//! independent [`Persisted`] holders of the same key can reload.
mod dir;
#[cfg(test)]
pub(crate) mod memory;
pub(crate) use self::dir::DirStore;
use serde::{de::DeserializeOwned, Serialize};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use thiserror::Error;

pub(crate) const METRICS_KEY: &str = "sleepMetrics";
pub(crate) const SLEEP_DATA_KEY: &str = "sleepData";
pub(crate) const RATINGS_KEY: &str = "sleepRatings";

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) struct StoreChange {
    pub(crate) key: String,
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed data in {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) trait Storage {
    /// `Ok(None)` if nothing has been saved under `key`
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError>;

    /// Replaces the value under `key` and notifies subscribers
    fn save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError>;

    fn subscribe(&mut self) -> Receiver<StoreChange>;

    /// Looks for writes made behind the store's back (e.g., by another
    /// process) and notifies subscribers about them
    fn poll_external(&mut self) {}

    /// Like `load()`, but any failure is logged and answered with `default`
    fn load_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.load(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key, error = ?e, "failed to load stored value; using default");
                default
            }
        }
    }
}

#[derive(Debug, Default)]
struct Subscribers(Vec<Sender<StoreChange>>);

impl Subscribers {
    fn subscribe(&mut self) -> Receiver<StoreChange> {
        let (sender, receiver) = channel();
        self.0.push(sender);
        receiver
    }

    fn notify(&mut self, key: &str) {
        tracing::trace!(key, subscribers = self.0.len(), "broadcasting change");
        self.0.retain(|s| {
            s.send(StoreChange {
                key: key.to_owned(),
            })
            .is_ok()
        });
    }
}

/// A stored value together with its own subscription. Edits are written
/// through, and `sync()` picks up writes made by anyone else.
#[derive(Debug)]
pub(crate) struct Persisted<T> {
    key: &'static str,
    value: T,
    changes: Receiver<StoreChange>,
}

impl<T: Serialize + DeserializeOwned + Default> Persisted<T> {
    pub(crate) fn load<S: Storage>(store: &mut S, key: &'static str) -> Self {
        let changes = store.subscribe();
        let value = store.load_or(key, T::default());
        Persisted {
            key,
            value,
            changes,
        }
    }

    pub(crate) fn get(&self) -> &T {
        &self.value
    }

    /// Swaps in a whole new value and saves it.  A failed save is logged; the
    /// new value is kept in memory regardless.
    pub(crate) fn replace<S: Storage>(&mut self, store: &mut S, value: T) {
        self.value = value;
        match store.save(self.key, &self.value) {
            // The save is echoed back to our own subscription, and anything
            // queued before it has just been overwritten
            Ok(()) => self.changes.try_iter().for_each(drop),
            Err(e) => tracing::error!(key = self.key, error = %e, "failed to save value"),
        }
    }

    /// Reloads the value if the store reported a change to this key.  Returns
    /// whether anything was reloaded.
    pub(crate) fn sync<S: Storage>(&mut self, store: &S) -> bool {
        let changed = self
            .changes
            .try_iter()
            .fold(false, |changed, c| changed || c.key == self.key);
        if changed {
            tracing::debug!(key = self.key, "reloading after store change");
            self.value = store.load_or(self.key, T::default());
        }
        changed
    }
}
