use super::{StoreChange, StoreError, Storage, Subscribers};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::SystemTime;

const EXTENSION: &str = "json";

/// Suffix for files that could not be read back
const SET_ASIDE_SUFFIX: &str = "bad";

/// Keeps each key in its own `<key>.json` file inside a directory.
///
/// A file that exists but does not parse is renamed to `<key>.json.bad`
/// (or `<key>.json.bad.<n>` if that is taken) when it is loaded, so that the
/// default which replaces it in memory never overwrites it on disk.
#[derive(Debug)]
pub(crate) struct DirStore {
    dir: PathBuf,
    subscribers: Subscribers,
    // Last modification time observed for each key, used to spot writes from
    // other processes
    seen: HashMap<String, SystemTime>,
}

impl DirStore {
    pub(crate) fn open<P: Into<PathBuf>>(dir: P) -> Result<DirStore, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        let mut store = DirStore {
            dir,
            subscribers: Subscribers::default(),
            seen: HashMap::new(),
        };
        store.seen = store.scan()?;
        tracing::info!(dir = %store.dir.display(), keys = store.seen.len(), "opened store");
        Ok(store)
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{EXTENSION}"))
    }

    fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.to_owned(),
            source,
        }
    }

    fn scan(&self) -> Result<HashMap<String, SystemTime>, StoreError> {
        let mut seen = HashMap::new();
        let entries = fs::read_dir(&self.dir).map_err(Self::io_error(&self.dir))?;
        for entry in entries {
            let entry = entry.map_err(Self::io_error(&self.dir))?;
            let path = entry.path();
            if path.extension().and_then(OsStr::to_str) != Some(EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(OsStr::to_str) else {
                continue;
            };
            if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
                seen.insert(key.to_owned(), modified);
            }
        }
        Ok(seen)
    }

    fn set_aside(&self, path: &Path) -> Result<PathBuf, StoreError> {
        let mut target = path.with_extension(format!("{EXTENSION}.{SET_ASIDE_SUFFIX}"));
        let mut n = 0;
        while target.exists() {
            n += 1;
            target = path.with_extension(format!("{EXTENSION}.{SET_ASIDE_SUFFIX}.{n}"));
        }
        fs::rename(path, &target).map_err(Self::io_error(path))?;
        Ok(target)
    }
}

impl Storage for DirStore {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let path = self.path(key);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        match serde_json::from_str(&json) {
            Ok(value) => Ok(Some(value)),
            Err(source) => {
                match self.set_aside(&path) {
                    Ok(kept) => tracing::warn!(
                        key,
                        kept = %kept.display(),
                        "moved unreadable stored value out of the way"
                    ),
                    Err(e) => {
                        tracing::error!(key, error = ?e, "failed to set aside unreadable file");
                    }
                }
                Err(StoreError::Json { path, source })
            }
        }
    }

    fn save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let path = self.path(key);
        let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        // Write beside the target and rename over it so that readers never
        // see a half-written file
        let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
        fs::write(&tmp, json).map_err(Self::io_error(&tmp))?;
        fs::rename(&tmp, &path).map_err(Self::io_error(&path))?;
        if let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) {
            self.seen.insert(key.to_owned(), modified);
        }
        tracing::debug!(key, path = %path.display(), "saved");
        self.subscribers.notify(key);
        Ok(())
    }

    fn subscribe(&mut self) -> Receiver<StoreChange> {
        self.subscribers.subscribe()
    }

    fn poll_external(&mut self) {
        let current = match self.scan() {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!(error = ?e, "failed to scan store directory");
                return;
            }
        };
        for (key, modified) in &current {
            if self.seen.get(key) != Some(modified) {
                tracing::info!(key, "stored value changed externally");
                self.subscribers.notify(key);
            }
        }
        self.seen = current;
    }
}
