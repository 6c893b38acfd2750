//! Durable storage for the two session slots.
//!
//! The persisted session is exactly two named values: the serialized
//! identity and the raw credential. `FileStorage` keeps one file per slot
//! in a directory that every process of the same user shares;
//! `MemoryStorage` is a shared in-process map used by tests and embedders.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};

/// Application name used for the default storage directory
const APP_NAME: &str = "healthportal";

static NEXT_TMP_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Identity,
    Credential,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Identity, Slot::Credential];

    /// Storage key, shared with the web front-end
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Identity => "hp:user",
            Slot::Credential => "hp:token",
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            Slot::Identity => "user.json",
            Slot::Credential => "token",
        }
    }
}

pub trait SessionStorage: Send + Sync {
    fn get(&self, slot: Slot) -> Result<Option<String>>;
    fn set(&self, slot: Slot, value: &str) -> Result<()>;
    fn remove(&self, slot: Slot) -> Result<()>;
}

pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/healthportal`
    pub fn default_dir() -> Result<PathBuf> {
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, slot: Slot) -> PathBuf {
        self.dir.join(slot.file_name())
    }

    // Unique per process and per write, so concurrent writers never share
    // a temp file
    fn tmp_path(path: &Path) -> PathBuf {
        let n = NEXT_TMP_ID.fetch_add(1, Ordering::Relaxed);
        let mut name = path.as_os_str().to_owned();
        name.push(format!(".{}.{}.tmp", std::process::id(), n));
        PathBuf::from(name)
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, slot: Slot) -> Result<Option<String>> {
        let path = self.slot_path(slot);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", slot.key())),
        }
    }

    fn set(&self, slot: Slot, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create session directory")?;

        // Write then rename so a reader in another process never sees a
        // half-written slot.
        let path = self.slot_path(slot);
        let tmp = Self::tmp_path(&path);
        std::fs::write(&tmp, value).with_context(|| format!("Failed to write {}", slot.key()))?;
        std::fs::rename(&tmp, &path).with_context(|| format!("Failed to replace {}", slot.key()))?;
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<()> {
        match std::fs::remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", slot.key())),
        }
    }
}

/// In-memory storage. Clones share the same slots, so two stores built on
/// clones of one `MemoryStorage` behave like two windows of one browser.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<Slot, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, slot: Slot) -> Result<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| anyhow!("Session storage lock poisoned"))?;
        Ok(slots.get(&slot).cloned())
    }

    fn set(&self, slot: Slot, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| anyhow!("Session storage lock poisoned"))?;
        slots.insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| anyhow!("Session storage lock poisoned"))?;
        slots.remove(&slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session"));

        assert_eq!(storage.get(Slot::Credential).unwrap(), None);

        storage.set(Slot::Credential, "abc").unwrap();
        assert_eq!(storage.get(Slot::Credential).unwrap().as_deref(), Some("abc"));
        assert!(storage.slot_path(Slot::Credential).exists());
        let leftovers = std::fs::read_dir(storage.dir())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().extension().map_or(false, |ext| ext == "tmp"))
            .count();
        assert_eq!(leftovers, 0);

        storage.remove(Slot::Credential).unwrap();
        assert_eq!(storage.get(Slot::Credential).unwrap(), None);
    }

    #[test]
    fn test_concurrent_writers_to_one_slot() {
        let dir = tempfile::tempdir().unwrap();
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let storage = FileStorage::new(dir.path());
                std::thread::spawn(move || {
                    for i in 0..50 {
                        storage.set(Slot::Credential, &format!("tok-{}-{}", w, i)).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let storage = FileStorage::new(dir.path());
        let token = storage.get(Slot::Credential).unwrap().unwrap();
        assert!(token.starts_with("tok-") && token.ends_with("-49"));
        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 1);
    }

    #[test]
    fn test_file_storage_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.remove(Slot::Identity).is_ok());
    }

    #[test]
    fn test_memory_storage_clones_share_slots() {
        let a = MemoryStorage::new();
        let b = a.clone();

        a.set(Slot::Identity, "{}").unwrap();
        assert_eq!(b.get(Slot::Identity).unwrap().as_deref(), Some("{}"));

        b.remove(Slot::Identity).unwrap();
        assert_eq!(a.get(Slot::Identity).unwrap(), None);
    }

    #[test]
    fn test_slot_keys() {
        assert_eq!(Slot::Identity.key(), "hp:user");
        assert_eq!(Slot::Credential.key(), "hp:token");
    }
}
