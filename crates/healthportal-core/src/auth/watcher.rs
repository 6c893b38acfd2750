//! Polls session storage for changes made by other processes.
//!
//! Stores in one process share a `StorageSignal` directly. A second
//! process writing the same storage directory cannot reach that channel,
//! so the watcher compares the slots at an interval and raises an
//! `Origin::External` event whenever they differ from the last look.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{Origin, SessionStorage, Slot, StorageSignal};

/// Default polling interval.
/// Fast enough that a logout elsewhere shows up before the next command.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

type Snapshot = [Option<String>; 2];

pub struct StorageWatcher {
    storage: Arc<dyn SessionStorage>,
    signal: StorageSignal,
    interval: Duration,
    last: Snapshot,
}

impl StorageWatcher {
    pub fn new(storage: Arc<dyn SessionStorage>, signal: StorageSignal) -> Self {
        let last = Self::snapshot(storage.as_ref());
        Self {
            storage,
            signal,
            interval: DEFAULT_POLL_INTERVAL,
            last,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Check once; returns true (and signals) if storage changed
    pub fn poll_once(&mut self) -> bool {
        let current = Self::snapshot(self.storage.as_ref());
        if current == self.last {
            return false;
        }
        debug!("Session storage changed externally");
        self.last = current;
        self.signal.notify(Origin::External);
        true
    }

    /// Poll forever on the current tokio runtime
    pub fn spawn(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.poll_once();
            }
        })
    }

    fn snapshot(storage: &dyn SessionStorage) -> Snapshot {
        Slot::ALL.map(|slot| match storage.get(slot) {
            Ok(value) => value,
            Err(e) => {
                warn!(slot = slot.key(), error = %e, "Failed to poll session storage");
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{FileStorage, SessionStore};

    #[test]
    fn test_poll_once_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path()));
        let signal = StorageSignal::new();
        let mut rx = signal.subscribe();
        let mut watcher = StorageWatcher::new(storage.clone(), signal.clone());

        assert!(!watcher.poll_once());

        storage.set(Slot::Credential, "abc").unwrap();
        assert!(watcher.poll_once());
        assert_eq!(rx.try_recv().unwrap().origin, Origin::External);

        // Same contents, nothing to report
        assert!(!watcher.poll_once());

        storage.remove(Slot::Credential).unwrap();
        assert!(watcher.poll_once());
    }

    #[tokio::test]
    async fn test_spawned_watcher_syncs_store() {
        let dir = tempfile::tempdir().unwrap();
        let signal = StorageSignal::new();

        // Two handles on one directory, as two processes would have
        let ours = Arc::new(FileStorage::new(dir.path()));
        let theirs = FileStorage::new(dir.path());

        let store = SessionStore::open(ours.clone(), signal.clone());
        let _sync = store.spawn_sync();
        let watcher = StorageWatcher::new(ours, signal)
            .with_interval(Duration::from_millis(10))
            .spawn();

        theirs.set(Slot::Identity, r#"{"id":"u1","role":"user"}"#).unwrap();
        theirs.set(Slot::Credential, "abc").unwrap();

        tokio::time::timeout(Duration::from_secs(2), async {
            while store.credential().as_deref() != Some("abc") {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("store did not pick up external sign-in");
        assert_eq!(store.identity().unwrap().id, "u1");

        watcher.abort();
    }
}
