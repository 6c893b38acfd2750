use tokio::sync::broadcast;

/// Events buffered per subscriber before it starts lagging.
/// A lagging subscriber still re-reads storage, so nothing is lost.
const SIGNAL_CAPACITY: usize = 16;

/// Who changed the persisted session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A `SessionStore` in this process, by store id
    Store(u64),
    /// Another process, noticed by a `StorageWatcher`
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageEvent {
    pub origin: Origin,
}

/// "Storage changed" notification shared by every store that uses the
/// same storage. Clones publish to and subscribe from the same channel.
#[derive(Debug, Clone)]
pub struct StorageSignal {
    tx: broadcast::Sender<StorageEvent>,
}

impl StorageSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self { tx }
    }

    pub fn notify(&self, origin: Origin) {
        // No subscribers just means nobody else is listening yet
        let _ = self.tx.send(StorageEvent { origin });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for StorageSignal {
    fn default() -> Self {
        Self::new()
    }
}
