//! The session store.
//!
//! `SessionStore` is a cheap, cloneable handle. Pass it to whatever needs
//! to know who is signed in; there is no global instance. The in-memory
//! session is only ever changed by re-reading storage, whether the change
//! came from this store, another store in this process, or another
//! process, so every observer ends up with the same view.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{Origin, SessionError, SessionStorage, Slot, StorageSignal};
use crate::models::User;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub identity: Option<User>,
    pub credential: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

impl Session {
    /// Holding a credential is what makes a session authenticated; the
    /// identity may still be on its way.
    pub fn state(&self) -> SessionState {
        if self.credential.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }
}

/// Proof that a sign-in started at a given session generation.
///
/// `logout()` and any observed authenticated -> anonymous transition move
/// the generation forward, so a sign-in that completes afterwards is
/// refused instead of silently signing the user back in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthTicket {
    generation: u64,
}

struct Inner {
    id: u64,
    storage: Arc<dyn SessionStorage>,
    signal: StorageSignal,
    state: RwLock<Session>,
    generation: AtomicU64,
    // Serializes writers so a completion cannot interleave with a logout
    writer: Mutex<()>,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Create a store and hydrate it from storage. Unreadable or malformed
    /// slots hydrate as absent.
    pub fn open(storage: Arc<dyn SessionStorage>, signal: StorageSignal) -> Self {
        let store = Self {
            inner: Arc::new(Inner {
                id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
                storage,
                signal,
                state: RwLock::new(Session::default()),
                generation: AtomicU64::new(0),
                writer: Mutex::new(()),
            }),
        };
        let session = store.rehydrate();
        debug!(
            store = store.inner.id,
            authenticated = session.is_authenticated(),
            "Session store opened"
        );
        store
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn signal(&self) -> &StorageSignal {
        &self.inner.signal
    }

    pub fn session(&self) -> Session {
        self.read_state().clone()
    }

    pub fn identity(&self) -> Option<User> {
        self.read_state().identity.clone()
    }

    /// The credential as of right now. Request builders call this for every
    /// request rather than keeping a copy.
    pub fn credential(&self) -> Option<String> {
        self.read_state().credential.clone()
    }

    pub fn state(&self) -> SessionState {
        self.read_state().state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().is_authenticated()
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Replace the cached identity. `None` removes the persisted slot.
    pub fn set_identity(&self, user: Option<User>) {
        let _guard = self.lock_writer();
        self.write_identity(user.as_ref());
        self.publish();
    }

    /// Replace the credential. `None` removes the persisted slot.
    pub fn set_credential(&self, token: Option<String>) {
        let _guard = self.lock_writer();
        self.write_credential(token.as_deref());
        self.publish();
    }

    /// Clear identity and credential everywhere.
    ///
    /// The clearing is persisted, then announced on the signal; this store
    /// converges through the same re-read every other listener performs.
    pub fn logout(&self) {
        let _guard = self.lock_writer();
        self.write_identity(None);
        self.write_credential(None);
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(store = self.inner.id, generation, "Logged out");
        self.publish();
    }

    /// Logout caused by the backend rejecting the credential
    pub fn invalidate(&self) {
        warn!(store = self.inner.id, "Credential rejected by server, clearing session");
        self.logout();
    }

    /// Record the generation a sign-in starts from
    pub fn begin_auth(&self) -> AuthTicket {
        AuthTicket {
            generation: self.generation(),
        }
    }

    /// Establish the session from a completed sign-in, unless the session
    /// was cleared since `ticket` was taken.
    pub fn complete_auth(
        &self,
        ticket: AuthTicket,
        user: User,
        token: String,
    ) -> Result<(), SessionError> {
        let _guard = self.lock_writer();
        let current = self.generation();
        if ticket.generation != current {
            info!(
                store = self.inner.id,
                started = ticket.generation,
                current,
                "Discarding sign-in that finished after logout"
            );
            return Err(SessionError::Superseded);
        }

        self.write_credential(Some(&token));
        self.write_identity(Some(&user));
        info!(store = self.inner.id, user = %user.id, role = %user.role, "Signed in");
        self.publish();
        Ok(())
    }

    /// Re-read both slots from storage and make them the in-memory session.
    ///
    /// This is the storage-changed handler: whatever storage holds when it
    /// runs wins.
    pub fn rehydrate(&self) -> Session {
        let identity = self
            .read_slot(Slot::Identity)
            .and_then(|raw| match serde_json::from_str::<Option<User>>(&raw) {
                Ok(user) => user,
                Err(e) => {
                    warn!(error = %e, "Ignoring malformed persisted identity");
                    None
                }
            });
        let credential = self.read_slot(Slot::Credential).filter(|t| !t.is_empty());
        let session = Session {
            identity,
            credential,
        };

        let mut state = self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if state.is_authenticated() && !session.is_authenticated() {
            // Cleared by someone else; in-flight sign-ins are now stale
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
        }
        if *state != session {
            debug!(
                store = self.inner.id,
                authenticated = session.is_authenticated(),
                "Session changed"
            );
        }
        *state = session.clone();
        session
    }

    /// Listen for storage-changed events and re-hydrate on each one.
    ///
    /// Must be called from within a tokio runtime. The listener stops when
    /// the returned handle is dropped or the store goes away.
    pub fn spawn_sync(&self) -> SyncHandle {
        let mut rx = self.inner.signal.subscribe();
        let weak = Arc::downgrade(&self.inner);
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => debug!(origin = ?event.origin, "Storage changed"),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Storage signal lagged, re-reading anyway")
                    }
                    Err(RecvError::Closed) => break,
                }
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                SessionStore { inner }.rehydrate();
            }
        });
        SyncHandle { task }
    }

    fn publish(&self) {
        self.inner.signal.notify(Origin::Store(self.inner.id));
        self.rehydrate();
    }

    fn read_slot(&self, slot: Slot) -> Option<String> {
        match self.inner.storage.get(slot) {
            Ok(value) => value,
            Err(e) => {
                warn!(slot = slot.key(), error = %e, "Failed to read session storage");
                None
            }
        }
    }

    fn write_identity(&self, user: Option<&User>) {
        let result = match user {
            Some(user) => serde_json::to_string(user)
                .map_err(anyhow::Error::from)
                .and_then(|json| self.inner.storage.set(Slot::Identity, &json)),
            None => self.inner.storage.remove(Slot::Identity),
        };
        if let Err(e) = result {
            warn!(slot = Slot::Identity.key(), error = %e, "Failed to save session");
        }
    }

    fn write_credential(&self, token: Option<&str>) {
        let result = match token {
            Some(token) => self.inner.storage.set(Slot::Credential, token),
            None => self.inner.storage.remove(Slot::Credential),
        };
        if let Err(e) = result {
            warn!(slot = Slot::Credential.key(), error = %e, "Failed to save session");
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Session> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.inner
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .field("generation", &self.generation())
            .finish()
    }
}

/// Keeps a store's storage listener alive
pub struct SyncHandle {
    task: JoinHandle<()>,
}

impl SyncHandle {
    pub fn stop(self) {}
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// Tests
// ============================================================================
