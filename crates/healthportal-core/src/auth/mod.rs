//! Authentication module: the session store and the sign-in flows.
//!
//! This module provides:
//! - `SessionStore`: the single source of truth for who is signed in,
//!   persisted through a `SessionStorage` and kept in step with other
//!   stores through a `StorageSignal`
//! - `StorageWatcher`: bridges storage changes made by other processes
//!   onto the signal
//! - `LoginFlow` / `SignupFlow`: OTP based sign-in, password reset and
//!   Google sign-in
//!
//! Every mutation of the persisted session is followed by a signal, and
//! every store (including the one that made the change) converges by
//! re-reading storage when it sees that signal.

pub mod error;
pub mod flow;
pub mod session;
pub mod signal;
pub mod storage;
pub mod watcher;

pub use error::{FlowError, SessionError};
pub use flow::{LoginFlow, LoginStep, SignedIn, SignupFlow, SignupOutcome, SignupStep};
pub use session::{AuthTicket, Session, SessionState, SessionStore, SyncHandle};
pub use signal::{Origin, StorageEvent, StorageSignal};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, Slot};
pub use watcher::StorageWatcher;
