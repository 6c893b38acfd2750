//! HealthPortal client library.
//!
//! - `auth`: the session store, its durable slots and the change signal
//!   that keeps every open store in step, plus the login/signup flows
//! - `api`: REST client that attaches the session credential per request
//! - `models`: backend entities
//! - `search`: client-side filtering and optimistic list updates
//! - `dashboard`: state behind the user and admin screens
//! - `config`: persisted settings

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod search;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{FileStorage, SessionStore, StorageSignal, StorageWatcher};
pub use config::Config;
