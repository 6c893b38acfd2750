//! Everything a command needs: config, the shared session and a client.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use healthportal_core::{ApiClient, Config, FileStorage, SessionStore, StorageSignal};
use tracing::{debug, warn};

use crate::cli::Cli;

pub(crate) struct Context {
    pub config: Config,
    pub storage: Arc<FileStorage>,
    pub store: SessionStore,
    pub api: ApiClient,
}

impl Context {
    pub fn open(cli: &Cli) -> Result<Self> {
        let config = Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        });

        let api_url = cli.api_url.clone().unwrap_or_else(|| config.api_url());
        let storage_dir: PathBuf = match cli.storage_dir {
            Some(ref dir) => dir.clone(),
            None => config.storage_dir()?,
        };
        debug!(api_url = %api_url, storage_dir = %storage_dir.display(), "Opening session");

        let storage = Arc::new(FileStorage::new(storage_dir));
        let store = SessionStore::open(storage.clone(), StorageSignal::new());
        let api = ApiClient::new(&api_url, store.clone())?.with_userinfo_url(&config.userinfo_url());

        Ok(Self {
            config,
            storage,
            store,
            api,
        })
    }

    /// Remember the last email used to sign in. Failing to save is not
    /// worth failing the command over.
    pub fn remember_email(&mut self, email: &str) {
        self.config.last_email = Some(email.to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    pub fn require_session(&self) -> Result<()> {
        if !self.store.is_authenticated() {
            anyhow::bail!("Not signed in. Run `healthportal login` first.");
        }
        Ok(())
    }

    pub fn require_admin(&self) -> Result<()> {
        self.require_session()?;
        match self.store.identity() {
            Some(user) if user.is_admin() => Ok(()),
            _ => anyhow::bail!("Admin access required"),
        }
    }
}
