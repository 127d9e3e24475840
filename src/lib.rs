//! Client-side state layer for MoodlyPulse, a personal well-being journal.
//!
//! Wraps the remote HTTP API behind three caches: [`SessionStore`] for the
//! authenticated identity, [`EntryCache`] for the journal entries the client
//! currently knows about, and [`StatsCache`] for the server-computed
//! aggregates. Each cache broadcasts its state over a watch channel; the
//! session survives restarts through a small file-backed store.
//!
//! [`SessionStore`]: services::session::SessionStore
//! [`EntryCache`]: services::entries::EntryCache
//! [`StatsCache`]: services::stats::StatsCache

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;
pub mod storage;

#[cfg(test)]
pub(crate) mod testutil;

use config::Config;
use gateway::{HttpGateway, JournalApi};
use services::entries::EntryCache;
use services::session::SessionStore;
use services::stats::StatsCache;
use storage::Storage;

pub use error::{AppError, AppResult};

/// Shared handle to the wired-up client: configuration plus the three
/// caches. Cloning is cheap and every clone sees the same state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<SessionStore>,
    pub entries: Arc<EntryCache>,
    pub stats: Arc<StatsCache>,
}

impl AppState {
    /// Wire the full dependency graph against the real backend.
    pub fn init(config: Config) -> AppResult<Self> {
        let storage = Arc::new(Storage::open(&config.data_dir)?);
        let api: Arc<dyn JournalApi> = Arc::new(HttpGateway::new(
            config.api_base_url.clone(),
            Arc::clone(&storage),
        ));
        Ok(Self::with_api(config, api, storage))
    }

    /// Same wiring with the backend swapped out, for embedding and tests.
    pub fn with_api(config: Config, api: Arc<dyn JournalApi>, storage: Arc<Storage>) -> Self {
        let stats = Arc::new(StatsCache::new(Arc::clone(&api)));
        let entries = Arc::new(EntryCache::new(Arc::clone(&api), Arc::clone(&stats)));
        let session = Arc::new(SessionStore::new(api, storage));
        Self {
            config: Arc::new(config),
            session,
            entries,
            stats,
        }
    }
}
