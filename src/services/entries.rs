use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::sync::watch;
use validator::Validate;

use crate::error::AppResult;
use crate::gateway::JournalApi;
use crate::models::entry::{DailyEntry, EntryDraft, EntryQuery};
use crate::services::stats::StatsCache;
use crate::services::RequestStatus;

/// Holds the journal entries the client currently knows about, newest first,
/// at most one per calendar date. All mutations go through this cache so the
/// collection, its subscribers, and the server stay in step.
pub struct EntryCache {
    api: Arc<dyn JournalApi>,
    stats: Arc<StatsCache>,
    entries: watch::Sender<Vec<DailyEntry>>,
    /// Bumped by every applied mutation. A load response is applied only if
    /// the revision still matches the one captured when the load was issued,
    /// so a slow fetch cannot overwrite a faster save or delete.
    revision: AtomicU64,
    status: RequestStatus,
}

impl EntryCache {
    pub fn new(api: Arc<dyn JournalApi>, stats: Arc<StatsCache>) -> Self {
        let (entries, _) = watch::channel(Vec::new());
        Self {
            api,
            stats,
            entries,
            revision: AtomicU64::new(0),
            status: RequestStatus::default(),
        }
    }

    /// Fetch entries matching `query` and replace the held collection with
    /// the response. Loads that lose the race against a concurrent mutation
    /// are discarded; the fetched entries are returned to the caller either
    /// way. A successful load also refreshes stats in the background.
    pub async fn load(&self, query: EntryQuery) -> AppResult<Vec<DailyEntry>> {
        self.status.begin();
        let issued_at = self.revision.load(Ordering::SeqCst);
        match self.api.list_entries(&query).await {
            Ok(fetched) => {
                if !self.try_apply_load(issued_at, &fetched) {
                    tracing::debug!(
                        count = fetched.len(),
                        "Discarding stale entry load, collection changed while in flight"
                    );
                }
                self.status.succeed();
                self.stats.refresh_in_background();
                Ok(fetched)
            }
            Err(e) => {
                self.status.fail(e.user_message());
                Err(e)
            }
        }
    }

    /// Validate `draft`, post it, and upsert the canonical entry the server
    /// returns into the held collection by date. Refreshes stats in the
    /// background on success.
    pub async fn save(&self, draft: &EntryDraft) -> AppResult<DailyEntry> {
        draft.validate()?;
        self.status.begin();
        match self.api.save_entry(draft).await {
            Ok(saved) => {
                self.upsert(saved.clone());
                self.status.succeed();
                self.stats.refresh_in_background();
                Ok(saved)
            }
            Err(e) => {
                self.status.fail(e.user_message());
                Err(e)
            }
        }
    }

    /// Delete the entry on the server, then drop it from the held
    /// collection. Stats are left as-is; the next load or save refreshes
    /// them.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.status.begin();
        match self.api.delete_entry(id).await {
            Ok(()) => {
                self.remove(id);
                self.status.succeed();
                Ok(())
            }
            Err(e) => {
                self.status.fail(e.user_message());
                Err(e)
            }
        }
    }

    /// Fetch a single entry by id without touching the held collection.
    pub async fn fetch(&self, id: i64) -> AppResult<DailyEntry> {
        self.api.get_entry(id).await
    }

    /// The held entry for the current local calendar day, if any.
    pub fn today_entry(&self) -> Option<DailyEntry> {
        let today = Local::now().date_naive();
        entry_for_date(&self.entries.borrow(), today)
    }

    /// Snapshot of the held collection.
    pub fn entries(&self) -> Vec<DailyEntry> {
        self.entries.borrow().clone()
    }

    /// Receiver observing the current collection and every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<DailyEntry>> {
        self.entries.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn last_error(&self) -> Option<String> {
        self.status.last_error()
    }

    /// Replace the collection with `fetched` unless a mutation landed after
    /// the load was issued. The check and the swap run inside the watch
    /// channel's closure, atomically with respect to other mutations.
    fn try_apply_load(&self, issued_at: u64, fetched: &[DailyEntry]) -> bool {
        let mut applied = false;
        self.entries.send_if_modified(|current| {
            if self.revision.load(Ordering::SeqCst) != issued_at {
                return false;
            }
            self.revision.fetch_add(1, Ordering::SeqCst);
            *current = fetched.to_vec();
            applied = true;
            true
        });
        applied
    }

    /// Replace the element sharing the entry's date, or prepend when the
    /// date is new.
    fn upsert(&self, entry: DailyEntry) {
        self.entries.send_modify(|current| {
            self.revision.fetch_add(1, Ordering::SeqCst);
            match current.iter_mut().find(|held| held.date == entry.date) {
                Some(slot) => *slot = entry,
                None => current.insert(0, entry),
            }
        });
    }

    /// Drop the entry with `id`. An absent id leaves the collection
    /// untouched and notifies nobody, but still counts as a mutation so
    /// in-flight loads cannot resurrect the deleted entry.
    fn remove(&self, id: i64) {
        self.entries.send_if_modified(|current| {
            self.revision.fetch_add(1, Ordering::SeqCst);
            let before = current.len();
            current.retain(|held| held.id != Some(id));
            current.len() != before
        });
    }
}

/// First entry whose calendar date matches `date`.
fn entry_for_date(entries: &[DailyEntry], date: NaiveDate) -> Option<DailyEntry> {
    entries.iter().find(|entry| entry.date == date).cloned()
}
