use std::sync::Arc;

use tokio::sync::watch;

use crate::error::AppResult;
use crate::gateway::JournalApi;
use crate::models::stats::StatsSnapshot;
use crate::services::RequestStatus;

/// Cached mirror of the server-computed aggregates. The held snapshot is
/// replaced wholesale on every successful refresh; nothing is derived
/// client-side from the entry collection.
pub struct StatsCache {
    api: Arc<dyn JournalApi>,
    snapshot: watch::Sender<Option<StatsSnapshot>>,
    status: RequestStatus,
}

impl StatsCache {
    pub fn new(api: Arc<dyn JournalApi>) -> Self {
        let (snapshot, _) = watch::channel(None);
        Self {
            api,
            snapshot,
            status: RequestStatus::default(),
        }
    }

    /// Fetch the aggregates and replace the held snapshot.
    pub async fn refresh(&self) -> AppResult<StatsSnapshot> {
        self.status.begin();
        match self.api.stats_summary().await {
            Ok(snapshot) => {
                self.snapshot.send_replace(Some(snapshot.clone()));
                self.status.succeed();
                Ok(snapshot)
            }
            Err(e) => {
                self.status.fail(e.user_message());
                Err(e)
            }
        }
    }

    /// Refresh on the runtime without surfacing the result. Failures are
    /// logged and the previous snapshot stays in place.
    pub fn refresh_in_background(self: &Arc<Self>) {
        let stats = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = stats.refresh().await {
                tracing::warn!(error = %e, "Background stats refresh failed");
            }
        });
    }

    pub fn snapshot(&self) -> Option<StatsSnapshot> {
        self.snapshot.borrow().clone()
    }

    /// Receiver observing the current snapshot and every replacement.
    pub fn subscribe(&self) -> watch::Receiver<Option<StatsSnapshot>> {
        self.snapshot.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn last_error(&self) -> Option<String> {
        self.status.last_error()
    }
}
