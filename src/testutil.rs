//! Test doubles and fixtures shared by the service tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Notify;

use crate::error::{AppError, AppResult};
use crate::gateway::JournalApi;
use crate::models::entry::{DailyEntry, EntryDraft, EntryQuery};
use crate::models::stats::{PeriodStats, StatsSnapshot};
use crate::models::user::{LoginRequest, RegisterRequest, Session, User};
use crate::storage::Storage;

/// Which gateway method a [`FakeApi`] saw, with the payload it was given.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Login { email: String },
    Register { email: String },
    ListEntries,
    GetEntry { id: i64 },
    SaveEntry { date: NaiveDate },
    DeleteEntry { id: i64 },
    StatsSummary,
}

/// Two-sided latch holding one gated call open: the test awaits `entered`,
/// the gated call awaits `release`. Both sides rely on stored permits, so
/// arming and waiting can happen in either order.
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// Wait until the gated call has been issued and is parked.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the gated call proceed.
    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// Scripted [`JournalApi`] double. Every call records itself and pops the
/// next queued result; an unqueued call answers with an internal error.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<ApiCall>>,
    logins: Mutex<VecDeque<AppResult<Session>>>,
    registers: Mutex<VecDeque<AppResult<Session>>>,
    lists: Mutex<VecDeque<AppResult<Vec<DailyEntry>>>>,
    gets: Mutex<VecDeque<AppResult<DailyEntry>>>,
    saves: Mutex<VecDeque<AppResult<DailyEntry>>>,
    deletes: Mutex<VecDeque<AppResult<()>>>,
    stats: Mutex<VecDeque<AppResult<StatsSnapshot>>>,
    list_gates: Mutex<VecDeque<Arc<Gate>>>,
}

impl FakeApi {
    pub fn queue_login(&self, result: AppResult<Session>) {
        self.logins.lock().unwrap().push_back(result);
    }

    pub fn queue_register(&self, result: AppResult<Session>) {
        self.registers.lock().unwrap().push_back(result);
    }

    pub fn queue_list(&self, result: AppResult<Vec<DailyEntry>>) {
        self.lists.lock().unwrap().push_back(result);
    }

    pub fn queue_get(&self, result: AppResult<DailyEntry>) {
        self.gets.lock().unwrap().push_back(result);
    }

    pub fn queue_save(&self, result: AppResult<DailyEntry>) {
        self.saves.lock().unwrap().push_back(result);
    }

    pub fn queue_delete(&self, result: AppResult<()>) {
        self.deletes.lock().unwrap().push_back(result);
    }

    pub fn queue_stats(&self, result: AppResult<StatsSnapshot>) {
        self.stats.lock().unwrap().push_back(result);
    }

    /// Arm a gate for the next `list_entries` call. Gates apply in call
    /// order, one per call.
    pub fn gate_next_list(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.list_gates.lock().unwrap().push_back(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn pop<T>(queue: &Mutex<VecDeque<AppResult<T>>>, method: &str) -> AppResult<T> {
        queue.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(AppError::Internal(anyhow::anyhow!(
                "no scripted response for {method}"
            )))
        })
    }
}

#[async_trait]
impl JournalApi for FakeApi {
    async fn login(&self, credentials: &LoginRequest) -> AppResult<Session> {
        self.record(ApiCall::Login {
            email: credentials.email.clone(),
        });
        Self::pop(&self.logins, "login")
    }

    async fn register(&self, registration: &RegisterRequest) -> AppResult<Session> {
        self.record(ApiCall::Register {
            email: registration.email.clone(),
        });
        Self::pop(&self.registers, "register")
    }

    async fn list_entries(&self, _query: &EntryQuery) -> AppResult<Vec<DailyEntry>> {
        self.record(ApiCall::ListEntries);
        // Result is taken at call time so release order cannot reshuffle
        // responses between concurrent calls.
        let result = Self::pop(&self.lists, "list_entries");
        let gate = self.list_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        result
    }

    async fn get_entry(&self, id: i64) -> AppResult<DailyEntry> {
        self.record(ApiCall::GetEntry { id });
        Self::pop(&self.gets, "get_entry")
    }

    async fn save_entry(&self, draft: &EntryDraft) -> AppResult<DailyEntry> {
        self.record(ApiCall::SaveEntry { date: draft.date });
        Self::pop(&self.saves, "save_entry")
    }

    async fn delete_entry(&self, id: i64) -> AppResult<()> {
        self.record(ApiCall::DeleteEntry { id });
        Self::pop(&self.deletes, "delete_entry")
    }

    async fn stats_summary(&self) -> AppResult<StatsSnapshot> {
        self.record(ApiCall::StatsSummary);
        Self::pop(&self.stats, "stats_summary")
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn make_entry(id: i64, date: NaiveDate, mood: i32) -> DailyEntry {
    DailyEntry {
        id: Some(id),
        user_id: Some(1),
        date,
        mood,
        sleep_hours: 7.5,
        water_cups: 8,
        sport_min: 30,
        note: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn make_user(id: i64, email: &str) -> User {
    User {
        id,
        email: email.into(),
        firstname: Some("Léa".into()),
        lastname: Some("Martin".into()),
        created_at: None,
        updated_at: None,
    }
}

pub fn make_session(token: &str) -> Session {
    Session {
        token: token.into(),
        user: make_user(1, "lea@example.com"),
    }
}

pub fn make_stats(total_entries: i64) -> StatsSnapshot {
    StatsSnapshot {
        total_entries,
        average_mood: 3.8,
        average_sleep: 7.2,
        total_water_cups: 42,
        total_sport_min: 180,
        current_streak: 3,
        weekly_stats: PeriodStats {
            average_mood: 4.0,
            average_sleep: 7.0,
            total_water_cups: 20,
            total_sport_min: 90,
            entries_count: 5,
        },
        monthly_stats: PeriodStats {
            average_mood: 3.6,
            average_sleep: 7.3,
            total_water_cups: 42,
            total_sport_min: 180,
            entries_count: total_entries,
        },
    }
}

pub fn temp_storage() -> (tempfile::TempDir, Arc<Storage>) {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(Storage::open(dir.path()).unwrap());
    (dir, storage)
}

/// Route tracing output to the test harness. Safe to call from several
/// tests; only the first call installs a subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodlypulse_client=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
