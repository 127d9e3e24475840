use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{AppError, AppResult, GENERIC_ERROR_MESSAGE};
use crate::models::entry::{DailyEntry, EntryDraft, EntryQuery};
use crate::models::stats::StatsSnapshot;
use crate::models::user::{LoginRequest, RegisterRequest, Session};
use crate::storage::{Storage, AUTH_TOKEN_KEY};

/// Backend surface the caches talk to. Implemented by [`HttpGateway`] in
/// production; tests swap in a scripted fake.
#[async_trait]
pub trait JournalApi: Send + Sync {
    async fn login(&self, credentials: &LoginRequest) -> AppResult<Session>;
    async fn register(&self, registration: &RegisterRequest) -> AppResult<Session>;
    async fn list_entries(&self, query: &EntryQuery) -> AppResult<Vec<DailyEntry>>;
    async fn get_entry(&self, id: i64) -> AppResult<DailyEntry>;
    async fn save_entry(&self, draft: &EntryDraft) -> AppResult<DailyEntry>;
    async fn delete_entry(&self, id: i64) -> AppResult<()>;
    async fn stats_summary(&self) -> AppResult<StatsSnapshot>;
}

/// Error envelope the backend returns on non-2xx responses. Older server
/// versions fill `error`, newer ones `message`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Turn a failed response into [`AppError::Api`], preferring the server's own
/// message when the body carries one.
fn api_error(status: u16, body: &str) -> AppError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|envelope| envelope.message.or(envelope.error))
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
    AppError::Api { status, message }
}

/// reqwest-backed [`JournalApi`] against the MoodlyPulse backend. Attaches the
/// persisted bearer token to every request; requests without a stored session
/// go out bare and the server answers 401.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    storage: Arc<Storage>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, storage: Arc<Storage>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            storage,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.storage.get(AUTH_TOKEN_KEY) {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> AppResult<T> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(response.json().await?)
    }

    /// Like `execute` but discards the body. DELETE answers vary between
    /// 200-with-body and 204 across backend versions; any 2xx counts.
    async fn execute_no_content(&self, request: reqwest::RequestBuilder) -> AppResult<()> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(())
    }
}

#[async_trait]
impl JournalApi for HttpGateway {
    async fn login(&self, credentials: &LoginRequest) -> AppResult<Session> {
        self.execute(self.client.post(self.url("/auth/login")).json(credentials))
            .await
    }

    async fn register(&self, registration: &RegisterRequest) -> AppResult<Session> {
        self.execute(
            self.client
                .post(self.url("/auth/register"))
                .json(registration),
        )
        .await
    }

    async fn list_entries(&self, query: &EntryQuery) -> AppResult<Vec<DailyEntry>> {
        self.execute(self.client.get(self.url("/entries")).query(query))
            .await
    }

    async fn get_entry(&self, id: i64) -> AppResult<DailyEntry> {
        self.execute(self.client.get(self.url(&format!("/entries/{}", id))))
            .await
    }

    async fn save_entry(&self, draft: &EntryDraft) -> AppResult<DailyEntry> {
        self.execute(self.client.post(self.url("/entries")).json(draft))
            .await
    }

    async fn delete_entry(&self, id: i64) -> AppResult<()> {
        self.execute_no_content(self.client.delete(self.url(&format!("/entries/{}", id))))
            .await
    }

    async fn stats_summary(&self) -> AppResult<StatsSnapshot> {
        self.execute(self.client.get(self.url("/stats/summary")))
            .await
    }
}
