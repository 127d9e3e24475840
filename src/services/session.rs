use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use validator::Validate;

use crate::error::AppResult;
use crate::gateway::JournalApi;
use crate::models::user::{LoginRequest, RegisterRequest, Session, User};
use crate::services::RequestStatus;
use crate::storage::{Storage, AUTH_TOKEN_KEY, CURRENT_USER_KEY};

/// Holds the authenticated identity and keeps it in step with durable
/// storage. Constructed once at startup; any persisted session is restored
/// then, so the user stays signed in across restarts.
pub struct SessionStore {
    api: Arc<dyn JournalApi>,
    storage: Arc<Storage>,
    user: watch::Sender<Option<User>>,
    status: RequestStatus,
}

impl SessionStore {
    pub fn new(api: Arc<dyn JournalApi>, storage: Arc<Storage>) -> Self {
        let restored = restore_user(&storage);
        let (user, _) = watch::channel(restored);
        Self {
            api,
            storage,
            user,
            status: RequestStatus::default(),
        }
    }

    /// Validate the credential shape, authenticate against the backend, and
    /// persist the returned session.
    pub async fn login(&self, credentials: &LoginRequest) -> AppResult<Session> {
        credentials.validate()?;
        self.status.begin();
        let outcome = self.api.login(credentials).await;
        self.complete_auth(outcome)
    }

    /// Same flow as [`login`] for new accounts. The confirmation password is
    /// checked here and never serialized.
    pub async fn register(&self, registration: &RegisterRequest) -> AppResult<Session> {
        registration.validate()?;
        self.status.begin();
        let outcome = self.api.register(registration).await;
        self.complete_auth(outcome)
    }

    /// Clear the persisted and in-memory session. Storage failures are
    /// logged and swallowed; the in-memory identity always resets.
    pub fn logout(&self) {
        clear_persisted(&self.storage);
        self.user.send_replace(None);
    }

    /// Persisted bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.storage.get(AUTH_TOKEN_KEY)
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.borrow().is_some()
    }

    /// Receiver observing the current identity and every authentication
    /// transition.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn last_error(&self) -> Option<String> {
        self.status.last_error()
    }

    fn complete_auth(&self, outcome: AppResult<Session>) -> AppResult<Session> {
        let stored = outcome.and_then(|session| {
            self.store_session(&session)?;
            Ok(session)
        });
        match stored {
            Ok(session) => {
                self.status.succeed();
                Ok(session)
            }
            Err(e) => {
                self.status.fail(e.user_message());
                Err(e)
            }
        }
    }

    /// Persist token and user in one storage write, then broadcast the new
    /// identity. A session that cannot be persisted is rolled back so the
    /// stored token never outlives a failed login.
    fn store_session(&self, session: &Session) -> AppResult<()> {
        let user_json = serde_json::to_string(&session.user)
            .context("Failed to serialize user for storage")?;
        let written = self.storage.update(|values| {
            values.insert(AUTH_TOKEN_KEY.into(), session.token.clone());
            values.insert(CURRENT_USER_KEY.into(), user_json);
        });
        if let Err(e) = written {
            clear_persisted(&self.storage);
            return Err(e);
        }
        self.user.send_replace(Some(session.user.clone()));
        Ok(())
    }
}

/// Read the persisted identity. A corrupt or half-written session (token
/// without user, unreadable user payload) degrades to logged out and both
/// keys are cleared.
fn restore_user(storage: &Storage) -> Option<User> {
    match (storage.get(AUTH_TOKEN_KEY), storage.get(CURRENT_USER_KEY)) {
        (Some(_), Some(raw)) => match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable persisted session");
                clear_persisted(storage);
                None
            }
        },
        (None, None) => None,
        _ => {
            clear_persisted(storage);
            None
        }
    }
}

fn clear_persisted(storage: &Storage) {
    let cleared = storage.update(|values| {
        values.remove(AUTH_TOKEN_KEY);
        values.remove(CURRENT_USER_KEY);
    });
    if let Err(e) = cleared {
        tracing::warn!(error = %e, "Failed to clear persisted session");
    }
}
