use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    adapters::{email::dispatcher::NotificationDispatcher, store::failover::FailoverStore},
    app_error::{AppError, AppResult},
    domain::entities::waitlist_entry::WaitlistEntry,
    validators::{is_valid_email, normalize_email},
};

/// Result of a single backend's attempt to add an email. `stored` and
/// `already_exists` are mutually exclusive; both false means the attempt was
/// inconclusive and the caller may try the next backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddOutcome {
    pub stored: bool,
    pub already_exists: bool,
}

/// A single storage backend for waitlist entries. Two implementations exist:
/// Postgres (primary) and Redis (fallback); `FailoverStore` composes them.
#[async_trait]
pub trait WaitlistBackend: Send + Sync {
    /// Short label surfaced in admin responses ("postgres", "redis").
    fn name(&self) -> &'static str;

    async fn add(&self, email: &str, metadata: Option<serde_json::Value>)
    -> AppResult<AddOutcome>;
    async fn list(&self) -> AppResult<Vec<WaitlistEntry>>;
    /// Returns whether an entry was actually deleted.
    async fn remove(&self, email: &str) -> AppResult<bool>;
    async fn set_unsubscribed(&self, email: &str) -> AppResult<bool>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyJoined,
}

pub struct Roster {
    pub entries: Vec<WaitlistEntry>,
    pub storage: &'static str,
}

pub struct Removal {
    pub removed: bool,
    pub storage: &'static str,
}

pub struct WaitlistUseCases {
    store: Arc<FailoverStore>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl WaitlistUseCases {
    pub fn new(store: Arc<FailoverStore>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    /// Validates and normalizes a signup, persists it, and on a fresh signup
    /// dispatches the confirmation email as a detached task. The send is
    /// at-most-once with no retry and its outcome never affects the caller.
    #[instrument(skip(self))]
    pub async fn join(&self, email: &str, source: Option<String>) -> AppResult<JoinOutcome> {
        if !is_valid_email(email) {
            return Err(AppError::InvalidInput("Invalid email address".into()));
        }
        let email = normalize_email(email);
        let metadata = source.map(|s| serde_json::json!({ "source": s }));

        let report = self.store.add(&email, metadata).await?;
        if report.outcome.already_exists {
            tracing::info!(storage = report.storage, "signup already on waitlist");
            return Ok(JoinOutcome::AlreadyJoined);
        }

        tracing::info!(storage = report.storage, "new waitlist signup");
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move {
            dispatcher.send_confirmation(&email).await;
        });
        Ok(JoinOutcome::Joined)
    }

    #[instrument(skip(self))]
    pub async fn roster(&self) -> AppResult<Roster> {
        let (entries, storage) = self.store.list().await;
        Ok(Roster { entries, storage })
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, email: &str) -> AppResult<Removal> {
        let email = normalize_email(email);
        let (removed, storage) = self.store.remove(&email).await?;
        tracing::info!(removed, storage, "admin delete");
        Ok(Removal { removed, storage })
    }

    /// Idempotent from the caller's perspective: succeeds whether or not the
    /// email was ever on the waitlist, so the response leaks no subscription
    /// status.
    #[instrument(skip(self))]
    pub async fn unsubscribe(&self, email: &str) {
        let email = normalize_email(email);
        let marked = self.store.set_unsubscribed(&email).await;
        tracing::info!(marked, "unsubscribe request processed");
    }
}
