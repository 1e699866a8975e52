//! Test utilities: in-memory backend and mailer implementations plus a
//! builder for assembling an `AppState` without Postgres, Redis, or a real
//! email provider.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::HeaderValue;
use secrecy::SecretString;

use crate::{
    adapters::{
        email::{Mailer, dispatcher::NotificationDispatcher},
        http::app_state::AppState,
        store::failover::FailoverStore,
    },
    app_error::{AppError, AppResult},
    domain::entities::waitlist_entry::WaitlistEntry,
    infra::config::AppConfig,
    use_cases::waitlist::{AddOutcome, WaitlistBackend, WaitlistUseCases},
};

pub const TEST_ADMIN_SECRET: &str = "test-admin-secret";

/// In-memory `WaitlistBackend`. Keeps insertion order; `failing` variants
/// error on every call to simulate an unreachable backend.
pub struct InMemoryBackend {
    name: &'static str,
    entries: Mutex<Vec<WaitlistEntry>>,
    fail: bool,
}

impl InMemoryBackend {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            entries: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Snapshot of the stored entries, for assertions.
    pub fn entries(&self) -> Vec<WaitlistEntry> {
        self.entries.lock().unwrap().clone()
    }

    fn check_available(&self) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Database("backend unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl WaitlistBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn add(
        &self,
        email: &str,
        metadata: Option<serde_json::Value>,
    ) -> AppResult<AddOutcome> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().any(|e| e.email == email) {
            return Ok(AddOutcome {
                stored: false,
                already_exists: true,
            });
        }
        entries.push(WaitlistEntry::new(email.to_string(), metadata));
        Ok(AddOutcome {
            stored: true,
            already_exists: false,
        })
    }

    async fn list(&self) -> AppResult<Vec<WaitlistEntry>> {
        self.check_available()?;
        Ok(self.entries())
    }

    async fn remove(&self, email: &str) -> AppResult<bool> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| e.email != email);
        Ok(entries.len() < before)
    }

    async fn set_unsubscribed(&self, email: &str) -> AppResult<bool> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        match entries.iter_mut().find(|e| e.email == email) {
            Some(entry) => {
                entry.unsubscribed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// `Mailer` that records every send instead of talking to a provider.
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for RecordingMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, to: &str, subject: &str, text: &str, html: &str) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Internal("provider rejected the message".into()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            text: text.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}

pub fn dispatcher_with(mailer: Arc<RecordingMailer>) -> NotificationDispatcher {
    NotificationDispatcher::new(Some(mailer as Arc<dyn Mailer>), "http://localhost:3000".into())
}

pub fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:3001".parse().unwrap(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        database_url: None,
        kv_url: None,
        kv_token: None,
        admin_secret: SecretString::new(TEST_ADMIN_SECRET.into()),
        resend_api_key: None,
        sendgrid_api_key: None,
        email_from: "Waitlist <waitlist@example.com>".to_string(),
        app_origin: "http://localhost:3000".to_string(),
    }
}

/// Builder for an `AppState` backed entirely by in-memory doubles.
pub struct TestAppStateBuilder {
    primary: Option<Arc<dyn WaitlistBackend>>,
    fallback: Option<Arc<dyn WaitlistBackend>>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            primary: None,
            fallback: None,
        }
    }

    pub fn with_primary(mut self, backend: Arc<dyn WaitlistBackend>) -> Self {
        self.primary = Some(backend);
        self
    }

    pub fn with_fallback(mut self, backend: Arc<dyn WaitlistBackend>) -> Self {
        self.fallback = Some(backend);
        self
    }

    pub fn build(self) -> AppState {
        let config = Arc::new(test_config());
        let store = Arc::new(FailoverStore::new(self.primary, self.fallback));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            None,
            config.app_origin.clone(),
        ));
        let waitlist = Arc::new(WaitlistUseCases::new(store, dispatcher));

        AppState { config, waitlist }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
