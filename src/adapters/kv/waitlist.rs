use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use redis::{AsyncCommands, aio::ConnectionManager};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::waitlist_entry::WaitlistEntry,
    use_cases::waitlist::{AddOutcome, WaitlistBackend},
};

const ALL_KEY: &str = "waitlist:all";
const UNSUBSCRIBED_ALL_KEY: &str = "unsubscribed:all";

/// Key-value fallback backend. Presence on the waitlist is a set membership
/// plus a per-email timestamp key, which makes the add path naturally
/// idempotent (a single key write, no read-then-insert race).
#[derive(Clone)]
pub struct RedisWaitlistStore {
    manager: ConnectionManager,
}

impl RedisWaitlistStore {
    pub async fn new(kv_url: &str, token: Option<&SecretString>) -> AppResult<Self> {
        let mut url = Url::parse(kv_url)
            .map_err(|e| AppError::Internal(format!("Invalid KV URL: {e}")))?;
        if let Some(token) = token {
            url.set_password(Some(token.expose_secret()))
                .map_err(|_| AppError::Internal("KV URL cannot carry a password".into()))?;
        }

        let client = redis::Client::open(url.as_str()).map_err(|e| {
            AppError::Internal(format!("KV connection failed (check KV token/URL): {e}"))
        })?;
        let manager = ConnectionManager::new(client).await.map_err(|e| {
            AppError::Internal(format!("KV auth/connection failed (check KV token/URL): {e}"))
        })?;

        Ok(Self { manager })
    }

    fn entry_key(email: &str) -> String {
        format!("waitlist:{email}")
    }

    fn unsubscribed_key(email: &str) -> String {
        format!("unsubscribed:{email}")
    }
}

fn kv_err(e: redis::RedisError) -> AppError {
    AppError::Internal(e.to_string())
}

fn parse_timestamp(raw: Option<String>) -> NaiveDateTime {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.naive_utc())
        .unwrap_or_else(|| Utc::now().naive_utc())
}

#[async_trait]
impl WaitlistBackend for RedisWaitlistStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn add(
        &self,
        email: &str,
        _metadata: Option<serde_json::Value>,
    ) -> AppResult<AddOutcome> {
        let mut conn = self.manager.clone();

        let present: bool = conn.sismember(ALL_KEY, email).await.map_err(kv_err)?;
        if present {
            return Ok(AddOutcome {
                stored: false,
                already_exists: true,
            });
        }

        let now = Utc::now().to_rfc3339();
        let _: () = conn
            .set(Self::entry_key(email), now)
            .await
            .map_err(kv_err)?;
        let _: () = conn.sadd(ALL_KEY, email).await.map_err(kv_err)?;

        Ok(AddOutcome {
            stored: true,
            already_exists: false,
        })
    }

    async fn list(&self) -> AppResult<Vec<WaitlistEntry>> {
        let mut conn = self.manager.clone();

        let emails: Vec<String> = conn.smembers(ALL_KEY).await.map_err(kv_err)?;
        let unsubscribed: HashSet<String> = conn
            .smembers(UNSUBSCRIBED_ALL_KEY)
            .await
            .map_err(kv_err)?;

        let mut entries = Vec::with_capacity(emails.len());
        for email in emails {
            let raw: Option<String> = conn.get(Self::entry_key(&email)).await.map_err(kv_err)?;
            entries.push(WaitlistEntry {
                created_at: parse_timestamp(raw),
                unsubscribed: unsubscribed.contains(&email),
                metadata: None,
                email,
            });
        }
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.email.cmp(&b.email)));
        Ok(entries)
    }

    async fn remove(&self, email: &str) -> AppResult<bool> {
        let mut conn = self.manager.clone();

        // Clear the unsubscribe marker too: a re-signup after a hard delete
        // must carry no memory of the prior entry.
        let _: () = conn
            .del(vec![Self::entry_key(email), Self::unsubscribed_key(email)])
            .await
            .map_err(kv_err)?;
        let removed: i64 = conn.srem(ALL_KEY, email).await.map_err(kv_err)?;
        let _: () = conn
            .srem(UNSUBSCRIBED_ALL_KEY, email)
            .await
            .map_err(kv_err)?;

        Ok(removed > 0)
    }

    async fn set_unsubscribed(&self, email: &str) -> AppResult<bool> {
        let mut conn = self.manager.clone();

        let now = Utc::now().to_rfc3339();
        let _: () = conn
            .set(Self::unsubscribed_key(email), now)
            .await
            .map_err(kv_err)?;
        let _: () = conn
            .sadd(UNSUBSCRIBED_ALL_KEY, email)
            .await
            .map_err(kv_err)?;

        Ok(true)
    }
}
