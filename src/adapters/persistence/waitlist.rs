use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};

use crate::{
    adapters::persistence::{PostgresPersistence, is_unique_violation},
    app_error::AppResult,
    domain::entities::waitlist_entry::WaitlistEntry,
    use_cases::waitlist::{AddOutcome, WaitlistBackend},
};

// Waitlist row as stored in the db.
#[derive(sqlx::FromRow, Debug)]
struct WaitlistRow {
    email: String,
    created_at: NaiveDateTime,
    unsubscribed: bool,
    metadata: Option<serde_json::Value>,
}

impl From<WaitlistRow> for WaitlistEntry {
    fn from(row: WaitlistRow) -> Self {
        WaitlistEntry {
            email: row.email,
            created_at: row.created_at,
            unsubscribed: row.unsubscribed,
            metadata: row.metadata,
        }
    }
}

#[async_trait]
impl WaitlistBackend for PostgresPersistence {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn add(
        &self,
        email: &str,
        metadata: Option<serde_json::Value>,
    ) -> AppResult<AddOutcome> {
        // Lookup-then-insert; the PRIMARY KEY on email resolves the race
        // between two concurrent signups to an already_exists outcome.
        let existing =
            sqlx::query("SELECT email FROM waitlist_entries WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        if existing.is_some() {
            return Ok(AddOutcome {
                stored: false,
                already_exists: true,
            });
        }

        let insert = sqlx::query(
            "INSERT INTO waitlist_entries (email, created_at, metadata) VALUES ($1, $2, $3)",
        )
        .bind(email)
        .bind(Utc::now().naive_utc())
        .bind(metadata)
        .execute(&self.pool)
        .await;

        match insert {
            Ok(_) => Ok(AddOutcome {
                stored: true,
                already_exists: false,
            }),
            Err(err) if is_unique_violation(&err) => Ok(AddOutcome {
                stored: false,
                already_exists: true,
            }),
            Err(err) => Err(err.into()),
        }
    }

    async fn list(&self) -> AppResult<Vec<WaitlistEntry>> {
        let rows = sqlx::query_as::<_, WaitlistRow>(
            "SELECT email, created_at, unsubscribed, metadata \
             FROM waitlist_entries ORDER BY created_at, email",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(WaitlistEntry::from).collect())
    }

    async fn remove(&self, email: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM waitlist_entries WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_unsubscribed(&self, email: &str) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE waitlist_entries SET unsubscribed = TRUE WHERE email = $1")
                .bind(email)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
