use chrono::NaiveDateTime;
use serde::Serialize;

/// A single waitlist signup. The email is the identity of the entry and is
/// always stored lowercased; `unsubscribed` is a soft marker and never hides
/// the entry from listings.
#[derive(Debug, Clone, Serialize)]
pub struct WaitlistEntry {
    pub email: String,
    pub created_at: NaiveDateTime,
    pub unsubscribed: bool,
    pub metadata: Option<serde_json::Value>,
}

impl WaitlistEntry {
    pub fn new(email: String, metadata: Option<serde_json::Value>) -> Self {
        Self {
            email,
            created_at: chrono::Utc::now().naive_utc(),
            unsubscribed: false,
            metadata,
        }
    }
}
