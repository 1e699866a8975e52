//! Composition of the primary (Postgres) and fallback (Redis) backends into
//! a single store with fixed failover rules.
//!
//! The rules differ per operation and are part of the external contract:
//! - `add`: primary first; an inconclusive attempt (backend absent or
//!   erroring) falls through to the fallback. Errors are logged, never
//!   surfaced to the signup flow.
//! - `list`: primary first; only a zero-entry primary result falls through.
//!   This conflates "empty" with "primary unreachable" and can mask a primary
//!   outage as an empty waitlist; kept as-is.
//! - `remove`: primary first, fallback only if the primary did not delete a
//!   row. The fallback delete needs no existence pre-check.
//! - `set_unsubscribed`: written to BOTH backends unconditionally so the two
//!   representations stay consistent. Intentional asymmetry; do not "fix".
//!
//! No transaction spans the backends and no reconciliation happens if both
//! are configured and disagree.

use std::sync::Arc;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::waitlist_entry::WaitlistEntry,
    use_cases::waitlist::{AddOutcome, WaitlistBackend},
};

pub struct AddReport {
    pub outcome: AddOutcome,
    pub storage: &'static str,
}

pub struct FailoverStore {
    primary: Option<Arc<dyn WaitlistBackend>>,
    fallback: Option<Arc<dyn WaitlistBackend>>,
}

impl FailoverStore {
    /// Built once at process start from whatever backends configuration
    /// provides; handlers never re-read configuration per request.
    pub fn new(
        primary: Option<Arc<dyn WaitlistBackend>>,
        fallback: Option<Arc<dyn WaitlistBackend>>,
    ) -> Self {
        Self { primary, fallback }
    }

    pub async fn add(
        &self,
        email: &str,
        metadata: Option<serde_json::Value>,
    ) -> AppResult<AddReport> {
        if let Some(primary) = &self.primary {
            match primary.add(email, metadata.clone()).await {
                Ok(outcome) if outcome.stored || outcome.already_exists => {
                    return Ok(AddReport {
                        outcome,
                        storage: primary.name(),
                    });
                }
                Ok(_) => {
                    tracing::warn!(backend = primary.name(), "inconclusive add, trying fallback");
                }
                Err(err) => {
                    tracing::warn!(backend = primary.name(), error = %err, "add failed, trying fallback");
                }
            }
        }

        if let Some(fallback) = &self.fallback {
            match fallback.add(email, metadata).await {
                Ok(outcome) => {
                    return Ok(AddReport {
                        outcome,
                        storage: fallback.name(),
                    });
                }
                Err(err) => {
                    tracing::error!(backend = fallback.name(), error = %err, "fallback add failed");
                }
            }
        }

        Err(AppError::BackendUnavailable)
    }

    /// Read path degrades silently: an unreadable or empty primary falls
    /// through to the fallback, and no backend at all yields an empty roster
    /// rather than an error.
    pub async fn list(&self) -> (Vec<WaitlistEntry>, &'static str) {
        if let Some(primary) = &self.primary {
            match primary.list().await {
                Ok(entries) if !entries.is_empty() => return (entries, primary.name()),
                Ok(_) => {
                    tracing::debug!(backend = primary.name(), "empty primary roster, trying fallback");
                }
                Err(err) => {
                    tracing::warn!(backend = primary.name(), error = %err, "list failed, trying fallback");
                }
            }
        }

        if let Some(fallback) = &self.fallback {
            match fallback.list().await {
                Ok(entries) => return (entries, fallback.name()),
                Err(err) => {
                    tracing::error!(backend = fallback.name(), error = %err, "fallback list failed");
                }
            }
        }

        (Vec::new(), "none")
    }

    pub async fn remove(&self, email: &str) -> AppResult<(bool, &'static str)> {
        // A backend that answers, even with "no such row", is conclusive.
        // Only when every configured backend errors (or none exists) does
        // the delete surface as a server error.
        let mut not_found_on: Option<&'static str> = None;

        if let Some(primary) = &self.primary {
            match primary.remove(email).await {
                Ok(true) => return Ok((true, primary.name())),
                Ok(false) => not_found_on = Some(primary.name()),
                Err(err) => {
                    tracing::warn!(backend = primary.name(), error = %err, "remove failed, trying fallback");
                }
            }
        }

        if let Some(fallback) = &self.fallback {
            // Deleting an absent key counts as success on the fallback.
            match fallback.remove(email).await {
                Ok(_) => return Ok((true, fallback.name())),
                Err(err) => {
                    tracing::error!(backend = fallback.name(), error = %err, "fallback remove failed");
                }
            }
        }

        match not_found_on {
            Some(storage) => Ok((false, storage)),
            None => Err(AppError::BackendUnavailable),
        }
    }

    /// Writes both backends unconditionally and reports whether either
    /// marked an entry. Per-backend errors are logged and swallowed.
    pub async fn set_unsubscribed(&self, email: &str) -> bool {
        let mut marked = false;

        if let Some(primary) = &self.primary {
            match primary.set_unsubscribed(email).await {
                Ok(result) => marked |= result,
                Err(err) => {
                    tracing::warn!(backend = primary.name(), error = %err, "unsubscribe write failed");
                }
            }
        }

        if let Some(fallback) = &self.fallback {
            match fallback.set_unsubscribed(email).await {
                Ok(result) => marked |= result,
                Err(err) => {
                    tracing::warn!(backend = fallback.name(), error = %err, "unsubscribe write failed");
                }
            }
        }

        marked
    }
}
