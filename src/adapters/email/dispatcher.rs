use std::sync::Arc;

use crate::{adapters::email::Mailer, email_templates};

/// Sends the signup confirmation through the one provider selected at
/// startup. Failures are logged and reported as `false`; they are never
/// retried and never reach the signup flow.
pub struct NotificationDispatcher {
    mailer: Option<Arc<dyn Mailer>>,
    app_origin: String,
}

impl NotificationDispatcher {
    pub fn new(mailer: Option<Arc<dyn Mailer>>, app_origin: String) -> Self {
        Self { mailer, app_origin }
    }

    pub async fn send_confirmation(&self, email: &str) -> bool {
        let Some(mailer) = &self.mailer else {
            tracing::debug!("no email provider configured, skipping confirmation");
            return false;
        };

        let (subject, text, html) = email_templates::confirmation_email(&self.app_origin, email);
        match mailer.send(email, &subject, &text, &html).await {
            Ok(()) => {
                tracing::info!(provider = mailer.name(), "confirmation email sent");
                true
            }
            Err(err) => {
                tracing::warn!(provider = mailer.name(), error = %err, "confirmation email failed");
                false
            }
        }
    }
}
