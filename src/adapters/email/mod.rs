use async_trait::async_trait;

use crate::app_error::AppResult;

pub mod dispatcher;
pub mod resend;
pub mod sendgrid;

/// A transactional email provider. The semantic content of a message is the
/// same across providers; only the request shaping differs.
#[async_trait]
pub trait Mailer: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, to: &str, subject: &str, text: &str, html: &str) -> AppResult<()>;
}
