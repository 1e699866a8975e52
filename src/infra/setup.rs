use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{
        email::{Mailer, dispatcher::NotificationDispatcher, resend::ResendMailer, sendgrid::SendGridMailer},
        http::app_state::AppState,
        kv::waitlist::RedisWaitlistStore,
        persistence::PostgresPersistence,
        store::failover::FailoverStore,
    },
    infra::{config::AppConfig, db::init_db},
    use_cases::waitlist::{WaitlistBackend, WaitlistUseCases},
};

/// Builds every dependency exactly once and wires it into the shared state.
/// Backends and the email provider are optional by configuration; whatever
/// is absent here simply never gets attempted at request time.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let mut primary: Option<Arc<dyn WaitlistBackend>> = None;
    if let Some(database_url) = &config.database_url {
        match init_db(database_url) {
            Ok(pool) => primary = Some(Arc::new(PostgresPersistence::new(pool))),
            Err(err) => tracing::warn!(error = %err, "primary backend unavailable"),
        }
    }

    let mut fallback: Option<Arc<dyn WaitlistBackend>> = None;
    if let Some(kv_url) = &config.kv_url {
        match RedisWaitlistStore::new(kv_url, config.kv_token.as_ref()).await {
            Ok(store) => fallback = Some(Arc::new(store)),
            Err(err) => tracing::warn!(error = %err, "fallback backend unavailable"),
        }
    }

    if primary.is_none() && fallback.is_none() {
        tracing::warn!("no storage backend configured; signups will fail");
    }

    let mailer = select_mailer(&config);

    let store = Arc::new(FailoverStore::new(primary, fallback));
    let dispatcher = Arc::new(NotificationDispatcher::new(
        mailer,
        config.app_origin.clone(),
    ));
    let waitlist = Arc::new(WaitlistUseCases::new(store, dispatcher));

    Ok(AppState {
        config: Arc::new(config),
        waitlist,
    })
}

/// Provider priority is fixed: Resend, then SendGrid, then none. Only one
/// provider is ever constructed.
pub fn select_mailer(config: &AppConfig) -> Option<Arc<dyn Mailer>> {
    if let Some(key) = &config.resend_api_key {
        Some(Arc::new(ResendMailer::new(
            key.clone(),
            config.email_from.clone(),
        )))
    } else if let Some(key) = &config.sendgrid_api_key {
        Some(Arc::new(SendGridMailer::new(
            key.clone(),
            config.email_from.clone(),
        )))
    } else {
        None
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "waitlist_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::test_utils::test_config;

    #[test]
    fn resend_wins_when_both_provider_keys_are_set() {
        let mut config = test_config();
        config.resend_api_key = Some(SecretString::new("re_test_key".into()));
        config.sendgrid_api_key = Some(SecretString::new("SG.test_key".into()));

        assert_eq!(select_mailer(&config).unwrap().name(), "resend");
    }

    #[test]
    fn sendgrid_is_used_when_only_its_key_is_set() {
        let mut config = test_config();
        config.sendgrid_api_key = Some(SecretString::new("SG.test_key".into()));

        assert_eq!(select_mailer(&config).unwrap().name(), "sendgrid");
    }

    #[test]
    fn no_key_means_no_provider() {
        let config = test_config();
        assert!(select_mailer(&config).is_none());
    }
}
