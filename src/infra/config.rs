use std::env;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use secrecy::SecretString;

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    /// Primary backend. Absent means signups go straight to the fallback.
    pub database_url: Option<String>,
    /// Fallback key-value backend endpoint and its token.
    pub kv_url: Option<String>,
    pub kv_token: Option<SecretString>,
    pub admin_secret: SecretString,
    /// Provider A; checked before the SendGrid key.
    pub resend_api_key: Option<SecretString>,
    /// Provider B; used only when no Resend key is set.
    pub sendgrid_api_key: Option<SecretString>,
    pub email_from: String,
    /// Public origin of the site, used for the unsubscribe link in the
    /// confirmation email.
    pub app_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr: SocketAddr = env::var("BIND_ADDR")
            .unwrap_or("127.0.0.1:3001".to_string())
            .parse()
            .expect("BIND_ADDR must be a valid socket address");

        let cors_origin: HeaderValue = env::var("CORS_ORIGIN")
            .unwrap_or("http://localhost:3000".to_string())
            .parse()
            .expect("CORS_ORIGIN must be a valid header value");

        let database_url = env::var("DATABASE_URL").ok();
        let kv_url = env::var("KV_URL").ok();
        let kv_token = env::var("KV_TOKEN").ok().map(SecretString::from);

        let admin_secret =
            SecretString::from(env::var("ADMIN_SECRET").expect("ADMIN_SECRET must be set"));

        let resend_api_key = env::var("RESEND_API_KEY").ok().map(SecretString::from);
        let sendgrid_api_key = env::var("SENDGRID_API_KEY").ok().map(SecretString::from);

        let email_from =
            env::var("EMAIL_FROM").unwrap_or("Waitlist <waitlist@localhost>".to_string());
        let app_origin = env::var("APP_ORIGIN").unwrap_or("http://localhost:3000".to_string());

        Self {
            bind_addr,
            cors_origin,
            database_url,
            kv_url,
            kv_token,
            admin_secret,
            resend_api_key,
            sendgrid_api_key,
            email_from,
            app_origin,
        }
    }
}
