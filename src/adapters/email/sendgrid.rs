use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::{
    adapters::email::Mailer,
    app_error::{AppError, AppResult},
};
use secrecy::ExposeSecret;

#[derive(Clone)]
pub struct SendGridMailer {
    client: Client,
    api_key: secrecy::SecretString,
    from: String,
}

impl SendGridMailer {
    pub fn new(api_key: secrecy::SecretString, from: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            from,
        }
    }
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    mime_type: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct SendGridReq<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 2],
}

#[async_trait]
impl Mailer for SendGridMailer {
    fn name(&self) -> &'static str {
        "sendgrid"
    }

    async fn send(&self, to: &str, subject: &str, text: &str, html: &str) -> AppResult<()> {
        // SendGrid requires text/plain before text/html.
        let body = SendGridReq {
            personalizations: [Personalization {
                to: [Address { email: to }],
            }],
            from: Address { email: &self.from },
            subject,
            content: [
                Content {
                    mime_type: "text/plain",
                    value: text,
                },
                Content {
                    mime_type: "text/html",
                    value: html,
                },
            ],
        };
        self.client
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(())
    }
}
