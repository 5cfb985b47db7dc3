//! Password-reset email delivery.
//!
//! Delivery goes through Resend when `RESEND_API_KEY`/`RESEND_FROM` are set.
//! Without them the reset link is written to the log so local setups still
//! work end to end.

use async_trait::async_trait;
use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;

const PASSWORD_RESET_TEMPLATE: &str = include_str!("../../templates/password_reset.html");
const PASSWORD_RESET_SUBJECT: &str = "Reset your Workshop Pool password";

#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
    pub from: String,
}

impl ResendConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("RESEND_API_KEY").ok()?;
        let from = std::env::var("RESEND_FROM").ok()?;
        Some(Self { api_key, from })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("email delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// A rendered reset message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetMessage {
    pub to: String,
    pub token: String,
    pub link: String,
}

#[async_trait]
pub trait ResetMailer: Send + Sync {
    async fn send_reset(&self, message: &ResetMessage) -> Result<(), DeliveryError>;
}

pub struct ResendMailer {
    client: Resend,
    from: String,
}

impl ResendMailer {
    #[must_use]
    pub fn new(config: &ResendConfig) -> Self {
        Self { client: Resend::new(&config.api_key), from: config.from.clone() }
    }
}

#[async_trait]
impl ResetMailer for ResendMailer {
    async fn send_reset(&self, message: &ResetMessage) -> Result<(), DeliveryError> {
        let to = [message.to.as_str()];
        let html = render_password_reset_template(message);
        let email = CreateEmailBaseOptions::new(&self.from, to, PASSWORD_RESET_SUBJECT).with_html(&html);
        self.client
            .emails
            .send(email)
            .await
            .map_err(|e| DeliveryError(e.to_string()))?;
        Ok(())
    }
}

/// Fallback used when no email provider is configured.
pub struct LogMailer;

#[async_trait]
impl ResetMailer for LogMailer {
    async fn send_reset(&self, message: &ResetMessage) -> Result<(), DeliveryError> {
        tracing::warn!(to = %message.to, link = %message.link, "email delivery not configured; reset link logged");
        Ok(())
    }
}

#[must_use]
pub fn render_password_reset_template(message: &ResetMessage) -> String {
    PASSWORD_RESET_TEMPLATE
        .replace("{{EMAIL}}", &message.to)
        .replace("{{TOKEN}}", &message.token)
        .replace("{{LINK}}", &message.link)
}

#[cfg(test)]
#[path = "mailer_test.rs"]
mod tests;
