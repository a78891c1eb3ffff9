use anyhow::Context;
use axum::async_trait;
use lettre::message::{header::ContentType, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::debug;

use crate::config::SmtpConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, from: &str, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}

/// Mailer backed by an SMTP relay.
#[derive(Clone)]
pub struct SmtpMailer(AsyncSmtpTransport<Tokio1Executor>);

impl SmtpMailer {
    pub fn connect(config: &SmtpConfig) -> anyhow::Result<Self> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.relay)
            .with_context(|| format!("smtp relay {}", config.relay))?
            .credentials(creds)
            .build();
        Ok(Self(transport))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, from: &str, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let from: Mailbox = from.parse().context("parse sender address")?;
        let to: Mailbox = to.parse().context("parse recipient address")?;
        let message = Message::builder()
            .from(from)
            .to(to.clone())
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .context("build message")?;
        self.0.send(message).await.context("smtp send")?;
        debug!(to = %to, subject, "mail sent");
        Ok(())
    }
}
