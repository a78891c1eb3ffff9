use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// SMTP relay used to deliver confirmation codes.
#[derive(Clone, Deserialize)]
pub struct SmtpConfig {
    pub relay: String,
    pub username: String,
    pub password: String,
    /// Sender address for confirmation emails.
    pub from: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("relay", &self.relay)
            .field("username", &self.username)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub smtp: SmtpConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = required("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "ridebook".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "ridebook-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let smtp = SmtpConfig {
            relay: required("SMTP_RELAY")?,
            username: required("SMTP_USERNAME")?,
            password: required("SMTP_PASSWORD")?,
            from: std::env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@ridebook.local".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            smtp,
        })
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("missing environment variable {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smtp_debug_hides_password() {
        let smtp = SmtpConfig {
            relay: "smtp.example.com".into(),
            username: "mailer".into(),
            password: "hunter2".into(),
            from: "no-reply@example.com".into(),
        };
        let rendered = format!("{smtp:?}");
        assert!(rendered.contains("smtp.example.com"));
        assert!(!rendered.contains("hunter2"));
    }
}
