use rand::Rng;
use tracing::info;

use crate::mail::Mailer;

pub const OTP_SUBJECT: &str = "Confirm Account";

/// Random 4-digit numeric code.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(1000..=9999).to_string()
}

pub fn otp_email_body(otp: &str) -> String {
    format!("<p>Please Confirm your Account.</p><p>OTP: {otp}</p>")
}

/// Generates a code and mails it to `to`. The code is returned only once the
/// mail transport accepted the message.
pub async fn send_otp(mailer: &dyn Mailer, from: &str, to: &str) -> anyhow::Result<String> {
    let otp = generate_otp();
    mailer
        .send(from, to, OTP_SUBJECT, &otp_email_body(&otp))
        .await?;
    info!(to, "confirmation code sent");
    Ok(otp)
}
