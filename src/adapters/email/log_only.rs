use async_trait::async_trait;

use crate::{app_error::AppResult, use_cases::notification::EmailSender};

/// Used when no email provider is configured. Logs the message and succeeds.
#[derive(Clone, Default)]
pub struct LogOnlyEmailSender;

#[async_trait]
impl EmailSender for LogOnlyEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        tracing::info!(to, subject, html_len = html.len(), "Email provider not configured, logging email instead");
        Ok(())
    }
}
