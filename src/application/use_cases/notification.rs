use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::{
    app_error::AppResult,
    application::{
        email_templates::{CreditEmailContent, credit_email},
        locale::Locale,
    },
    use_cases::allocation::Allocation,
};

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()>;
}

/// Everything needed to tell a user which credit they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditNotice {
    pub to: String,
    pub name: String,
    pub credit_link: String,
    pub credit_code: String,
    pub company: Option<String>,
    pub is_test: bool,
    pub locale: Locale,
}

impl CreditNotice {
    pub fn from_allocation(allocation: &Allocation, locale: Locale) -> Self {
        Self {
            to: allocation.user.email.clone(),
            name: allocation.user.name.clone(),
            credit_link: allocation.credit.link.clone(),
            credit_code: allocation.credit.code.clone(),
            company: allocation.user.company.clone(),
            is_test: allocation.credit.is_test,
            locale,
        }
    }
}

/// Renders and sends credit emails through an injected [`EmailSender`].
#[derive(Clone)]
pub struct CreditMailer {
    sender: Arc<dyn EmailSender>,
    event_name: String,
}

impl CreditMailer {
    pub fn new(sender: Arc<dyn EmailSender>, event_name: String) -> Self {
        Self { sender, event_name }
    }

    #[instrument(skip(self, notice), fields(to = %notice.to, code = %notice.credit_code))]
    pub async fn send(&self, notice: &CreditNotice) -> AppResult<()> {
        let (subject, html) = credit_email(&CreditEmailContent {
            event_name: &self.event_name,
            name: &notice.name,
            credit_link: &notice.credit_link,
            credit_code: &notice.credit_code,
            company: notice.company.as_deref(),
            is_test: notice.is_test,
            locale: notice.locale,
        });
        self.sender.send(&notice.to, &subject, &html).await?;
        tracing::info!("Credit email sent");
        Ok(())
    }

    /// Sends without blocking the caller. Failures are logged and dropped.
    pub fn send_in_background(&self, notice: CreditNotice) -> JoinHandle<()> {
        let mailer = self.clone();
        tokio::spawn(async move {
            if let Err(err) = mailer.send(&notice).await {
                tracing::warn!(error = %err, to = %notice.to, "Credit email failed");
            }
        })
    }
}
