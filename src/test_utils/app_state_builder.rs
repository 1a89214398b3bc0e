//! Test app state builder for HTTP-level testing.
//!
//! `TestAppStateBuilder` wires the real use cases to an [`InMemoryStore`] and
//! an in-memory email sender.

use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;

use crate::{
    adapters::http::app_state::AppState,
    application::admin_session::AdminSessionAuth,
    domain::entities::{credit::Credit, eligible_user::EligibleUser},
    infra::config::{AppConfig, DEFAULT_EMAIL_FROM, DEFAULT_EVENT_NAME},
    test_utils::{InMemoryEmailSender, InMemoryStore},
    use_cases::{
        admin::AdminUseCases,
        notification::{CreditMailer, EmailSender},
        registration::RegistrationUseCases,
    },
};

pub const TEST_ADMIN_USERNAME: &str = "admin";
pub const TEST_ADMIN_PASSWORD: &str = "test_admin_password";
const TEST_SESSION_SECRET: &str = "test_session_secret_value";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/event_credits_test".to_string(),
        database_max_connections: 1,
        bind_addr: ([127, 0, 0, 1], 0).into(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        admin_username: TEST_ADMIN_USERNAME.to_string(),
        admin_password: SecretString::new(TEST_ADMIN_PASSWORD.into()),
        session_secret: SecretString::new(TEST_SESSION_SECRET.into()),
        secure_cookies: false,
        resend_api_key: None,
        email_from: DEFAULT_EMAIL_FROM.to_string(),
        event_name: DEFAULT_EVENT_NAME.to_string(),
    }
}

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let app_state = TestAppStateBuilder::new()
///     .with_user(create_test_user(|u| u.email = "a@x.com".to_string()))
///     .with_credit(create_test_credit(|_| {}))
///     .build();
/// ```
pub struct TestAppStateBuilder {
    store: Arc<InMemoryStore>,
    email_sender: Option<Arc<dyn EmailSender>>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            email_sender: None,
        }
    }

    pub fn with_user(self, user: EligibleUser) -> Self {
        self.store.insert_user(user);
        self
    }

    pub fn with_credit(self, credit: Credit) -> Self {
        self.store.insert_credit(credit);
        self
    }

    pub fn with_email_sender(mut self, sender: Arc<dyn EmailSender>) -> Self {
        self.email_sender = Some(sender);
        self
    }

    /// Shared handle to the backing store, for assertions after requests.
    pub fn store(&self) -> Arc<InMemoryStore> {
        self.store.clone()
    }

    /// Returns the state together with the recording email sender.
    pub fn build_with_email_mock(self) -> (AppState, Arc<InMemoryEmailSender>) {
        let sender = Arc::new(InMemoryEmailSender::new());
        let app_state = self.with_email_sender(sender.clone()).build();
        (app_state, sender)
    }

    pub fn build(self) -> AppState {
        let config = test_config();
        let sender: Arc<dyn EmailSender> = self
            .email_sender
            .unwrap_or_else(|| Arc::new(InMemoryEmailSender::new()));
        let mailer = CreditMailer::new(sender, config.event_name.clone());

        let registration_use_cases = RegistrationUseCases::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            mailer.clone(),
        );
        let admin_use_cases = AdminUseCases::new(
            self.store.clone(),
            self.store.clone(),
            self.store,
            mailer,
        );
        let admin_auth = AdminSessionAuth::new(
            config.admin_username.clone(),
            config.admin_password.clone(),
            config.session_secret.clone(),
        );

        AppState {
            config: Arc::new(config),
            registration_use_cases: Arc::new(registration_use_cases),
            admin_use_cases: Arc::new(admin_use_cases),
            admin_auth: Arc::new(admin_auth),
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
