use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{
        email::{log_only::LogOnlyEmailSender, resend::ResendEmailSender},
        http::app_state::AppState,
    },
    application::admin_session::AdminSessionAuth,
    infra::{config::AppConfig, error::InfraError, postgres_persistence},
    use_cases::{
        admin::AdminUseCases,
        allocation::AllocationStore,
        inventory::{CreditRepo, EligibleUserRepo},
        notification::{CreditMailer, EmailSender},
        registration::RegistrationUseCases,
    },
};

const LOG_FILE: &str = "app.log";

pub async fn init_app_state() -> Result<AppState, InfraError> {
    let config = AppConfig::from_env()?;

    let postgres_arc = Arc::new(
        postgres_persistence(&config.database_url, config.database_max_connections).await?,
    );
    let credit_repo = postgres_arc.clone() as Arc<dyn CreditRepo>;
    let user_repo = postgres_arc.clone() as Arc<dyn EligibleUserRepo>;
    let allocation_store = postgres_arc as Arc<dyn AllocationStore>;

    let email: Arc<dyn EmailSender> = match &config.resend_api_key {
        Some(api_key) => Arc::new(
            ResendEmailSender::new(api_key.clone(), config.email_from.clone())
                .map_err(InfraError::HttpClient)?,
        ),
        None => {
            tracing::warn!("RESEND_API_KEY not set, credit emails will only be logged");
            Arc::new(LogOnlyEmailSender)
        }
    };
    let mailer = CreditMailer::new(email, config.event_name.clone());

    let registration_use_cases = RegistrationUseCases::new(
        user_repo.clone(),
        credit_repo.clone(),
        allocation_store.clone(),
        mailer.clone(),
    );
    let admin_use_cases = AdminUseCases::new(user_repo, credit_repo, allocation_store, mailer);

    let admin_auth = AdminSessionAuth::new(
        config.admin_username.clone(),
        config.admin_password.clone(),
        config.session_secret.clone(),
    );

    Ok(AppState {
        config: Arc::new(config),
        registration_use_cases: Arc::new(registration_use_cases),
        admin_use_cases: Arc::new(admin_use_cases),
        admin_auth: Arc::new(admin_auth),
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "event_credits=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs), skipped when the file cannot be created
    let json_layer = match File::create(LOG_FILE) {
        Ok(file) => Some(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(true),
        ),
        Err(err) => {
            eprintln!("Cannot create {LOG_FILE}, file logging disabled: {err}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
