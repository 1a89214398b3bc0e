use std::sync::Arc;

use crate::{
    application::admin_session::AdminSessionAuth,
    infra::config::AppConfig,
    use_cases::{admin::AdminUseCases, registration::RegistrationUseCases},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registration_use_cases: Arc<RegistrationUseCases>,
    pub admin_use_cases: Arc<AdminUseCases>,
    pub admin_auth: Arc<AdminSessionAuth>,
}
