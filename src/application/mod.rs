pub mod admin_session;
pub mod app_error;
pub mod email_templates;
pub mod locale;
pub mod use_cases;
pub mod validators;
