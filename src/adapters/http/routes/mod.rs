pub mod admin;
pub mod register;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/register", register::router())
        .nest("/admin", admin::router(app_state))
}
