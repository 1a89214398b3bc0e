use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use time::OffsetDateTime;

use crate::{
    adapters::http::app_state::AppState, app_error::AppError,
    application::admin_session::ADMIN_SESSION_COOKIE,
};

/// Rejects requests without a valid admin session cookie.
pub async fn require_admin_session(
    State(app_state): State<AppState>,
    cookies: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = cookies.get(ADMIN_SESSION_COOKIE).map(|c| c.value().to_owned()) else {
        tracing::debug!("Admin request without session cookie");
        return Err(AppError::Unauthorized);
    };

    if !app_state
        .admin_auth
        .is_valid(&token, OffsetDateTime::now_utc())
    {
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
