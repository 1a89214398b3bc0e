use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, middleware::require_admin_session},
    app_error::{AppError, AppResult},
    application::{admin_session::ADMIN_SESSION_COOKIE, locale::Locale},
    domain::entities::{approval_status::ApprovalStatus, credit_pool::CreditPool},
    use_cases::admin::{AddCreditInput, AddEligibleUserInput},
};

pub fn router(app_state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/actions", post(run_action))
        .route_layer(middleware::from_fn_with_state(
            app_state,
            require_admin_session,
        ));

    Router::new()
        .route("/auth", post(login).get(session_status).delete(logout))
        .merge(protected)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

// ============================================================================
// Session
// ============================================================================

#[derive(Deserialize)]
struct LoginPayload {
    username: String,
    password: String,
}

async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let payload = json_body(payload)?;

    if !app_state
        .admin_auth
        .verify_credentials(&payload.username, &payload.password)
    {
        return Err(AppError::InvalidCredentials);
    }

    let token = app_state.admin_auth.issue(OffsetDateTime::now_utc())?;
    let cookie = Cookie::build((ADMIN_SESSION_COOKIE, token))
        .http_only(true)
        .secure(app_state.config.secure_cookies)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(app_state.admin_auth.ttl())
        .build();

    tracing::info!("Admin logged in");
    Ok((jar.add(cookie), Json(json!({ "success": true }))))
}

async fn session_status(State(app_state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let authenticated = jar
        .get(ADMIN_SESSION_COOKIE)
        .is_some_and(|c| app_state.admin_auth.is_valid(c.value(), OffsetDateTime::now_utc()));
    Json(json!({ "authenticated": authenticated }))
}

async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(ADMIN_SESSION_COOKIE).path("/"));
    (jar, Json(json!({ "success": true })))
}

// ============================================================================
// Dashboard
// ============================================================================

async fn dashboard(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let dashboard = app_state.admin_use_cases.dashboard().await?;
    Ok(Json(dashboard))
}

// ============================================================================
// Actions
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignCreditData {
    email: String,
    #[serde(default)]
    use_test_credit: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserIdData {
    user_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddEligibleUserData {
    email: String,
    name: String,
    company: Option<String>,
    role: Option<String>,
    approval_status: Option<ApprovalStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserStatusData {
    user_id: Uuid,
    approval_status: ApprovalStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddCreditData {
    code: String,
    link: String,
    #[serde(default)]
    is_test: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreditIdData {
    credit_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendCreditEmailData {
    user_id: Uuid,
    #[serde(default)]
    locale: Locale,
}

#[derive(Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
enum AdminAction {
    AssignCredit(AssignCreditData),
    RevokeCredit(UserIdData),
    AddEligibleUser(AddEligibleUserData),
    UpdateUserStatus(UpdateUserStatusData),
    AddCredit(AddCreditData),
    DeleteCredit(CreditIdData),
    DeleteEligibleUser(UserIdData),
    SendCreditEmail(SendCreditEmailData),
}

async fn run_action(
    State(app_state): State<AppState>,
    payload: Result<Json<AdminAction>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let admin = &app_state.admin_use_cases;

    let body = match json_body(payload)? {
        AdminAction::AssignCredit(data) => {
            let pool = CreditPool::from_is_test(data.use_test_credit);
            let allocation = admin.assign_credit(&data.email, pool).await?;
            json!({
                "success": true,
                "message": format!("Credit assigned to {}", allocation.user.email),
                "credit": allocation.credit,
                "user": allocation.user,
            })
        }
        AdminAction::RevokeCredit(data) => {
            let released = admin.revoke_credit(data.user_id).await?;
            json!({
                "success": true,
                "message": format!("Credit {} returned to the pool", released.credit.code),
                "credit": released.credit,
            })
        }
        AdminAction::AddEligibleUser(data) => {
            let user = admin
                .add_eligible_user(AddEligibleUserInput {
                    email: data.email,
                    name: data.name,
                    company: data.company,
                    role: data.role,
                    approval_status: data.approval_status,
                })
                .await?;
            json!({
                "success": true,
                "message": format!("User {} added", user.email),
                "user": user,
            })
        }
        AdminAction::UpdateUserStatus(data) => {
            let user = admin
                .update_user_status(data.user_id, data.approval_status)
                .await?;
            json!({
                "success": true,
                "message": format!("Status updated to {}", user.approval_status),
                "user": user,
            })
        }
        AdminAction::AddCredit(data) => {
            let credit = admin
                .add_credit(AddCreditInput {
                    code: data.code,
                    link: data.link,
                    is_test: data.is_test,
                })
                .await?;
            json!({
                "success": true,
                "message": format!("Credit {} added", credit.code),
                "credit": credit,
            })
        }
        AdminAction::DeleteCredit(data) => {
            let credit = admin.delete_credit(data.credit_id).await?;
            json!({
                "success": true,
                "message": format!("Credit {} deleted", credit.code),
            })
        }
        AdminAction::DeleteEligibleUser(data) => {
            let user = admin.delete_eligible_user(data.user_id).await?;
            json!({
                "success": true,
                "message": format!("User {} deleted", user.email),
            })
        }
        AdminAction::SendCreditEmail(data) => {
            let user = admin.send_credit_email(data.user_id, data.locale).await?;
            json!({
                "success": true,
                "message": format!("Email sent to {}", user.email),
            })
        }
    };

    Ok(Json(body))
}
