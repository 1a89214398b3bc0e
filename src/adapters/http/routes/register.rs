use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::locale::Locale,
    use_cases::registration::RegisterInput,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(public_stats).post(register))
}

#[derive(Deserialize)]
struct RegisterPayload {
    name: String,
    email: String,
    #[serde(default)]
    locale: Locale,
}

#[derive(Serialize)]
struct RegisteredUser {
    name: String,
    email: String,
    company: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    success: bool,
    message: &'static str,
    /// The credit link.
    credit: String,
    is_test: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_existing: bool,
    user: RegisteredUser,
}

async fn register(
    State(app_state): State<AppState>,
    payload: Result<Json<RegisterPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

    let registration = app_state
        .registration_use_cases
        .register(RegisterInput {
            name: payload.name,
            email: payload.email,
            locale: payload.locale,
        })
        .await?;

    let (status, message) = if registration.is_existing {
        (StatusCode::OK, "You already claimed your credit! Here it is again:")
    } else {
        (StatusCode::CREATED, "Congratulations! Here is your credit:")
    };

    Ok((
        status,
        Json(RegisterResponse {
            success: true,
            message,
            is_test: registration.credit.is_test,
            credit: registration.credit.link,
            is_existing: registration.is_existing,
            user: RegisteredUser {
                name: registration.user.name,
                email: registration.user.email,
                company: registration.user.company,
            },
        }),
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsBody {
    total_eligible: i64,
    claimed: i64,
    pending: i64,
}

#[derive(Serialize)]
struct PublicStatsResponse {
    available: bool,
    remaining: i64,
    stats: StatsBody,
}

async fn public_stats(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let stats = app_state.registration_use_cases.public_stats().await?;
    Ok(Json(PublicStatsResponse {
        available: stats.available_real > 0,
        remaining: stats.available_real,
        stats: StatsBody {
            total_eligible: stats.total_eligible,
            claimed: stats.claimed,
            pending: stats.pending(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::domain::entities::approval_status::ApprovalStatus;
    use crate::test_utils::{TestAppStateBuilder, create_test_credit, create_test_user};

    fn build_test_router(app_state: AppState) -> Router<()> {
        router().with_state(app_state)
    }

    #[tokio::test]
    async fn first_claim_returns_201_and_repeat_returns_existing() {
        let app_state = TestAppStateBuilder::new()
            .with_user(create_test_user(|u| {
                u.email = "a@x.com".to_string();
                u.company = Some("Acme".to_string());
            }))
            .with_credit(create_test_credit(|c| {
                c.code = "CODE1".to_string();
                c.link = "L1".to_string();
            }))
            .build();
        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .post("/")
            .json(&json!({ "name": "Ana", "email": "a@x.com" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["credit"], "L1");
        assert_eq!(body["isTest"], false);
        assert_eq!(body["user"]["name"], "Ana");
        assert_eq!(body["user"]["company"], "Acme");
        assert!(body.get("isExisting").is_none());

        let again = server
            .post("/")
            .json(&json!({ "name": "Ana", "email": "A@X.com" }))
            .await;
        again.assert_status(StatusCode::OK);
        let body: Value = again.json();
        assert_eq!(body["credit"], "L1");
        assert_eq!(body["isExisting"], true);
    }

    #[tokio::test]
    async fn unknown_email_returns_403_not_eligible() {
        let server = TestServer::new(build_test_router(TestAppStateBuilder::new().build())).unwrap();

        let response = server
            .post("/")
            .json(&json!({ "name": "Ana", "email": "nobody@x.com" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "NOT_ELIGIBLE");
    }

    #[tokio::test]
    async fn unapproved_user_returns_403_not_approved() {
        let app_state = TestAppStateBuilder::new()
            .with_user(create_test_user(|u| {
                u.email = "w@x.com".to_string();
                u.approval_status = ApprovalStatus::Waitlist;
            }))
            .with_credit(create_test_credit(|_| {}))
            .build();
        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .post("/")
            .json(&json!({ "name": "W", "email": "w@x.com" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(response.json::<Value>()["code"], "NOT_APPROVED");
    }

    #[tokio::test]
    async fn empty_pool_returns_503_no_credits() {
        let app_state = TestAppStateBuilder::new()
            .with_user(create_test_user(|u| u.email = "a@x.com".to_string()))
            .build();
        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .post("/")
            .json(&json!({ "name": "Ana", "email": "a@x.com" }))
            .await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.json::<Value>()["code"], "NO_CREDITS");
    }

    #[tokio::test]
    async fn invalid_payloads_return_400_validation_error() {
        let server = TestServer::new(build_test_router(TestAppStateBuilder::new().build())).unwrap();

        for payload in [
            json!({ "name": "", "email": "a@x.com" }),
            json!({ "name": "Ana", "email": "not-an-email" }),
            json!({ "name": "x".repeat(101), "email": "a@x.com" }),
            json!({ "email": "a@x.com" }),
        ] {
            let response = server.post("/").json(&payload).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");
        }

        let response = server.post("/").text("{not json").content_type("application/json").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn public_stats_report_real_pool_only() {
        let app_state = TestAppStateBuilder::new()
            .with_user(create_test_user(|_| {}))
            .with_user(create_test_user(|u| u.approval_status = ApprovalStatus::Declined))
            .with_credit(create_test_credit(|_| {}))
            .with_credit(create_test_credit(|c| c.is_test = true))
            .build();
        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server.get("/").await;
        response.assert_status_ok();
        response.assert_json(&json!({
            "available": true,
            "remaining": 1,
            "stats": { "totalEligible": 1, "claimed": 0, "pending": 1 }
        }));
    }
}
