use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        locale::Locale,
        validators::{MAX_NAME_LEN, is_valid_email, is_valid_name, normalize_email},
    },
    domain::entities::{credit::Credit, eligible_user::EligibleUser},
    use_cases::{
        allocation::{AllocationStore, ClaimOutcome, ClaimRequest},
        inventory::{CreditRepo, EligibleUserRepo},
        notification::{CreditMailer, CreditNotice},
    },
};

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub locale: Locale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub user: EligibleUser,
    pub credit: Credit,
    /// The user had already claimed; this is the credit they got before.
    pub is_existing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicStats {
    pub available_real: i64,
    pub total_eligible: i64,
    pub claimed: i64,
}

impl PublicStats {
    pub fn pending(&self) -> i64 {
        (self.total_eligible - self.claimed).max(0)
    }
}

/// Self-service claim flow for pre-approved attendees.
#[derive(Clone)]
pub struct RegistrationUseCases {
    users: Arc<dyn EligibleUserRepo>,
    credits: Arc<dyn CreditRepo>,
    allocation: Arc<dyn AllocationStore>,
    mailer: CreditMailer,
}

impl RegistrationUseCases {
    pub fn new(
        users: Arc<dyn EligibleUserRepo>,
        credits: Arc<dyn CreditRepo>,
        allocation: Arc<dyn AllocationStore>,
        mailer: CreditMailer,
    ) -> Self {
        Self {
            users,
            credits,
            allocation,
            mailer,
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email.trim()))]
    pub async fn register(&self, input: RegisterInput) -> AppResult<Registration> {
        if !is_valid_name(&input.name) {
            return Err(AppError::InvalidInput(format!(
                "Name is required (max {MAX_NAME_LEN} characters)"
            )));
        }
        if !is_valid_email(&input.email) {
            return Err(AppError::InvalidInput("Invalid email format".into()));
        }
        let email = normalize_email(&input.email);

        let Some(user) = self.users.get_by_email(&email).await? else {
            tracing::info!("Registration rejected: email not eligible");
            return Err(AppError::NotEligible);
        };

        if !user.is_approved() {
            tracing::info!(status = %user.approval_status, "Registration rejected: not approved");
            return Err(AppError::NotApproved);
        }

        let pool = user.credit_pool();
        let outcome = self
            .allocation
            .claim(ClaimRequest {
                user_id: user.id,
                pool,
                display_name: Some(input.name.trim().to_string()),
            })
            .await
            .map_err(|err| match err {
                // Deleted between lookup and claim.
                AppError::NotFound(_) => {
                    tracing::info!("Registration rejected: user removed during claim");
                    AppError::NotEligible
                }
                AppError::PoolExhausted => {
                    tracing::warn!(%pool, "Registration failed: pool exhausted");
                    AppError::PoolExhausted
                }
                other => other,
            })?;

        match outcome {
            ClaimOutcome::AlreadyClaimed(allocation) => {
                tracing::info!(code = %allocation.credit.code, "Returning existing credit");
                Ok(Registration {
                    user: allocation.user,
                    credit: allocation.credit,
                    is_existing: true,
                })
            }
            ClaimOutcome::Assigned(allocation) => {
                tracing::info!(code = %allocation.credit.code, %pool, "Credit assigned");
                self.mailer
                    .send_in_background(CreditNotice::from_allocation(&allocation, input.locale));
                Ok(Registration {
                    user: allocation.user,
                    credit: allocation.credit,
                    is_existing: false,
                })
            }
        }
    }

    pub async fn public_stats(&self) -> AppResult<PublicStats> {
        let credits = self.credits.counts().await?;
        let users = self.users.counts().await?;
        Ok(PublicStats {
            available_real: credits.available_real,
            total_eligible: users.approved,
            claimed: users.claimed,
        })
    }
}
