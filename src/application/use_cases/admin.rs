use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        locale::Locale,
        validators::{
            MAX_CREDIT_CODE_LEN, MAX_NAME_LEN, is_valid_credit_code, is_valid_credit_link,
            is_valid_email, is_valid_name, normalize_email,
        },
    },
    domain::entities::{
        approval_status::ApprovalStatus,
        credit::Credit,
        credit_pool::CreditPool,
        eligible_user::{EligibleUser, EligibleUserWithCredit},
    },
    use_cases::{
        allocation::{Allocation, AllocationStore, ClaimOutcome, ClaimRequest},
        inventory::{CreditRepo, DeleteOutcome, EligibleUserRepo, NewCredit, NewEligibleUser},
        notification::{CreditMailer, CreditNotice},
    },
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_credits: i64,
    pub used_credits: i64,
    /// Unused real credits.
    pub available_credits: i64,
    pub test_credits: i64,
    pub real_credits: i64,
    pub total_eligible: i64,
    pub claimed_users: i64,
    pub approved_users: i64,
    pub pending_users: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub credits: Vec<Credit>,
    pub eligible_users: Vec<EligibleUserWithCredit>,
}

#[derive(Debug, Clone)]
pub struct AddEligibleUserInput {
    pub email: String,
    pub name: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub approval_status: Option<ApprovalStatus>,
}

#[derive(Debug, Clone)]
pub struct AddCreditInput {
    pub code: String,
    pub link: String,
    pub is_test: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Operator actions over credits and eligible users. Callers must have
/// checked the admin session.
#[derive(Clone)]
pub struct AdminUseCases {
    users: Arc<dyn EligibleUserRepo>,
    credits: Arc<dyn CreditRepo>,
    allocation: Arc<dyn AllocationStore>,
    mailer: CreditMailer,
}

impl AdminUseCases {
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

    /// Force-assigns a credit from the chosen pool. Approval status is not
    /// checked.
    #[instrument(skip(self))]
    pub async fn assign_credit(&self, email: &str, pool: CreditPool) -> AppResult<Allocation> {
        let email = normalize_email(email);
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        match self
            .allocation
            .claim(ClaimRequest {
                user_id: user.id,
                pool,
                display_name: None,
            })
            .await?
        {
            ClaimOutcome::Assigned(allocation) => {
                tracing::info!(code = %allocation.credit.code, %pool, "Admin assigned credit");
                Ok(allocation)
            }
            ClaimOutcome::AlreadyClaimed(_) => Err(AppError::AlreadyClaimed),
        }
    }

    #[instrument(skip(self))]
    pub async fn revoke_credit(&self, user_id: Uuid) -> AppResult<Allocation> {
        let released = self.allocation.revoke(user_id).await?;
        tracing::info!(code = %released.credit.code, "Admin revoked credit");
        Ok(released)
    }

    #[instrument(skip(self, input), fields(email = %input.email.trim()))]
    pub async fn add_eligible_user(&self, input: AddEligibleUserInput) -> AppResult<EligibleUser> {
        if !is_valid_email(&input.email) {
            return Err(AppError::InvalidInput("Invalid email format".into()));
        }
        if !is_valid_name(&input.name) {
            return Err(AppError::InvalidInput(format!(
                "Name is required (max {MAX_NAME_LEN} characters)"
            )));
        }

        let user = self
            .users
            .create(NewEligibleUser {
                email: normalize_email(&input.email),
                name: input.name.trim().to_string(),
                company: non_blank(input.company),
                role: non_blank(input.role),
                approval_status: input.approval_status.unwrap_or_default(),
            })
            .await?;
        tracing::info!(user_id = %user.id, "Eligible user added");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn update_user_status(
        &self,
        user_id: Uuid,
        status: ApprovalStatus,
    ) -> AppResult<EligibleUser> {
        self.users
            .update_status(user_id, status)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    #[instrument(skip(self, input), fields(code = %input.code.trim()))]
    pub async fn add_credit(&self, input: AddCreditInput) -> AppResult<Credit> {
        let code = input.code.trim();
        if !is_valid_credit_code(code) {
            return Err(AppError::InvalidInput(format!(
                "Credit code must be 1-{MAX_CREDIT_CODE_LEN} letters, digits, '-' or '_'"
            )));
        }
        if !is_valid_credit_link(&input.link) {
            return Err(AppError::InvalidInput(
                "Credit link must be an absolute http(s) URL".into(),
            ));
        }

        let credit = self
            .credits
            .create(NewCredit {
                code: code.to_string(),
                link: input.link.trim().to_string(),
                is_test: input.is_test,
            })
            .await?;
        tracing::info!(credit_id = %credit.id, is_test = credit.is_test, "Credit added");
        Ok(credit)
    }

    #[instrument(skip(self))]
    pub async fn delete_credit(&self, credit_id: Uuid) -> AppResult<Credit> {
        match self.credits.delete_unused(credit_id).await? {
            DeleteOutcome::Deleted(credit) => Ok(credit),
            DeleteOutcome::Refused(_) => Err(AppError::Conflict(
                "Cannot delete a credit that is assigned to a user".into(),
            )),
            DeleteOutcome::NotFound => Err(AppError::NotFound("Credit not found".into())),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_eligible_user(&self, user_id: Uuid) -> AppResult<EligibleUser> {
        match self.users.delete_unclaimed(user_id).await? {
            DeleteOutcome::Deleted(user) => Ok(user),
            DeleteOutcome::Refused(_) => Err(AppError::Conflict(
                "Revoke the user's credit before deleting them".into(),
            )),
            DeleteOutcome::NotFound => Err(AppError::NotFound("User not found".into())),
        }
    }

    /// Re-sends the credit email and waits for the provider.
    #[instrument(skip(self))]
    pub async fn send_credit_email(&self, user_id: Uuid, locale: Locale) -> AppResult<EligibleUser> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        let Some(credit_id) = user.credit_id.filter(|_| user.has_claimed) else {
            return Err(AppError::InvalidInput("User has no credit assigned".into()));
        };
        let credit = self
            .credits
            .get_by_id(credit_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("Credit {credit_id} missing for claimed user"))
            })?;

        let allocation = Allocation { user, credit };
        self.mailer
            .send(&CreditNotice::from_allocation(&allocation, locale))
            .await
            .map_err(|err| match err {
                AppError::EmailDelivery(msg) => AppError::EmailDelivery(msg),
                other => AppError::EmailDelivery(other.to_string()),
            })?;
        Ok(allocation.user)
    }

    pub async fn dashboard(&self) -> AppResult<Dashboard> {
        let credit_counts = self.credits.counts().await?;
        let user_counts = self.users.counts().await?;
        let credits = self.credits.list_all().await?;
        let eligible_users = self.users.list_with_credits().await?;

        Ok(Dashboard {
            stats: DashboardStats {
                total_credits: credit_counts.total,
                used_credits: credit_counts.used,
                available_credits: credit_counts.available_real,
                test_credits: credit_counts.test,
                real_credits: credit_counts.total - credit_counts.test,
                total_eligible: user_counts.total,
                claimed_users: user_counts.claimed,
                approved_users: user_counts.approved,
                pending_users: user_counts.pending_approval,
            },
            credits,
            eligible_users,
        })
    }
}
