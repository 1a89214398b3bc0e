//! Ports for the credit and eligibility stores.
//!
//! Neither repo mutates claim state; that goes through
//! [`AllocationStore`](super::allocation::AllocationStore).

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    domain::entities::{
        approval_status::ApprovalStatus,
        credit::Credit,
        eligible_user::{EligibleUser, EligibleUserWithCredit},
    },
};

#[derive(Debug, Clone)]
pub struct NewCredit {
    pub code: String,
    pub link: String,
    pub is_test: bool,
}

#[derive(Debug, Clone)]
pub struct NewEligibleUser {
    /// Already normalized (trimmed, lowercase).
    pub email: String,
    pub name: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub approval_status: ApprovalStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CreditCounts {
    pub total: i64,
    pub used: i64,
    pub available_real: i64,
    pub test: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserCounts {
    pub total: i64,
    pub approved: i64,
    pub pending_approval: i64,
    pub claimed: i64,
}

/// Result of a guarded delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome<T> {
    Deleted(T),
    /// The row exists but is bound to a claim and was left untouched.
    Refused(T),
    NotFound,
}

#[async_trait]
pub trait CreditRepo: Send + Sync {
    /// Fails with `AppError::Conflict` when the code already exists.
    async fn create(&self, credit: NewCredit) -> AppResult<Credit>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Credit>>;
    /// Oldest first.
    async fn list_all(&self) -> AppResult<Vec<Credit>>;
    /// Deletes the credit only while it is unused.
    async fn delete_unused(&self, id: Uuid) -> AppResult<DeleteOutcome<Credit>>;
    async fn counts(&self) -> AppResult<CreditCounts>;
    /// Removes every credit. Callers clear eligible users first.
    async fn delete_all(&self) -> AppResult<u64>;
}

#[async_trait]
pub trait EligibleUserRepo: Send + Sync {
    /// Fails with `AppError::Conflict` when the email already exists.
    async fn create(&self, user: NewEligibleUser) -> AppResult<EligibleUser>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<EligibleUser>>;
    /// `email` must already be normalized.
    async fn get_by_email(&self, email: &str) -> AppResult<Option<EligibleUser>>;
    /// Oldest first, each user with the credit it holds.
    async fn list_with_credits(&self) -> AppResult<Vec<EligibleUserWithCredit>>;
    async fn update_status(
        &self,
        id: Uuid,
        status: ApprovalStatus,
    ) -> AppResult<Option<EligibleUser>>;
    /// Deletes the user only while it holds no credit.
    async fn delete_unclaimed(&self, id: Uuid) -> AppResult<DeleteOutcome<EligibleUser>>;
    async fn counts(&self) -> AppResult<UserCounts>;
    async fn delete_all(&self) -> AppResult<u64>;
}
