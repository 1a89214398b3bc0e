//! The allocation transaction: the only path that binds or unbinds a credit
//! and an eligible user.
//!
//! Implementations must run each operation as one atomic unit:
//! - `claim` locks the user, returns the existing binding if there is one,
//!   otherwise takes the oldest unused credit of the pool (never one another
//!   concurrent claim is taking) and marks both sides.
//! - `revoke` locks the user and clears both sides.
//!
//! Two claims for one user never yield two credits, and one credit is never
//! handed to two users.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    domain::entities::{credit::Credit, credit_pool::CreditPool, eligible_user::EligibleUser},
};

#[derive(Debug, Clone)]
pub struct ClaimRequest {
    pub user_id: Uuid,
    pub pool: CreditPool,
    /// Replaces the stored display name when the claim succeeds.
    pub display_name: Option<String>,
}

/// A user and the credit bound to it, as stored after the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub user: EligibleUser,
    pub credit: Credit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Assigned(Allocation),
    /// The user already held a credit; nothing was changed.
    AlreadyClaimed(Allocation),
}

#[async_trait]
pub trait AllocationStore: Send + Sync {
    /// Errors: `NotFound` for an unknown user, `PoolExhausted` when the pool
    /// has no unused credit (the user row is left unchanged).
    async fn claim(&self, request: ClaimRequest) -> AppResult<ClaimOutcome>;

    /// Errors: `NotFound` for an unknown user, `NothingToRevoke` when the
    /// user holds no credit. Returns the released credit and the cleared user.
    async fn revoke(&self, user_id: Uuid) -> AppResult<Allocation>;
}
