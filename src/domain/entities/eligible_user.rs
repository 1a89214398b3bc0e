use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use super::{approval_status::ApprovalStatus, credit::Credit, credit_pool::CreditPool};

/// A person allowed to claim one credit. Rows are created by import or by an
/// admin, never by self-registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub approval_status: ApprovalStatus,
    pub has_claimed: bool,
    pub claimed_at: Option<NaiveDateTime>,
    pub credit_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

impl EligibleUser {
    pub fn is_approved(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved
    }

    pub fn credit_pool(&self) -> CreditPool {
        CreditPool::for_company(self.company.as_deref())
    }
}

/// Dashboard row: a user together with the credit it currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleUserWithCredit {
    #[serde(flatten)]
    pub user: EligibleUser,
    pub credit: Option<Credit>,
}
