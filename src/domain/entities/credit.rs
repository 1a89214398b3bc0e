use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use super::credit_pool::CreditPool;

/// A single-use license redemption code and its link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credit {
    pub id: Uuid,
    pub code: String,
    pub link: String,
    pub is_used: bool,
    pub is_test: bool,
    pub created_at: NaiveDateTime,
    pub assigned_at: Option<NaiveDateTime>,
}

impl Credit {
    pub fn pool(&self) -> CreditPool {
        CreditPool::from_is_test(self.is_test)
    }
}
