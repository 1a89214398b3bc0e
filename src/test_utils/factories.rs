//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::entities::{
    approval_status::ApprovalStatus, credit::Credit, eligible_user::EligibleUser,
};

/// Create an unused real credit with a unique code.
pub fn create_test_credit(overrides: impl FnOnce(&mut Credit)) -> Credit {
    let code = format!("CODE{}", &Uuid::new_v4().simple().to_string()[..8]).to_uppercase();
    let mut credit = Credit {
        id: Uuid::new_v4(),
        link: format!("https://cursor.com/referral?code={code}"),
        code,
        is_used: false,
        is_test: false,
        created_at: test_datetime(),
        assigned_at: None,
    };
    overrides(&mut credit);
    credit
}

/// Create an approved eligible user without a claim.
pub fn create_test_user(overrides: impl FnOnce(&mut EligibleUser)) -> EligibleUser {
    let mut user = EligibleUser {
        id: Uuid::new_v4(),
        email: format!("user-{}@example.com", Uuid::new_v4().simple()),
        name: "Test User".to_string(),
        company: None,
        role: None,
        approval_status: ApprovalStatus::Approved,
        has_claimed: false,
        claimed_at: None,
        credit_id: None,
        created_at: test_datetime(),
    };
    overrides(&mut user);
    user
}

/// Returns a fixed datetime for reproducible tests.
pub fn test_datetime() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-01-15 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

/// Fixed test datetime shifted back by `minutes`. Used to order credits.
pub fn minutes_ago(minutes: i64) -> NaiveDateTime {
    test_datetime() - chrono::Duration::minutes(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factories_produce_unique_rows() {
        let a = create_test_credit(|_| {});
        let b = create_test_credit(|_| {});
        assert_ne!(a.id, b.id);
        assert_ne!(a.code, b.code);
        assert!(a.link.ends_with(&a.code));

        let u = create_test_user(|u| u.name = "Custom".to_string());
        assert_eq!(u.name, "Custom");
        assert!(u.is_approved());
    }
}
