use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Event approval state of an eligible user. Only `Approved` users may
/// self-register for a credit.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Approved,
    PendingApproval,
    Declined,
    Waitlist,
    Invited,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    /// Parse a stored or imported value, case-insensitively.
    pub fn from_raw(raw: &str) -> Option<Self> {
        raw.trim().to_lowercase().parse().ok()
    }
}
