use serde::{Deserialize, Serialize};

/// Company name that routes an attendee to the test pool.
///
/// Matching is exact (case and whitespace sensitive). Existing rows rely on this
/// literal, so it is not a configurable flag.
pub const TEST_COMPANY: &str = "Test Company";

/// Partition of credits by their `is_test` flag. Claims only draw from the
/// matching pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditPool {
    Real,
    Test,
}

impl CreditPool {
    pub fn from_is_test(is_test: bool) -> Self {
        if is_test {
            CreditPool::Test
        } else {
            CreditPool::Real
        }
    }

    pub fn for_company(company: Option<&str>) -> Self {
        Self::from_is_test(company == Some(TEST_COMPANY))
    }

    pub fn is_test(&self) -> bool {
        matches!(self, CreditPool::Test)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CreditPool::Real => "real",
            CreditPool::Test => "test",
        }
    }
}

impl std::fmt::Display for CreditPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
