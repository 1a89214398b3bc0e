use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Email is not on the eligible list")]
    NotEligible,

    #[error("Eligible user is not approved")]
    NotApproved,

    #[error("No credits available in the requested pool")]
    PoolExhausted,

    #[error("User already has a credit assigned")]
    AlreadyClaimed,

    #[error("User has no credit to revoke")]
    NothingToRevoke,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Email delivery failed: {0}")]
    EmailDelivery(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    ValidationError,
    NotEligible,
    NotApproved,
    NoCredits,
    AlreadyClaimed,
    NothingToRevoke,
    Conflict,
    NotFound,
    InvalidCredentials,
    Unauthorized,
    EmailFailed,
    ServerError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotEligible => "NOT_ELIGIBLE",
            ErrorCode::NotApproved => "NOT_APPROVED",
            ErrorCode::NoCredits => "NO_CREDITS",
            ErrorCode::AlreadyClaimed => "ALREADY_CLAIMED",
            ErrorCode::NothingToRevoke => "NOTHING_TO_REVOKE",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::EmailFailed => "EMAIL_FAILED",
            ErrorCode::ServerError => "SERVER_ERROR",
        }
    }
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::InvalidInput(_) => ErrorCode::ValidationError,
            AppError::NotEligible => ErrorCode::NotEligible,
            AppError::NotApproved => ErrorCode::NotApproved,
            AppError::PoolExhausted => ErrorCode::NoCredits,
            AppError::AlreadyClaimed => ErrorCode::AlreadyClaimed,
            AppError::NothingToRevoke => ErrorCode::NothingToRevoke,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AppError::Unauthorized => ErrorCode::Unauthorized,
            AppError::EmailDelivery(_) => ErrorCode::EmailFailed,
            AppError::Database(_) | AppError::Internal(_) => ErrorCode::ServerError,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
