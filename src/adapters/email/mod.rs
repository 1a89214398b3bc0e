pub mod log_only;
pub mod resend;
