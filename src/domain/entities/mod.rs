pub mod approval_status;
pub mod credit;
pub mod credit_pool;
pub mod eligible_user;
