pub mod admin;
pub mod allocation;
pub mod inventory;
pub mod notification;
pub mod registration;
