//! Test utilities shared by unit and HTTP tests.
//!
//! This module provides:
//! - Test data factories with override closures
//! - An in-memory store implementing every persistence port
//! - Recording and failing email senders
//! - `TestAppStateBuilder` for router-level tests

mod app_state_builder;
mod email_mocks;
mod factories;
mod in_memory_store;

pub use app_state_builder::*;
pub use email_mocks::*;
pub use factories::*;
pub use in_memory_store::*;
