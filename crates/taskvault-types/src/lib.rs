//! Taskvault Types - Shared domain types
//!
//! This crate contains domain types used across Taskvault crates:
//! - User identity
//! - Task status and priority

pub mod task;
pub mod user;

pub use task::*;
pub use user::*;
