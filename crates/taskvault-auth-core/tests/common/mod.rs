//! Common test utilities for taskvault-auth-core integration tests

pub mod mock_repos;

#[allow(unused_imports)]
pub use mock_repos::{MockRefreshTokenRepository, MockUserRepository};
