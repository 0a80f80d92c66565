//! Taskvault Auth Core - Authentication business logic
//!
//! Core authentication functionality: token signing and verification,
//! password hashing, and the login/refresh/logout session protocol.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::{parse_lifetime, AuthConfig};
pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use service::*;
pub use token::{Claims, TokenCodec};
