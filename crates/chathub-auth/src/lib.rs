//! # chathub-auth
//!
//! Identity and authorization collaborators for ChatHub.
//!
//! ## Modules
//!
//! - `jwt`: bearer token issuance and validation
//! - `password`: Argon2id hashing and the registration length rule
//! - `access`: participant and creator checks for rooms and conversations

pub mod access;
pub mod jwt;
pub mod password;

pub use access::AccessChecker;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
