//! # chathub-core
//!
//! Core crate for ChatHub. Holds the configuration schema, typed
//! identifiers, and the error type every other crate propagates.
//!
//! This crate has **no** internal dependencies on other ChatHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
