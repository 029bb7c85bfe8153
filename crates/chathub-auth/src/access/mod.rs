//! Topic authorization.

pub mod checker;

pub use checker::AccessChecker;
