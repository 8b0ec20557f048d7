//! sqlvet diagnostics and error handling
//!
//! This crate provides the reporting infrastructure shared by every sqlvet crate:
//! the closed set of diagnostic codes, the `ValidationProblem` record produced by
//! semantic rules, and the error type used for operational failures (loading a
//! catalog or a configuration file).

mod error;
mod problem;
mod problem_code;

pub use error::*;
pub use problem::*;
pub use problem_code::*;

/// Result type for sqlvet operations
pub type Result<T> = std::result::Result<T, SqlvetError>;
