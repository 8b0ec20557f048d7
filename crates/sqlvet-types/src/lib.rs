//! sqlvet type model
//!
//! This crate defines:
//! - [`DbType`], the closed set of scalar kinds, with the comparability relation
//!   and classification predicates
//! - [`Inferred`], the three-valued result of type and shape inference
//! - [`FunctionSignature`], the arity and argument-kind contract of a function

pub mod db_type;
pub mod inferred;
pub mod signature;

pub use db_type::*;
pub use inferred::*;
pub use signature::*;
