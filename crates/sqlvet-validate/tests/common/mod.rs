//! Shared fixtures for validation tests
//!
//! The fixture catalog models a small shop:
//! - `users(id, name, email, ssn, created_at, active)`
//! - `orders(id, user_id, amount, status, placed_at)`
//! - `products(id, name, price)`
//! - `events(id, user_id, payload, occurred_at)`

#![allow(dead_code)]

use sqlvet_ast::{Expr, Query, SelectItem, SelectQuery, TableRef};
use sqlvet_catalog::{InMemoryCatalog, TableMetadata};
use sqlvet_diagnostics::{ProblemCode, ValidationProblem};
use sqlvet_types::DbType;
use sqlvet_validate::{ValidationConfig, validate};

/// The shop catalog with the standard functions
pub fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::standard()
        .with_table(
            TableMetadata::new("users")
                .with_column("id", DbType::Integer)
                .with_column("name", DbType::String)
                .with_column("email", DbType::String)
                .with_column("ssn", DbType::String)
                .with_column("created_at", DbType::Timestamp)
                .with_column("active", DbType::Boolean),
        )
        .with_table(
            TableMetadata::new("orders")
                .with_column("id", DbType::Integer)
                .with_column("user_id", DbType::Integer)
                .with_column("amount", DbType::Decimal)
                .with_column("status", DbType::String)
                .with_column("placed_at", DbType::Date),
        )
        .with_table(
            TableMetadata::new("products")
                .with_column("id", DbType::Integer)
                .with_column("name", DbType::String)
                .with_column("price", DbType::Decimal),
        )
        .with_table(
            TableMetadata::new("events")
                .with_column("id", DbType::Long)
                .with_column("user_id", DbType::Integer)
                .with_column("payload", DbType::Json)
                .with_column("occurred_at", DbType::Timestamp),
        )
}

/// Validate against the shop catalog with the default configuration
pub fn check(query: impl Into<Query>) -> Vec<ValidationProblem> {
    check_in(&catalog(), query)
}

/// Validate against a given catalog with the default configuration
pub fn check_in(catalog: &InMemoryCatalog, query: impl Into<Query>) -> Vec<ValidationProblem> {
    let query = query.into();
    validate(&query, catalog, &ValidationConfig::default())
}

/// Codes of the problems found, in report order
pub fn codes(query: impl Into<Query>) -> Vec<ProblemCode> {
    check(query).into_iter().map(|p| p.code).collect()
}

pub fn codes_in(catalog: &InMemoryCatalog, query: impl Into<Query>) -> Vec<ProblemCode> {
    check_in(catalog, query).into_iter().map(|p| p.code).collect()
}

/// Plain select items
pub fn items(exprs: Vec<Expr>) -> Vec<SelectItem> {
    exprs.into_iter().map(SelectItem::expr).collect()
}

/// `SELECT exprs FROM table`
pub fn select_from(table: &str, exprs: Vec<Expr>) -> SelectQuery {
    SelectQuery::new(items(exprs)).from(TableRef::table(table))
}

/// `SELECT * FROM table`
pub fn star_from(table: &str) -> SelectQuery {
    SelectQuery::new(vec![SelectItem::Star]).from(TableRef::table(table))
}
