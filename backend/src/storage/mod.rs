//! # Storage Module
//!
//! Data persistence for the chama tracker. The schema-level uniqueness and
//! cascade constraints declared here are part of the system's contract:
//! at most one contribution month per calendar month, at most one payment
//! per (member, month), and payments removed with their member or month.

pub mod sqlite;

pub use sqlite::{DbConnection, MemberRepository, MonthRepository, PaymentRepository};

/// True when a repository error is the database rejecting a uniqueness
/// constraint, i.e. the residual race the advisory pre-checks cannot close.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}
