//! # SQLite Storage Module
//!
//! SQLite-backed persistence for members, contribution months, and payments.
//!
//! ## Components
//!
//! - **connection.rs** - pool management and schema setup
//! - **repositories/** - one repository per table

pub mod connection;
pub mod repositories;

pub use connection::DbConnection;
pub use repositories::{MemberRepository, MonthRepository, PaymentRepository};
