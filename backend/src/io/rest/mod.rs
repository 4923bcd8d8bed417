//! # REST API Interface Layer
//!
//! Thin HTTP endpoints over the domain services. This layer handles
//! JSON serialization, error translation to status codes, and request
//! logging; it contains no business logic of its own.

pub mod member_apis;
pub mod month_apis;
pub mod payment_apis;

pub use member_apis::*;
pub use month_apis::*;
pub use payment_apis::*;
