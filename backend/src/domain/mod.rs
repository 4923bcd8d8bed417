//! # Domain Module
//!
//! Business logic for the chama tracker. Everything that decides what a
//! valid payment entry is, what fine it carries, and which members and
//! months are open for entry lives here, independent of the storage and
//! IO layers.
//!
//! ## Module Organization
//!
//! - **schedule**: billing period date arithmetic (month normalization,
//!   due dates, month labels)
//! - **fines**: the pure fine/status derivation applied on every save
//! - **member_service**: member registration and the active candidate set
//! - **month_service**: contribution month lifecycle and entry locks
//! - **payment_service**: payment entry, validation, and correction

pub mod fines;
pub mod member_service;
pub mod month_service;
pub mod payment_service;
pub mod schedule;

pub use member_service::*;
pub use month_service::*;
pub use payment_service::*;
