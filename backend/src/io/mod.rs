//! # IO Module
//!
//! The interface layer that exposes backend functionality to callers.

pub mod rest;

pub use rest::*;
