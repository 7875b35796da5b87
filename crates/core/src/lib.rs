//! Rollcall Core - Shared domain types library.
//!
//! This crate provides the types used across all Rollcall components:
//! - `server` - HTTP service that registers users and runs bulk imports
//! - `cli` - Command-line tools for importing spreadsheets offline
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no spreadsheet codecs. This keeps it lightweight and allows it to
//! be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated newtypes for emails, phone numbers, user IDs, and
//!   the registration data model
//! - [`validation`] - Total, side-effect free contact validators

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{is_valid_email, is_valid_phone};
