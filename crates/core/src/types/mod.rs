//! Core types for Rollcall.
//!
//! This module provides type-safe wrappers for the registration domain.

pub mod email;
pub mod id;
pub mod phone;
pub mod registration;
pub mod user;

pub use email::{Email, EmailError};
pub use id::UserId;
pub use phone::{Phone, PhoneError};
pub use registration::{RegistrationError, RegistrationPayload, RegistrationRequest};
pub use user::{InputRow, RegisteredUser};
