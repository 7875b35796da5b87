//! Contact validators.
//!
//! Both functions are total: they accept any string and never panic.

use crate::types::{Email, Phone};

/// Returns `true` if `s` is a syntactically valid email address.
///
/// Equivalent to matching `^[^\s@]+@[^\s@]+\.[^\s@]+$`, with `\s` being
/// the ECMAScript whitespace class.
#[must_use]
pub fn is_valid_email(s: &str) -> bool {
    Email::validate(s).is_ok()
}

/// Returns `true` if `s` is an optional `+` followed by 7-15 ASCII digits.
#[must_use]
pub fn is_valid_phone(s: &str) -> bool {
    Phone::validate(s).is_ok()
}
