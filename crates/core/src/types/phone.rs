//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone cannot be empty")]
    Empty,
    /// The input contains something other than an optional leading `+` and digits.
    #[error("phone contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// Fewer digits than allowed.
    #[error("phone must have at least {min} digits")]
    TooShort {
        /// Minimum number of digits.
        min: usize,
    },
    /// More digits than allowed.
    #[error("phone must have at most {max} digits")]
    TooLong {
        /// Maximum number of digits.
        max: usize,
    },
}

/// A phone number: an optional leading `+` followed by 7-15 ASCII digits.
///
/// No separators, spaces or extensions are accepted and no normalization is
/// applied; the value is stored exactly as given.
///
/// ```
/// use rollcall_core::Phone;
///
/// assert!(Phone::parse("+14155551234").is_ok());
/// assert!(Phone::parse("5551234").is_ok());
///
/// assert!(Phone::parse("123").is_err());            // too short
/// assert!(Phone::parse("415-555-1234").is_err());   // separators
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 7;

    /// Maximum number of digits (E.164 limit).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns the first [`PhoneError`] rule the input violates.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        Self::validate(s)?;
        Ok(Self(s.to_owned()))
    }

    /// Check a phone number without allocating.
    ///
    /// # Errors
    ///
    /// Returns the first [`PhoneError`] rule the input violates.
    pub fn validate(s: &str) -> Result<(), PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let digits = s.strip_prefix('+').unwrap_or(s);

        if let Some(c) = digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(PhoneError::InvalidCharacter(c));
        }

        // All remaining chars are ASCII, so byte length equals digit count.
        if digits.len() < Self::MIN_DIGITS {
            return Err(PhoneError::TooShort {
                min: Self::MIN_DIGITS,
            });
        }

        if digits.len() > Self::MAX_DIGITS {
            return Err(PhoneError::TooLong {
                max: Self::MAX_DIGITS,
            });
        }

        Ok(())
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
