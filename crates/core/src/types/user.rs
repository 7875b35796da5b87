//! Input rows and registered users.

use serde::{Deserialize, Serialize};

use super::{Email, Phone, RegistrationPayload, UserId};

/// One decoded spreadsheet row, before validation.
///
/// Each field is `None` when the corresponding cell is empty or the column
/// is missing from the sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRow {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl InputRow {
    /// Create a row with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the email cell.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the phone cell.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Returns `true` if every cell is empty.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// A user that has been assigned an identifier.
///
/// Only created by the registration service. Absent contact fields are
/// omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub user_id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<Phone>,
}

impl RegisteredUser {
    /// Assign `user_id` to a validated payload.
    #[must_use]
    pub fn new(user_id: UserId, payload: RegistrationPayload) -> Self {
        let (name, email, phone) = payload.into_parts();
        Self {
            user_id,
            name,
            email,
            phone,
        }
    }
}
