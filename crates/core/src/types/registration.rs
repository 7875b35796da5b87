//! Registration request, validated payload, and rejection reasons.

use serde::{Deserialize, Serialize};

use super::{Email, Phone};

/// Reasons a registration is rejected.
///
/// Checks run in declaration order and the first failing check wins. The
/// display strings double as the wire-level error messages of the
/// registration endpoint.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    /// Name is absent or empty.
    #[error("Name is required")]
    MissingName,
    /// Neither email nor phone supplied.
    #[error("At least email or phone is required")]
    MissingContact,
    /// Email supplied but not a valid address.
    #[error("Invalid email format")]
    InvalidEmail,
    /// Phone supplied but not a valid number.
    #[error("Invalid phone format")]
    InvalidPhone,
}

impl RegistrationError {
    /// All variants, in check order.
    pub const ALL: [Self; 4] = [
        Self::MissingName,
        Self::MissingContact,
        Self::InvalidEmail,
        Self::InvalidPhone,
    ];

    /// Recover a variant from its wire-level message.
    #[must_use]
    pub fn from_message(message: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.to_string() == message)
    }
}

/// Unvalidated registration input, as received on the wire.
///
/// Empty strings are treated the same as absent fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A registration payload that satisfies every registration rule.
///
/// Invariants: `name` is non-empty, at least one of `email`/`phone` is
/// present, and every present contact field is syntactically valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationPayload {
    name: String,
    email: Option<Email>,
    phone: Option<Phone>,
}

impl RegistrationPayload {
    /// Build a payload from already-validated contact fields.
    ///
    /// # Errors
    ///
    /// Returns `MissingName` if `name` is empty, `MissingContact` if both
    /// contact fields are `None`.
    pub fn new(
        name: impl Into<String>,
        email: Option<Email>,
        phone: Option<Phone>,
    ) -> Result<Self, RegistrationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistrationError::MissingName);
        }
        if email.is_none() && phone.is_none() {
            return Err(RegistrationError::MissingContact);
        }
        Ok(Self { name, email, phone })
    }

    /// The registrant's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The validated email, if supplied.
    #[must_use]
    pub const fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    /// The validated phone, if supplied.
    #[must_use]
    pub const fn phone(&self) -> Option<&Phone> {
        self.phone.as_ref()
    }

    /// Split the payload into its fields.
    #[must_use]
    pub fn into_parts(self) -> (String, Option<Email>, Option<Phone>) {
        (self.name, self.email, self.phone)
    }
}

impl TryFrom<RegistrationRequest> for RegistrationPayload {
    type Error = RegistrationError;

    fn try_from(request: RegistrationRequest) -> Result<Self, Self::Error> {
        let name = non_empty(request.name).ok_or(RegistrationError::MissingName)?;
        let email = non_empty(request.email);
        let phone = non_empty(request.phone);

        if email.is_none() && phone.is_none() {
            return Err(RegistrationError::MissingContact);
        }

        let email = email
            .map(|e| Email::parse(&e))
            .transpose()
            .map_err(|_| RegistrationError::InvalidEmail)?;
        let phone = phone
            .map(|p| Phone::parse(&p))
            .transpose()
            .map_err(|_| RegistrationError::InvalidPhone)?;

        Ok(Self { name, email, phone })
    }
}

impl From<RegistrationPayload> for RegistrationRequest {
    fn from(payload: RegistrationPayload) -> Self {
        Self {
            name: Some(payload.name),
            email: payload.email.map(Email::into_inner),
            phone: payload.phone.map(Phone::into_inner),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(name: Option<&str>, email: Option<&str>, phone: Option<&str>) -> RegistrationRequest {
        RegistrationRequest {
            name: name.map(String::from),
            email: email.map(String::from),
            phone: phone.map(String::from),
        }
    }

    #[test]
    fn test_missing_name() {
        let err = RegistrationPayload::try_from(request(None, Some("a@b.com"), None)).unwrap_err();
        assert_eq!(err, RegistrationError::MissingName);

        let err =
            RegistrationPayload::try_from(request(Some(""), Some("a@b.com"), None)).unwrap_err();
        assert_eq!(err, RegistrationError::MissingName);
    }

    #[test]
    fn test_missing_contact() {
        let err = RegistrationPayload::try_from(request(Some("Alice"), None, None)).unwrap_err();
        assert_eq!(err, RegistrationError::MissingContact);

        let err =
            RegistrationPayload::try_from(request(Some("Alice"), Some(""), Some(""))).unwrap_err();
        assert_eq!(err, RegistrationError::MissingContact);
    }

    #[test]
    fn test_invalid_email_checked_before_phone() {
        let err = RegistrationPayload::try_from(request(Some("Carl"), Some("bad-email"), Some("1")))
            .unwrap_err();
        assert_eq!(err, RegistrationError::InvalidEmail);
    }

    #[test]
    fn test_invalid_phone() {
        let err =
            RegistrationPayload::try_from(request(Some("Bob"), None, Some("123"))).unwrap_err();
        assert_eq!(err, RegistrationError::InvalidPhone);
    }

    #[test]
    fn test_name_checked_before_contact() {
        let err = RegistrationPayload::try_from(request(None, None, None)).unwrap_err();
        assert_eq!(err, RegistrationError::MissingName);
    }

    #[test]
    fn test_valid_payload_keeps_supplied_fields_only() {
        let payload =
            RegistrationPayload::try_from(request(Some("Alice"), Some("alice@example.com"), None))
                .unwrap();
        assert_eq!(payload.name(), "Alice");
        assert_eq!(payload.email().unwrap().as_str(), "alice@example.com");
        assert!(payload.phone().is_none());
    }

    #[test]
    fn test_new_enforces_invariants() {
        assert_eq!(
            RegistrationPayload::new("", Some(Email::parse("a@b.com").unwrap()), None),
            Err(RegistrationError::MissingName)
        );
        assert_eq!(
            RegistrationPayload::new("Alice", None, None),
            Err(RegistrationError::MissingContact)
        );
    }

    #[test]
    fn test_error_messages_round_trip() {
        for err in RegistrationError::ALL {
            assert_eq!(RegistrationError::from_message(&err.to_string()), Some(err));
        }
        assert_eq!(RegistrationError::from_message("something else"), None);
    }

    #[test]
    fn test_request_serialization_omits_absent_fields() {
        let payload = RegistrationPayload::new(
            "Carl",
            None,
            Some(Phone::parse("+14155551234").unwrap()),
        )
        .unwrap();
        let json = serde_json::to_value(RegistrationRequest::from(payload)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "Carl", "phone": "+14155551234" })
        );
    }

    #[test]
    fn test_request_deserializes_with_missing_fields() {
        let req: RegistrationRequest = serde_json::from_str(r#"{"name":"Alice"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Alice"));
        assert!(req.email.is_none());
        assert!(req.phone.is_none());
    }
}
