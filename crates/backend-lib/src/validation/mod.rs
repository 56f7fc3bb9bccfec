// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request body validation.

use contacts_common::{ContactCreate, ContactUpdate};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::error::AppError;

// Common validation constants
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_NAME_LENGTH: usize = 100;
const MAX_PHONE_LENGTH: usize = 32;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit

// Regex patterns for validation
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ()-]*$").expect("valid phone regex"));

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a password; any non-empty password up to the length cap is accepted
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    if password.is_empty() {
        return Err(ValidationError::InvalidPassword(
            "Password must not be empty".to_string(),
        ));
    }

    if password.chars().count() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password cannot exceed {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(password)
}

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Email address cannot be empty".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email address cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email address format".to_string(),
        ));
    }

    Ok(email)
}

fn validate_name<'a>(field: &str, name: &'a str) -> ValidationResult<&'a str> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidName(format!("{field} must not be empty")));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName(format!(
            "{field} cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name)
}

fn validate_phone(phone: &str) -> ValidationResult<&str> {
    if phone.len() > MAX_PHONE_LENGTH {
        return Err(ValidationError::InvalidPhone(format!(
            "Phone number cannot exceed {MAX_PHONE_LENGTH} characters"
        )));
    }
    if !PHONE_REGEX.is_match(phone) {
        return Err(ValidationError::InvalidPhone(
            "Phone number may only contain digits, spaces, parentheses, dashes and a leading +"
                .to_string(),
        ));
    }
    Ok(phone)
}

/// Validate a new contact
pub fn validate_contact_create(contact: &ContactCreate) -> ValidationResult<()> {
    validate_name("First name", &contact.first_name)?;
    if let Some(last_name) = contact.last_name.as_deref().filter(|s| !s.is_empty()) {
        validate_name("Last name", last_name)?;
    }
    if let Some(email) = contact.email.as_deref() {
        validate_email(email)?;
    }
    if let Some(phone) = contact.phone_number.as_deref() {
        validate_phone(phone)?;
    }
    Ok(())
}

/// Validate a partial contact update; only present fields are checked
pub fn validate_contact_update(update: &ContactUpdate) -> ValidationResult<()> {
    if let Some(first_name) = update.first_name.as_deref() {
        validate_name("First name", first_name)?;
    }
    if let Some(last_name) = update.last_name.as_deref().filter(|s| !s.is_empty()) {
        validate_name("Last name", last_name)?;
    }
    if let Some(email) = update.email.as_deref() {
        validate_email(email)?;
    }
    if let Some(phone) = update.phone_number.as_deref() {
        validate_phone(phone)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("pw1").is_ok());
        assert!(validate_password(&"x".repeat(128)).is_ok());

        assert!(matches!(
            validate_password(""),
            Err(ValidationError::InvalidPassword(_))
        ));
        assert!(matches!(
            validate_password(&"x".repeat(129)),
            Err(ValidationError::InvalidPassword(_))
        ));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name+tag@example.co.uk").is_ok());
        assert!(validate_email("a@x.com").is_ok());

        // No @
        assert!(matches!(
            validate_email("test.example.com"),
            Err(ValidationError::InvalidEmail(_))
        ));

        // No domain
        assert!(matches!(
            validate_email("test@"),
            Err(ValidationError::InvalidEmail(_))
        ));

        // No TLD
        assert!(matches!(
            validate_email("test@example"),
            Err(ValidationError::InvalidEmail(_))
        ));

        let long = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&long).is_err());
    }

    #[test]
    fn test_validate_contact_create() {
        let ok = ContactCreate {
            first_name: "Ada".into(),
            last_name: Some("Lovelace".into()),
            phone_number: Some("+44 (20) 555-0100".into()),
            ..Default::default()
        };
        assert!(validate_contact_create(&ok).is_ok());

        let blank = ContactCreate {
            first_name: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(
            validate_contact_create(&blank),
            Err(ValidationError::InvalidName(_))
        ));

        let bad_phone = ContactCreate {
            first_name: "Ada".into(),
            phone_number: Some("call me".into()),
            ..Default::default()
        };
        assert!(matches!(
            validate_contact_create(&bad_phone),
            Err(ValidationError::InvalidPhone(_))
        ));

        let bad_email = ContactCreate {
            first_name: "Ada".into(),
            email: Some("nope".into()),
            ..Default::default()
        };
        assert!(validate_contact_create(&bad_email).is_err());
    }

    #[test]
    fn test_validate_contact_update_checks_present_fields_only() {
        assert!(validate_contact_update(&ContactUpdate::default()).is_ok());

        let update = ContactUpdate {
            first_name: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_contact_update(&update).is_err());
    }

    #[test]
    fn test_validation_error_maps_to_bad_request() {
        let err: AppError = ValidationError::InvalidEmail("x".into()).into();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
