// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! exchanged between the contacts backend and its clients.
//! This module defines the JSON/form bodies of the HTTP API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Token type advertised alongside every issued token pair
pub const BEARER: &str = "bearer";

/// Body of `POST /users/register/`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    /// Account identity (email)
    pub email: String,
    /// Plain-text password, hashed before it is stored
    pub password: String,
}

/// Form body of `POST /users/login/`
///
/// Field names follow the OAuth2 password grant form.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Access/refresh token pair returned by login and refresh
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived token presented on every authenticated request
    pub access_token: String,
    /// Long-lived token used only to obtain a new pair
    pub refresh_token: String,
    /// Always `"bearer"`
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

impl TokenPair {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: BEARER.to_string(),
        }
    }
}

fn default_token_type() -> String {
    BEARER.to_string()
}

/// Public view of a registered account
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub email: String,
}

/// A stored contact
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone_number: String,
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub favorite: bool,
}

/// Body of `POST /contacts/`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ContactCreate {
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub favorite: Option<bool>,
}

/// Body of `PUT /contacts/{id}`; absent fields are left untouched
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ContactUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub favorite: Option<bool>,
}

/// Body of `GET /`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_pair_defaults_to_bearer() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"access_token":"a","refresh_token":"r"}"#).unwrap();
        assert_eq!(pair.token_type, "bearer");
        assert_eq!(pair, TokenPair::bearer("a".into(), "r".into()));
    }

    #[test]
    fn contact_create_accepts_minimal_body() {
        let body: ContactCreate = serde_json::from_str(r#"{"first_name":"Ada"}"#).unwrap();
        assert_eq!(body.first_name, "Ada");
        assert!(body.last_name.is_none());
        assert!(body.birthday.is_none());
    }

    #[test]
    fn contact_birthday_is_iso_date() {
        let contact: Contact = serde_json::from_str(
            r#"{"id":1,"first_name":"Ada","last_name":"L","email":null,
                "phone_number":"555","birthday":"1815-12-10"}"#,
        )
        .unwrap();
        assert_eq!(contact.birthday, NaiveDate::from_ymd_opt(1815, 12, 10));
        assert!(!contact.favorite);
    }
}
