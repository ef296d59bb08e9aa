//! HTML form payloads and server-side validation.
//!
//! Every form struct defaults missing fields so a partial submission
//! re-renders with errors instead of failing extraction. Field checks here
//! are synchronous; checks that need the database (username uniqueness,
//! credential verification) run in the handlers and append to the same
//! [`FormErrors`].

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::ValidateLength;

use crate::utils::urls::validate_full_url;

pub const USERNAME_MIN: u64 = 3;
pub const USERNAME_MAX: u64 = 30;
pub const PASSWORD_MIN: u64 = 6;
pub const PASSWORD_MAX: u64 = 50;
pub const FULL_URL_MIN: u64 = 5;
pub const FULL_URL_MAX: u64 = 500;

/// Key for errors that belong to the form as a whole rather than one field.
pub const FORM_FIELD: &str = "form";

/// Per-field validation messages keyed by field name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// Messages for one field; empty slice when the field is clean.
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.0.is_empty()
    }
}

fn check_length(
    errors: &mut FormErrors,
    field: &str,
    label: &str,
    value: &str,
    min: u64,
    max: u64,
) {
    if value.is_empty() {
        errors.add(field, format!("{label} field is required."));
    } else if !value.validate_length(Some(min), Some(max), None) {
        errors.add(
            field,
            format!(
                "{label} length must not be less than {min} and more than {max} characters."
            ),
        );
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl LoginForm {
    pub fn field_errors(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        check_length(
            &mut errors,
            "username",
            "Username",
            &self.username,
            USERNAME_MIN,
            USERNAME_MAX,
        );
        check_length(
            &mut errors,
            "password",
            "Password",
            &self.password,
            PASSWORD_MIN,
            PASSWORD_MAX,
        );
        errors
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl RegisterForm {
    pub fn field_errors(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        check_length(
            &mut errors,
            "username",
            "Username",
            &self.username,
            USERNAME_MIN,
            USERNAME_MAX,
        );
        check_length(
            &mut errors,
            "password",
            "Password",
            &self.password,
            PASSWORD_MIN,
            PASSWORD_MAX,
        );

        if self.password_confirm.is_empty() {
            errors.add("password_confirm", "Password confirm field is required.");
        } else if self.password_confirm != self.password {
            errors.add("password_confirm", "Passwords must match.");
        }

        errors
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct DeactivateForm {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl DeactivateForm {
    pub fn field_errors(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        check_length(
            &mut errors,
            "password",
            "Password",
            &self.password,
            PASSWORD_MIN,
            PASSWORD_MAX,
        );
        errors
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ShortUrlForm {
    #[serde(default)]
    pub full_url: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl ShortUrlForm {
    pub fn field_errors(&self) -> FormErrors {
        let mut errors = FormErrors::default();

        if self.full_url.is_empty() {
            errors.add("full_url", "Full URL field is required.");
            return errors;
        }

        if let Err(message) = validate_full_url(&self.full_url) {
            errors.add("full_url", message);
        }

        if !self
            .full_url
            .validate_length(Some(FULL_URL_MIN), Some(FULL_URL_MAX), None)
        {
            errors.add(
                "full_url",
                format!(
                    "Full URL length must not be less than {FULL_URL_MIN} and more than {FULL_URL_MAX} characters."
                ),
            );
        }

        errors
    }
}
