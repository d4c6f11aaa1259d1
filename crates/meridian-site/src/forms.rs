//! Form payloads and validation.
//!
//! Each form deserializes from a URL-encoded body and validates itself
//! into a [`ValidationErrors`] bag. Missing fields default to empty
//! strings so they surface as "required" failures rather than rejected
//! requests. Messages are full sentences ready for rendering.

use std::collections::HashMap;

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

/// Maximum accepted name length, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum accepted email length, in characters.
pub const MAX_EMAIL_LEN: usize = 255;

/// Maximum accepted contact message length, in characters.
pub const MAX_MESSAGE_LEN: usize = 1000;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Shown when a registration email is already in use.
pub const EMAIL_TAKEN_MESSAGE: &str = "The email has already been taken.";

/// Per-field validation messages, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FieldErrors {
    field: String,
    messages: Vec<String>,
}

/// Ordered validation error bag.
///
/// Fields appear in the order they were first reported; a field that
/// fails several rules keeps one entry with all of its messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    fields: Vec<FieldErrors>,
}

impl ValidationErrors {
    /// Records a message against a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        if let Some(entry) = self.fields.iter_mut().find(|e| e.field == field) {
            entry.messages.push(message);
        } else {
            self.fields.push(FieldErrors {
                field: field.to_string(),
                messages: vec![message],
            });
        }
    }

    /// True when at least one message has been recorded.
    pub fn any(&self) -> bool {
        !self.fields.is_empty()
    }

    /// True when no messages have been recorded.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when the named field has at least one message.
    pub fn has(&self, field: &str) -> bool {
        self.fields.iter().any(|e| e.field == field)
    }

    /// First message recorded for the named field.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|e| e.field == field)
            .and_then(|e| e.messages.first())
            .map(String::as_str)
    }

    /// Every message, flattened in field order.
    pub fn all(&self) -> Vec<&str> {
        self.fields
            .iter()
            .flat_map(|e| e.messages.iter().map(String::as_str))
            .collect()
    }

    /// Consumes the bag: `Ok(())` when empty, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.fields.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Contact form payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    /// Applies the contact rules: every field is required, name and
    /// email are capped at 255 characters and the message at 1000, and
    /// the email must parse as an address.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_required_text(&mut errors, "name", &self.name, MAX_NAME_LEN);
        check_required_email(&mut errors, &self.email);
        check_required_text(&mut errors, "message", &self.message, MAX_MESSAGE_LEN);
        errors.into_result()
    }

    /// Input to repopulate the form with after a failed submission.
    pub fn old_input(&self) -> HashMap<String, String> {
        HashMap::from([
            ("name".to_string(), self.name.trim().to_string()),
            ("email".to_string(), self.email.trim().to_string()),
            ("message".to_string(), self.message.trim().to_string()),
        ])
    }
}

/// Login form payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// Applies the login rules: both fields are required and the email
    /// must parse as an address. Credential checking happens later.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_required_email(&mut errors, &self.email);
        if self.password.is_empty() {
            errors.add("password", required("password"));
        }
        errors.into_result()
    }

    /// Input to repopulate the form with. Passwords are never echoed.
    pub fn old_input(&self) -> HashMap<String, String> {
        HashMap::from([("email".to_string(), self.email.trim().to_string())])
    }
}

/// Registration form payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

impl RegisterForm {
    /// Applies the registration rules: name and email as for contact,
    /// password at least 8 characters and matching its confirmation.
    /// Email uniqueness is checked against the directory separately.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_required_text(&mut errors, "name", &self.name, MAX_NAME_LEN);
        check_required_email(&mut errors, &self.email);
        if self.password.is_empty() {
            errors.add("password", required("password"));
        } else {
            if self.password.chars().count() < MIN_PASSWORD_LEN {
                errors.add("password", too_short("password", MIN_PASSWORD_LEN));
            }
            if self.password != self.password_confirmation {
                errors.add("password", confirmation_mismatch("password"));
            }
        }
        errors.into_result()
    }

    /// Input to repopulate the form with. Passwords are never echoed.
    pub fn old_input(&self) -> HashMap<String, String> {
        HashMap::from([
            ("name".to_string(), self.name.trim().to_string()),
            ("email".to_string(), self.email.trim().to_string()),
        ])
    }
}

/// Required text field capped at `max` characters.
///
/// A missing value reports only the "required" failure; further rules
/// run only against present values.
fn check_required_text(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, required(field));
        return;
    }
    if value.chars().count() > max {
        errors.add(field, too_long(field, max));
    }
}

/// Required email field: syntax check first, then the length cap.
fn check_required_email(errors: &mut ValidationErrors, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.add("email", required("email"));
        return;
    }
    if EmailAddress::parse_with_options(value, email_address::Options::default()).is_err() {
        errors.add("email", invalid_email());
    }
    if value.chars().count() > MAX_EMAIL_LEN {
        errors.add("email", too_long("email", MAX_EMAIL_LEN));
    }
}

fn required(field: &str) -> String {
    format!("The {field} field is required.")
}

fn too_long(field: &str, max: usize) -> String {
    format!("The {field} field must not be greater than {max} characters.")
}

fn too_short(field: &str, min: usize) -> String {
    format!("The {field} field must be at least {min} characters.")
}

fn confirmation_mismatch(field: &str) -> String {
    format!("The {field} field confirmation does not match.")
}

fn invalid_email() -> String {
    "The email field must be a valid email address.".to_string()
}
