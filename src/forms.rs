//! Form payloads and the error bag the templates render.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

pub const REQUIRED: &str = "This field is required.";
pub const USERNAME_TAKEN: &str = "This username has been taken. Please try a different username!";
pub const PASSWORDS_MISMATCH: &str = "Your passwords must match. Please try again!";
pub const INVALID_CREDENTIALS: &str = "Invalid username or password. Please try again.";
pub const LOGIN_FAILED: &str = "Login failed. Please enter the correct username or password.";
pub const API_KEY_IN_USE: &str = "This API key is already linked to another account.";

const FORM_LEVEL: &str = "__all__";

fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(REQUIRED.into()));
    }
    Ok(())
}

fn passwords_match(form: &RegisterForm) -> Result<(), ValidationError> {
    if form.password.is_empty() || form.password_2.is_empty() || form.password == form.password_2 {
        return Ok(());
    }
    Err(ValidationError::new("password_mismatch").with_message(PASSWORDS_MISMATCH.into()))
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
#[validate(schema(function = "passwords_match", skip_on_field_errors = false))]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(
        custom(function = "required"),
        length(max = 50, message = "Ensure this value has at most 50 characters.")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "required"))]
    pub password: String,
    /// Confirmation
    #[serde(default)]
    #[validate(custom(function = "required"))]
    pub password_2: String,
}

impl RegisterForm {
    pub fn username(&self) -> &str {
        self.username.trim()
    }

    /// Echoed back into the re-rendered page; passwords are never echoed.
    pub fn redisplay(&self) -> RegisterForm {
        RegisterForm {
            username: self.username.clone(),
            ..Default::default()
        }
    }
}

/// Blank fields are not reported individually; any failure is the one
/// generic credentials error.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct ApiKeyForm {
    #[serde(default)]
    #[validate(custom(function = "required"))]
    pub api_key: String,
}

impl ApiKeyForm {
    pub fn key(&self) -> &str {
        self.api_key.trim()
    }
}

/// Field errors keyed by field name plus errors about the form as a whole.
#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct FormErrors {
    pub fields: BTreeMap<String, Vec<String>>,
    pub form: Vec<String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the outcome of `validate()`; `Ok` gives an empty bag.
    pub fn from_result(result: Result<(), ValidationErrors>) -> Self {
        match result {
            Ok(()) => Self::new(),
            Err(errors) => Self::from_validation(&errors),
        }
    }

    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut collected = Self::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                if field == FORM_LEVEL {
                    collected.add_form(message);
                } else {
                    collected.add_field(&field, message);
                }
            }
        }
        collected
    }

    pub fn add_field(&mut self, field: &str, message: impl Into<String>) {
        self.fields.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn add_form(&mut self, message: impl Into<String>) {
        self.form.push(message.into());
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.form.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, password: &str, password_2: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_string(),
            password: password.to_string(),
            password_2: password_2.to_string(),
        }
    }

    #[test]
    fn test_valid_register_form() {
        let errors = FormErrors::from_result(register("trader", "s3cret!", "s3cret!").validate());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_blank_fields_are_required() {
        let errors = FormErrors::from_result(register("  ", "", "").validate());
        assert_eq!(errors.fields["username"], vec![REQUIRED]);
        assert_eq!(errors.fields["password"], vec![REQUIRED]);
        assert_eq!(errors.fields["password_2"], vec![REQUIRED]);
        assert!(errors.form.is_empty());
    }

    #[test]
    fn test_blank_confirmation_is_a_field_error() {
        let errors = FormErrors::from_result(register("trader", "s3cret!", "").validate());
        assert_eq!(errors.fields["password_2"], vec![REQUIRED]);
        assert!(errors.form.is_empty());
    }

    #[test]
    fn test_mismatched_passwords_is_a_form_error() {
        let errors = FormErrors::from_result(register("trader", "s3cret!", "other").validate());
        assert!(errors.fields.is_empty());
        assert_eq!(errors.form, vec![PASSWORDS_MISMATCH]);
    }

    #[test]
    fn test_username_too_long() {
        let errors = FormErrors::from_result(register(&"x".repeat(51), "pw", "pw").validate());
        assert!(errors.has_field("username"));
    }

    #[test]
    fn test_redisplay_drops_passwords() {
        let shown = register("trader", "s3cret!", "s3cret!").redisplay();
        assert_eq!(shown.username, "trader");
        assert!(shown.password.is_empty());
        assert!(shown.password_2.is_empty());
    }

    #[test]
    fn test_api_key_form() {
        let blank = ApiKeyForm { api_key: " ".to_string() };
        assert!(FormErrors::from_result(blank.validate()).has_field("api_key"));

        let filled = ApiKeyForm { api_key: " abc123 ".to_string() };
        assert!(filled.validate().is_ok());
        assert_eq!(filled.key(), "abc123");
    }

    #[test]
    fn test_manual_errors() {
        let mut errors = FormErrors::new();
        assert!(errors.is_empty());
        errors.add_field("username", USERNAME_TAKEN);
        errors.add_form(INVALID_CREDENTIALS);
        assert_eq!(errors.fields["username"], vec![USERNAME_TAKEN]);
        assert_eq!(errors.form, vec![INVALID_CREDENTIALS]);
    }
}
