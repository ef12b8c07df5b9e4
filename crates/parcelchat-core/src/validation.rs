use parcelchat_persist::Contact;
use parcelchat_types::{FieldError, PostMessageRequest};

use crate::error::{ChatError, Result};

/// Minimum number of digits a phone number must carry
pub const MIN_PHONE_DIGITS: usize = 9;

/// Contact fields as submitted; any of them may be missing
#[derive(Debug, Clone, Default)]
pub struct ContactInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactInput {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            email: Some(email.into()),
            phone: Some(phone.into()),
        }
    }

    /// Check every field and collect all failures, not just the first one.
    pub fn validate(&self) -> Result<Contact> {
        let mut errors = Vec::new();

        let first_name = required(&mut errors, "firstName", &self.first_name);
        let last_name = required(&mut errors, "lastName", &self.last_name);

        let email = required(&mut errors, "email", &self.email);
        if !email.is_empty() && !is_valid_email(&email) {
            errors.push(FieldError::new("email", "is not a valid email address"));
        }

        let phone = required(&mut errors, "phone", &self.phone);
        if !phone.is_empty() {
            if let Some(problem) = phone_problem(&phone) {
                errors.push(FieldError::new("phone", problem));
            }
        }

        if !errors.is_empty() {
            return Err(ChatError::Validation(errors));
        }

        Ok(Contact {
            first_name,
            last_name,
            email,
            phone,
        })
    }
}

impl From<&PostMessageRequest> for ContactInput {
    fn from(req: &PostMessageRequest) -> Self {
        Self {
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
            email: req.email.clone(),
            phone: req.phone.clone(),
        }
    }
}

fn required(errors: &mut Vec<FieldError>, field: &str, value: &Option<String>) -> String {
    let trimmed = value.as_deref().map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        errors.push(FieldError::new(field, "is required"));
    }
    trimmed.to_string()
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| !label.is_empty())
}

fn phone_problem(phone: &str) -> Option<String> {
    let allowed_separator = |c: char| matches!(c, ' ' | '+' | '-' | '(' | ')');
    if phone.chars().any(|c| !c.is_ascii_digit() && !allowed_separator(c)) {
        return Some("may only contain digits, spaces, '+', '-' and parentheses".to_string());
    }
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits < MIN_PHONE_DIGITS {
        return Some(format!("must contain at least {} digits", MIN_PHONE_DIGITS));
    }
    None
}

/// Trim and bound a message body
pub(crate) fn validate_text(field: &str, text: &str, max_len: usize) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ChatError::invalid(field, "must not be empty"));
    }
    if trimmed.chars().count() > max_len {
        return Err(ChatError::invalid(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }
    Ok(trimmed.to_string())
}
