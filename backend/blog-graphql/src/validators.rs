//! Input validation for user-submitted fields
//!
//! Submissions derive [`Validate`]; the `validate_*_input` functions run every
//! rule and report each violated field once, in field order.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{ApiError, FieldError};

const MAX_EMAIL_LENGTH: usize = 254;

pub const INVALID_EMAIL: &str = "E-Mail is invalid.";
pub const PASSWORD_TOO_SHORT: &str = "Password too short!";
pub const INVALID_TITLE: &str = "Title is invalid.";
pub const INVALID_CONTENT: &str = "Content is invalid.";

// Hardcoded pattern, always valid
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,}$")
        .expect("hardcoded email regex is invalid - fix source code")
});

/// Fields of a registration attempt
#[derive(Debug, Clone, Validate)]
pub struct UserInput {
    #[validate(email, custom(function = "crate::validators::email_grammar"))]
    pub email: String,

    #[validate(
        length(min = 5),
        custom(function = "crate::validators::not_blank")
    )]
    pub password: String,
}

/// Fields of a new post
#[derive(Debug, Clone, Validate)]
pub struct PostInput {
    #[validate(
        length(min = 5),
        custom(function = "crate::validators::not_blank")
    )]
    pub title: String,

    #[validate(
        length(min = 5),
        custom(function = "crate::validators::not_blank")
    )]
    pub content: String,
}

const USER_FIELDS: [(&str, &str); 2] = [("email", INVALID_EMAIL), ("password", PASSWORD_TOO_SHORT)];
const POST_FIELDS: [(&str, &str); 2] = [("title", INVALID_TITLE), ("content", INVALID_CONTENT)];

/// Validate email format (RFC 5322 simplified)
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

/// validator crate compatible custom validator for the email grammar
pub fn email_grammar(email: &str) -> Result<(), ValidationError> {
    if validate_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new("email_grammar"))
    }
}

/// Rejects empty and whitespace-only values
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

pub fn validate_user_input(input: &UserInput) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|errors| into_api_error(&errors, &USER_FIELDS))
}

pub fn validate_post_input(input: &PostInput) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|errors| into_api_error(&errors, &POST_FIELDS))
}

/// One message per failed field, in declared field order
fn into_api_error(errors: &ValidationErrors, fields: &[(&str, &str)]) -> ApiError {
    let failed = errors.field_errors();
    ApiError::InvalidInput(
        fields
            .iter()
            .filter(|(field, _)| failed.contains_key(*field))
            .map(|(_, message)| FieldError::new(*message))
            .collect(),
    )
}
