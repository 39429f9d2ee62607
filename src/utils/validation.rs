use crate::error::{AuthError, AuthResult};
use regex::Regex;
use std::sync::OnceLock;

pub const PASSCODE_LENGTH: usize = 6;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@.]+(?:\.[^\s@.]+)+$";
/// Optional leading `+`, then 7 to 15 digits with spaces, dashes or brackets between them.
const PHONE_PATTERN: &str = r"^\+?(?:[ ()\-]*[0-9]){7,15}[ ()\-]*$";

/// What kind of login identifier the user typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Email,
    Phone,
}

impl IdentifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierKind::Email => "email",
            IdentifierKind::Phone => "phone",
        }
    }
}

/// Compiled patterns for emails and phone numbers.
#[derive(Debug)]
pub struct IdentifierValidator {
    email_regex: Regex,
    phone_regex: Regex,
}

impl IdentifierValidator {
    pub fn new() -> AuthResult<Self> {
        let email_regex = Regex::new(EMAIL_PATTERN)
            .map_err(|e| AuthError::Configuration(format!("Failed to compile email regex: {}", e)))?;
        let phone_regex = Regex::new(PHONE_PATTERN)
            .map_err(|e| AuthError::Configuration(format!("Failed to compile phone regex: {}", e)))?;

        Ok(Self {
            email_regex,
            phone_regex,
        })
    }

    /// Process-wide instance, compiled on first use.
    pub fn shared() -> AuthResult<&'static IdentifierValidator> {
        static VALIDATOR: OnceLock<Result<IdentifierValidator, String>> = OnceLock::new();

        VALIDATOR
            .get_or_init(|| IdentifierValidator::new().map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| AuthError::Configuration(e.clone()))
    }

    pub fn is_email(&self, value: &str) -> bool {
        self.email_regex.is_match(value)
    }

    pub fn is_phone(&self, value: &str) -> bool {
        self.phone_regex.is_match(value)
    }

    pub fn classify(&self, identifier: &str) -> Option<IdentifierKind> {
        if self.is_email(identifier) {
            Some(IdentifierKind::Email)
        } else if self.is_phone(identifier) {
            Some(IdentifierKind::Phone)
        } else {
            None
        }
    }
}

/// A login identifier must be an email address or a phone number.
pub fn validate_login_identifier(identifier: &str) -> AuthResult<IdentifierKind> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(AuthError::validation("Email or phone number is required."));
    }

    IdentifierValidator::shared()?
        .classify(identifier)
        .ok_or_else(|| AuthError::validation("Enter a valid email address or phone number."))
}

pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.is_empty() {
        return Err(AuthError::validation("Password is required."));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> AuthResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::validation("Email is required."));
    }
    if !IdentifierValidator::shared()?.is_email(email) {
        return Err(AuthError::validation("Enter a valid email address."));
    }
    Ok(())
}

/// Passcodes are exactly six ASCII digits.
pub fn validate_passcode(passcode: &str) -> AuthResult<()> {
    if passcode.len() != PASSCODE_LENGTH || !passcode.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AuthError::validation(format!(
            "Passcode must be a {}-digit code.",
            PASSCODE_LENGTH
        )));
    }
    Ok(())
}
