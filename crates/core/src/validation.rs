//! Input validation helpers shared by the API handlers.
//!
//! Each helper returns `Err(String)` with a human-readable message; callers
//! wrap it in [`CoreError::Validation`](crate::error::CoreError::Validation).

use validator::{ValidateEmail, ValidationErrors};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Require a non-blank string field.
pub fn validate_required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(format!("'{email}' is not a valid email address"))
    }
}

pub fn validate_password_length(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }
    Ok(())
}

/// Prices are minor units and may be zero (free course) but never negative.
pub fn validate_price(price: i64) -> Result<(), String> {
    if price < 0 {
        return Err(format!("price must not be negative (got {price})"));
    }
    Ok(())
}

/// Flatten `validator` errors into one `field: message` line per failure.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{field} is invalid ({})", e.code),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}
