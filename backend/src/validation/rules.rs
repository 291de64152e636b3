//! Common validation rules shared across request payloads.

use validator::ValidationError;

/// A required field must be present and non-empty after trimming.
pub fn validate_required_trimmed(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("missing_fields"));
    }
    Ok(())
}

/// Contact email: required, then checked for a plausible mailbox shape.
pub fn validate_contact_email(email: &str) -> Result<(), ValidationError> {
    validate_required_trimmed(email)?;
    if !is_valid_email_shape(email) {
        return Err(ValidationError::new("bad_email"));
    }
    Ok(())
}

/// Mirrors the lenient `^[^\s@]+@[^\s@]+\.[^\s@]+$` check used by the
/// frontend: no whitespace, exactly one `@`, and a dot somewhere inside the
/// domain with at least one character on each side.
pub fn is_valid_email_shape(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let chars: Vec<char> = domain.chars().collect();
    chars.len() >= 3 && chars[1..chars.len() - 1].contains(&'.')
}
