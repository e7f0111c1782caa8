use lettre::Address;

use crate::core::FieldError;

/// Address the SMTP layer will accept, with a dotted domain
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.len() > 254 {
        return false;
    }
    match email.parse::<Address>() {
        Ok(address) => {
            let domain = address.domain();
            domain.contains('.')
                && !domain.contains("..")
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        Err(_) => false,
    }
}

/// Required trimmed text with a maximum length
pub fn require_text(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &str,
    max_len: usize,
) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new(field, format!("{} is required", field)));
    } else if trimmed.len() > max_len {
        errors.push(FieldError::new(
            field,
            format!("{} cannot exceed {} characters", field, max_len),
        ));
    }
}

/// Optional text with a maximum length
pub fn limit_text(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
    max_len: usize,
) {
    if let Some(value) = value {
        if value.trim().len() > max_len {
            errors.push(FieldError::new(
                field,
                format!("{} cannot exceed {} characters", field, max_len),
            ));
        }
    }
}

/// Trim an optional string, mapping blanks to None
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
