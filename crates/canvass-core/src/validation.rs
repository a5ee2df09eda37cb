//! Boundary validation for service inputs.
//!
//! Every input struct accepted by a service implements [`Validate`];
//! services call it before touching a repository.

use crate::error::{CanvassError, CanvassResult};

pub trait Validate {
    fn validate(&self) -> CanvassResult<()>;
}

/// Trim and lowercase an email address.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Minimal structural check: one `@`, non-empty local part, a dot in the
/// domain, no whitespace, at most 254 characters.
pub fn require_email(field: &str, value: &str) -> CanvassResult<()> {
    let value = value.trim();
    let valid = value.len() <= 254
        && !value.chars().any(char::is_whitespace)
        && match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain
                        .split_once('.')
                        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            }
            None => false,
        };
    if valid {
        Ok(())
    } else {
        Err(CanvassError::validation(format!(
            "{field} must be a valid email address"
        )))
    }
}

pub fn require_non_empty(field: &str, value: &str) -> CanvassResult<()> {
    if value.trim().is_empty() {
        return Err(CanvassError::validation(format!("{field} is required")));
    }
    Ok(())
}

pub fn require_max_len(field: &str, value: &str, max: usize) -> CanvassResult<()> {
    if value.chars().count() > max {
        return Err(CanvassError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub fn require_min_len(field: &str, value: &str, min: usize) -> CanvassResult<()> {
    if value.chars().count() < min {
        return Err(CanvassError::validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(require_email("email", "ana@example.org").is_ok());
        assert!(require_email("email", "  ana@example.org ").is_ok());
        assert!(require_email("email", "ana@localhost").is_err());
        assert!(require_email("email", "ana@@example.org").is_err());
        assert!(require_email("email", "@example.org").is_err());
        assert!(require_email("email", "ana example@org.com").is_err());
        assert!(require_email("email", "").is_err());
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(normalize_email("  Ana@Example.ORG "), "ana@example.org");
    }

    #[test]
    fn length_checks_count_chars() {
        assert!(require_max_len("name", "ñandú", 5).is_ok());
        assert!(require_min_len("password", "short", 8).is_err());
        assert!(require_non_empty("name", "   ").is_err());
    }
}
