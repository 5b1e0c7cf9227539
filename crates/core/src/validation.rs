//! Input validation utilities.
//!
//! Checks that cannot be expressed by the text newtypes in `vax-types`.

use crate::constants::MIN_PASSWORD_LEN;
use crate::{VaxError, VaxResult};

/// Upper bound for a recommended month (18 years).
pub const MAX_RECOMMENDED_MONTH: i32 = 18 * 12;

/// Validates the recommended month of a new catalog entry.
///
/// `None` is always accepted. A present value must lie in `0..=MAX_RECOMMENDED_MONTH`.
///
/// # Errors
///
/// Returns `VaxError::InvalidInput` for values outside the range.
pub fn validate_recommended_month(month: Option<i32>) -> VaxResult<()> {
    match month {
        Some(m) if !(0..=MAX_RECOMMENDED_MONTH).contains(&m) => Err(VaxError::InvalidInput(
            format!("recommended_month must be between 0 and {MAX_RECOMMENDED_MONTH}, got {m}"),
        )),
        _ => Ok(()),
    }
}

/// Validates a password chosen at registration.
///
/// # Errors
///
/// Returns `VaxError::InvalidInput` if the password is shorter than
/// [`MIN_PASSWORD_LEN`] characters or is whitespace only.
pub fn validate_password(password: &str) -> VaxResult<()> {
    if password.trim().is_empty() {
        return Err(VaxError::InvalidInput("password cannot be blank".into()));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(VaxError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommended_month_bounds() {
        assert!(validate_recommended_month(None).is_ok());
        assert!(validate_recommended_month(Some(0)).is_ok());
        assert!(validate_recommended_month(Some(MAX_RECOMMENDED_MONTH)).is_ok());
        assert!(matches!(
            validate_recommended_month(Some(-1)),
            Err(VaxError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_recommended_month(Some(MAX_RECOMMENDED_MONTH + 1)),
            Err(VaxError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("long enough").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("          ").is_err());
    }
}
