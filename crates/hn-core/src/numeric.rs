use crate::error::ValidationError;

/// Floating point type used throughout the network model
pub type Real = f64;

/// Parse a decimal or scientific-notation token.
///
/// Returns `None` for anything that is not a finite number, including the
/// `inf`/`nan` spellings that `f64::from_str` would otherwise accept.
pub fn parse_real(token: &str) -> Option<Real> {
    let first = token.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '+' | '-' | '.')) {
        return None;
    }
    token.parse::<Real>().ok().filter(|v| v.is_finite())
}

pub fn check_finite(element: &str, field: &'static str, value: Real) -> Result<Real, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(element, field, value, "must be finite"))
    }
}

pub fn check_positive(element: &str, field: &'static str, value: Real) -> Result<Real, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(element, field, value, "must be positive and finite"))
    }
}

pub fn check_non_negative(
    element: &str,
    field: &'static str,
    value: Real,
) -> Result<Real, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid(element, field, value, "must be non-negative and finite"))
    }
}

pub fn strictly_increasing(values: impl IntoIterator<Item = Real>) -> bool {
    let mut prev: Option<Real> = None;
    for v in values {
        if let Some(p) = prev {
            if v <= p {
                return false;
            }
        }
        prev = Some(v);
    }
    true
}

fn invalid(element: &str, field: &'static str, value: Real, reason: &'static str) -> ValidationError {
    ValidationError::InvalidValue {
        element: element.to_string(),
        field,
        value: value.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_real_accepts_decimal_and_scientific() {
        assert_eq!(parse_real("710"), Some(710.0));
        assert_eq!(parse_real("-3.5"), Some(-3.5));
        assert_eq!(parse_real(".25"), Some(0.25));
        assert_eq!(parse_real("1.5e3"), Some(1500.0));
        assert_eq!(parse_real("2E-2"), Some(0.02));
    }

    #[test]
    fn parse_real_rejects_malformed_and_non_finite() {
        assert_eq!(parse_real("12x"), None);
        assert_eq!(parse_real(""), None);
        assert_eq!(parse_real("inf"), None);
        assert_eq!(parse_real("NaN"), None);
        assert_eq!(parse_real("1e999"), None);
        assert_eq!(parse_real("1,5"), None);
    }

    #[test]
    fn range_checks_name_the_element() {
        let err = check_positive("P1", "length", 0.0).unwrap_err();
        assert_eq!(err.element(), "P1");
        assert!(err.to_string().contains("length"));
        assert!(check_non_negative("P1", "minor_loss", 0.0).is_ok());
        assert!(check_finite("J1", "demand", Real::NAN).is_err());
    }

    #[test]
    fn strictly_increasing_detects_ties() {
        assert!(strictly_increasing([1.0, 2.0, 3.0]));
        assert!(strictly_increasing([]));
        assert!(!strictly_increasing([1.0, 1.0]));
        assert!(!strictly_increasing([2.0, 1.0]));
    }
}
