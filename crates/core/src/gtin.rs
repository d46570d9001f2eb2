//! GTIN format and check-digit validation.
//!
//! Accepts 8 to 14 digit codes and verifies the GS1 modulo-10 check digit.
//! Weights alternate 3,1,3,... starting from the digit immediately left of
//! the check digit, which is the same as left-padding to GTIN-14, so the
//! algorithm is identical for every length family.

use serde::Serialize;

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Shortest accepted code (GTIN-8 / EAN-8).
pub const MIN_GTIN_LEN: usize = 8;

/// Longest accepted code (GTIN-14).
pub const MAX_GTIN_LEN: usize = 14;

/* --------------------------------------------------------------------------
Types
-------------------------------------------------------------------------- */

/// Outcome of [`validate`]. `error` is set only when `valid` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GtinValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GtinValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }
}

/// The standard GS1 length families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GtinFormat {
    Gtin8,
    Gtin12,
    Gtin13,
    Gtin14,
}

impl GtinFormat {
    /// Map a digit count to its family. Lengths 9-11 have no GS1 name.
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            8 => Some(GtinFormat::Gtin8),
            12 => Some(GtinFormat::Gtin12),
            13 => Some(GtinFormat::Gtin13),
            14 => Some(GtinFormat::Gtin14),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GtinFormat::Gtin8 => "GTIN-8",
            GtinFormat::Gtin12 => "GTIN-12",
            GtinFormat::Gtin13 => "GTIN-13",
            GtinFormat::Gtin14 => "GTIN-14",
        }
    }
}

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Cheap pre-check: 8-14 ASCII digits after trimming. Does not compute the
/// check digit.
pub fn is_likely_format(code: &str) -> bool {
    let code = code.trim();
    (MIN_GTIN_LEN..=MAX_GTIN_LEN).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit())
}

/// Compute the GS1 check digit for `body` (the code without its last digit).
///
/// Returns `None` if `body` is empty or contains anything but ASCII digits.
pub fn compute_check_digit(body: &str) -> Option<u8> {
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let sum: u32 = body
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit * 3
            } else {
                digit
            }
        })
        .sum();

    Some(((10 - sum % 10) % 10) as u8)
}

/// Full validation: charset, length, all-zero rejection, check digit.
pub fn validate(code: &str) -> GtinValidation {
    let code = code.trim();

    if code.is_empty() {
        return GtinValidation::fail("GTIN must not be empty");
    }

    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return GtinValidation::fail(format!("GTIN '{code}' must contain only digits"));
    }

    let len = code.len();
    if !(MIN_GTIN_LEN..=MAX_GTIN_LEN).contains(&len) {
        return GtinValidation::fail(format!(
            "GTIN must be between {MIN_GTIN_LEN} and {MAX_GTIN_LEN} digits, got {len}"
        ));
    }

    if code.bytes().all(|b| b == b'0') {
        return GtinValidation::fail("GTIN must not be all zeros");
    }

    let (body, check) = code.split_at(len - 1);
    let actual = check.as_bytes()[0] - b'0';
    // Non-empty and all digits, checked above.
    let expected = compute_check_digit(body).unwrap_or(u8::MAX);

    if actual != expected {
        let family = GtinFormat::from_len(len)
            .map(|f| f.label().to_string())
            .unwrap_or_else(|| format!("{len}-digit code"));
        return GtinValidation::fail(format!(
            "Invalid check digit for {family} '{code}': expected {expected}, got {actual}"
        ));
    }

    GtinValidation::ok()
}

/// [`validate`] as a `Result`, for use as a gate inside workflow operations.
pub fn validate_gtin(code: &str) -> Result<(), CoreError> {
    match validate(code) {
        GtinValidation { valid: true, .. } => Ok(()),
        GtinValidation { error, .. } => Err(CoreError::Validation(
            error.unwrap_or_else(|| "Invalid GTIN".to_string()),
        )),
    }
}

/// Left-pad a digit string to the 14-digit GTIN form.
///
/// `036000291452` (UPC-A) and `0036000291452` (EAN-13) both become
/// `00036000291452`. Returns `None` when the input is not a plausible code.
pub fn normalize_gtin14(code: &str) -> Option<String> {
    let code = code.trim();
    if !is_likely_format(code) {
        return None;
    }
    Some(format!("{code:0>14}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn known_good_ean13_is_valid() {
        assert_eq!(validate("4006381333931"), GtinValidation::ok());
    }

    #[test]
    fn each_length_family_validates() {
        assert!(validate("96385074").valid, "EAN-8");
        assert!(validate("036000291452").valid, "UPC-A");
        assert!(validate("10012345000017").valid, "GTIN-14");
    }

    #[test]
    fn all_zero_code_is_invalid() {
        let result = validate("0000000000000");
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("all zeros"));
    }

    #[test]
    fn wrong_check_digit_is_invalid() {
        let result = validate("4006381333932");
        assert!(!result.valid);
        let error = result.error.unwrap();
        assert!(error.contains("GTIN-13"), "{error}");
        assert!(error.contains("expected 1, got 2"), "{error}");
    }

    #[test]
    fn every_wrong_check_digit_is_rejected() {
        for digit in 0..=9u8 {
            let code = format!("400638133393{digit}");
            assert_eq!(validate(&code).valid, digit == 1, "{code}");
        }
    }

    #[test]
    fn length_outside_range_is_invalid() {
        assert!(!validate("1234567").valid);
        assert!(!validate("123456789012345").valid);
        assert!(validate("1234567").error.unwrap().contains("between 8 and 14"));
    }

    #[test]
    fn non_digits_are_invalid() {
        assert!(!validate("40063813339A1").valid);
        assert!(!validate("4006-381333931").valid);
    }

    #[test]
    fn empty_and_blank_are_invalid() {
        assert!(!validate("").valid);
        assert!(!validate("   ").valid);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert!(validate(" 4006381333931\n").valid);
    }

    #[test]
    fn nine_digit_code_uses_same_algorithm() {
        let body = "12345678";
        let check = compute_check_digit(body).unwrap();
        assert!(validate(&format!("{body}{check}")).valid);
    }

    #[test]
    fn likely_format_skips_checksum() {
        assert!(is_likely_format("4006381333932"));
        assert!(!is_likely_format("12345"));
        assert!(!is_likely_format("abcdefghij"));
    }

    #[test]
    fn check_digit_rejects_non_digits() {
        assert_eq!(compute_check_digit(""), None);
        assert_eq!(compute_check_digit("12a"), None);
        assert_eq!(compute_check_digit("400638133393"), Some(1));
    }

    #[test]
    fn normalize_pads_to_fourteen() {
        assert_eq!(
            normalize_gtin14("036000291452").as_deref(),
            Some("00036000291452")
        );
        assert_eq!(
            normalize_gtin14("0036000291452"),
            normalize_gtin14("036000291452")
        );
        assert_eq!(normalize_gtin14("xyz"), None);
    }

    #[test]
    fn validate_gtin_maps_to_validation_error() {
        assert!(validate_gtin("4006381333931").is_ok());
        assert_matches!(validate_gtin("0000000000000"), Err(CoreError::Validation(_)));
    }
}
