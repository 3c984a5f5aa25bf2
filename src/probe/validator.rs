//! Response content check

use crate::error::{AppError, Result};

/// Whether `needle` occurs anywhere in `haystack`; an empty needle always does
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Fail with `CheckFailed` unless the response contains `check`
pub fn validate(response: &[u8], check: &str) -> Result<()> {
    if contains(response, check.as_bytes()) {
        Ok(())
    } else {
        Err(AppError::check_failed(format!("'{}' not found in response", check)))
    }
}
