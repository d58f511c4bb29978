use crate::errors::AppError;

/// Check a submitted key against the configured secret.
/// A missing or empty key never matches.
pub fn check_key(provided: Option<&str>, expected: &str) -> Result<(), AppError> {
    match provided {
        Some(key) if !key.is_empty() && constant_time_eq(key, expected) => Ok(()),
        _ => {
            log::warn!("Rejected request with invalid or missing key");
            Err(AppError::Unauthorized)
        }
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
