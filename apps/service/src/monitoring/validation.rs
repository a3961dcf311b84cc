//! Boundary validation of check records.
//!
//! Runs once on create/update and again on every scheduler pass before a
//! record reaches the probe engine; a record failing here is skipped for the
//! tick without being modified.

use url::Url;

use crate::error::ValidationError;
use crate::helpers::RECORD_ID_LEN;
use crate::models::Check;

const PHONE_LEN: usize = 10;
const MIN_TIMEOUT_SECONDS: u64 = 1;
const MAX_TIMEOUT_SECONDS: u64 = 5;

/// Validate every field of a check against its expected type and range.
/// Protocol and method are closed enumerations by construction and need no
/// runtime check.
pub fn validate_check(check: &Check) -> Result<(), ValidationError> {
    // The raw values flow into file paths and the alert recipient, so the
    // untrimmed string is what must be well-formed.
    if check.id.len() != RECORD_ID_LEN || check.id.trim() != check.id {
        return Err(ValidationError::new(
            "id",
            format!("must be exactly {RECORD_ID_LEN} characters with no surrounding whitespace"),
        ));
    }

    if check.user_phone.len() != PHONE_LEN || check.user_phone.trim() != check.user_phone {
        return Err(ValidationError::new(
            "userPhone",
            format!("must be exactly {PHONE_LEN} characters with no surrounding whitespace"),
        ));
    }

    if check.url.trim().is_empty() {
        return Err(ValidationError::new("url", "must not be empty"));
    }
    if Url::parse(&check.target()).is_err() {
        return Err(ValidationError::new("url", format!("{} is not a valid target", check.url)));
    }

    if check.success_codes.is_empty() {
        return Err(ValidationError::new("successCodes", "must not be empty"));
    }

    if !(MIN_TIMEOUT_SECONDS..=MAX_TIMEOUT_SECONDS).contains(&check.timeout_seconds) {
        return Err(ValidationError::new(
            "timeoutSeconds",
            format!("must be between {MIN_TIMEOUT_SECONDS} and {MAX_TIMEOUT_SECONDS} seconds"),
        ));
    }

    Ok(())
}
