//! Field validators.
//!
//! These run before a request is issued so that malformed input never
//! reaches the network. Model constructors reuse them for values decoded
//! from remote responses.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::ValidationError;

/// Accepted shape of a tracked query-string parameter.
#[allow(clippy::expect_used)]
static QUERY_PARAMETER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9:]+$").expect("static pattern compiles"));

/// Validates a query-parameter token: non-empty, ASCII letters, digits and colons.
pub fn validate_query_parameter_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::invalid_format(
            "query_parameter",
            "query parameter cannot be empty",
        ));
    }
    if !QUERY_PARAMETER_TOKEN.is_match(token) {
        return Err(ValidationError::invalid_format(
            "query_parameter",
            format!("'{token}' may only contain letters, numbers, and colon (:)"),
        ));
    }
    Ok(())
}

/// Validates a page index and returns it unsigned.
///
/// There is no upper bound: the remote service answers a page past the end
/// with an empty record list.
pub fn validate_page(page: i64) -> Result<u64, ValidationError> {
    u64::try_from(page).map_err(|_| {
        ValidationError::invalid_range("page", format!("page must be >= 0, got {page}"))
    })
}

/// Validates that a URL is absolute http/https.
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::invalid_format(
            "url",
            format!("'{url}' must start with http:// or https://"),
        ))
    }
}

/// Like [`validate_url`], reporting the given field name.
pub(crate) fn validate_url_field(field: &str, url: &str) -> Result<(), ValidationError> {
    validate_url(url).map_err(|mut err| {
        err.field = field.to_string();
        err
    })
}
