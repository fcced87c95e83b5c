//! URL normalization and validation.
//!
//! Normalization happens exactly once, before validation and before the URL is
//! hashed or stored, so `example.com` and `https://example.com` deduplicate to
//! the same entry.

use url::Url;

const HTTP_SCHEME: &str = "http://";
const HTTPS_SCHEME: &str = "https://";

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,
}

/// Applies the default scheme when the input has no explicit `http://` or
/// `https://` prefix.
///
/// The rest of the string is left untouched: the stored URL is the user's
/// input with at most a scheme prepended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(apply_default_scheme("example.com"), "https://example.com");
/// assert_eq!(apply_default_scheme("http://example.com"), "http://example.com");
/// ```
pub fn apply_default_scheme(input: &str) -> String {
    if has_http_scheme(input) {
        input.to_string()
    } else {
        format!("{HTTPS_SCHEME}{input}")
    }
}

/// Normalizes and validates a user-supplied URL.
///
/// # Rules
///
/// 1. Surrounding whitespace is trimmed; an empty result is rejected
/// 2. An explicit `scheme://` prefix other than HTTP(S) is rejected
/// 3. `https://` is prepended unless an `http://`/`https://` prefix is present
/// 4. The result must parse as a URL with an HTTP(S) scheme and a host
///
/// # Errors
///
/// Returns [`UrlNormalizationError`] describing the first rule violated.
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    if explicit_scheme(trimmed).is_some() && !has_http_scheme(trimmed) {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    }

    let normalized = apply_default_scheme(trimmed);

    let parsed =
        Url::parse(&normalized).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(normalized),
        _ => Err(UrlNormalizationError::MissingHost),
    }
}

/// Returns the scheme of an input written as `scheme://...`, if any.
fn explicit_scheme(input: &str) -> Option<&str> {
    let (scheme, _) = input.split_once("://")?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

fn has_http_scheme(input: &str) -> bool {
    [HTTP_SCHEME, HTTPS_SCHEME].iter().any(|scheme| {
        input
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
