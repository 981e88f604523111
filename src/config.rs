//! Operator input checks, run before any endpoint is attempted.

use std::path::Path;

use tracing::debug;
use url::Url;

use crate::error::ConfigError;
use crate::loader::is_url;

/// Validate and normalize the base URL of the API under test.
///
/// Surrounding whitespace and trailing slashes are removed.
///
/// # Errors
///
/// Returns `ConfigError::InvalidBaseUrl` if the URL is empty, not http(s),
/// or has no host.
pub fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        message: message.to_string(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("cannot be empty"));
    }
    if !is_url(trimmed) {
        return Err(invalid("must start with http:// or https://"));
    }

    let normalized = trimmed.trim_end_matches('/');
    let parsed = Url::parse(normalized).map_err(|e| invalid(&e.to_string()))?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }

    debug!(base_url = normalized, "base URL validated");
    Ok(normalized.to_string())
}

/// Check the contract source: a URL, or an existing regular file.
///
/// A missing file is left to the loader, which reports it as not found.
pub fn validate_spec_source(raw: &str) -> Result<(), ConfigError> {
    let source = raw.trim();
    if source.is_empty() {
        return Err(ConfigError::EmptySpec);
    }
    if is_url(source) {
        return Ok(());
    }

    let path = Path::new(source);
    if path.exists() && !path.is_file() {
        return Err(ConfigError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
