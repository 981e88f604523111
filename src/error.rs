//! Error types for contract loading, configuration, transport and reporting.
//!
//! Contract findings (status mismatches, structural mismatches) are never
//! errors: they are recorded as [`ValidationIssue`](crate::ValidationIssue)s.
//! The enums here cover everything that stops a run before or after it.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading the contract document.
#[derive(Debug, Error)]
pub enum ContractError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    // Contract errors (exit code 2)
    #[error("invalid contract: {message}")]
    InvalidContract { message: String },

    #[error("unresolved reference \"{reference}\" at {path}")]
    UnresolvedRef { reference: String, path: String },
}

impl ContractError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ContractError::FileNotFound { .. }
            | ContractError::ReadError { .. }
            | ContractError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Operator input rejected before any endpoint is attempted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("contract source cannot be empty")]
    EmptySpec,

    #[error("contract path is not a file: {path}")]
    NotAFile { path: PathBuf },

    #[error("invalid base URL \"{url}\": {message}")]
    InvalidBaseUrl { url: String, message: String },
}

impl ConfigError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Failure of a single HTTP exchange.
///
/// Recovered by the orchestrator as one issue per endpoint; never aborts a run.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    #[error("{source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body: {source}")]
    Body {
        #[source]
        source: reqwest::Error,
    },
}

/// Errors while writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render HTML report: {source}")]
    Template {
        #[source]
        source: tera::Error,
    },
}

impl ReportError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReportError::WriteError { .. } => 3,
            ReportError::Serialize { .. } | ReportError::Template { .. } => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_error_exit_codes() {
        let err = ContractError::FileNotFound {
            path: PathBuf::from("openapi.yaml"),
        };
        assert_eq!(err.exit_code(), 3);

        let err = ContractError::InvalidContract {
            message: "missing paths".into(),
        };
        assert_eq!(err.exit_code(), 2);

        let err = ContractError::UnresolvedRef {
            reference: "#/components/schemas/User".into(),
            path: "/paths/~1users".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidBaseUrl {
            url: "ftp://example.com".into(),
            message: "must start with http:// or https://".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid base URL \"ftp://example.com\": must start with http:// or https://"
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn report_error_exit_codes() {
        let err = ReportError::Template {
            source: tera::Error::msg("unexpected end of template"),
        };
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().starts_with("failed to render HTML report"));

        let err = ReportError::WriteError {
            path: PathBuf::from("report.html"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn unresolved_ref_display() {
        let err = ContractError::UnresolvedRef {
            reference: "#/components/schemas/Missing".into(),
            path: "/paths/~1users/get".into(),
        };
        assert_eq!(
            err.to_string(),
            "unresolved reference \"#/components/schemas/Missing\" at /paths/~1users/get"
        );
    }
}
