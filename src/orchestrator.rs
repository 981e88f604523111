//! Endpoint validation run.
//!
//! Walks the contract's GET operations in document order, one request at a
//! time, and folds every finding into a single [`ValidationResult`]. A failing
//! endpoint never stops the run.

use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::loader::{Contract, Operation};
use crate::transport::{build_full_url, Transport};
use crate::types::{
    Severity, ValidationContext, ValidationIssue, ValidationResult, HTTP_METHOD_GET,
};
use crate::validator::validate_response_body;

/// Status every checked operation is expected to return.
const EXPECTED_STATUS: u16 = 200;

/// Validate every GET operation of `contract` against the API at `base_url`.
///
/// The returned result is finished (`finished_at` stamped).
pub fn validate_contract(
    contract: &Contract,
    base_url: &str,
    transport: &dyn Transport,
) -> ValidationResult {
    let endpoints: Vec<(&str, &Operation)> = contract.get_endpoints().collect();
    let total = endpoints.len();
    let mut result = ValidationResult::new(base_url, total);

    info!(endpoints = total, base_url, "starting validation");

    for (index, (path, operation)) in endpoints.into_iter().enumerate() {
        info!(
            operation_id = operation.operation_id.as_deref().unwrap_or("-"),
            "validating endpoint {}/{}: {}",
            index + 1,
            total,
            path
        );
        let issues = validate_endpoint(base_url, path, operation, transport);
        result.extend_issues(issues);
    }

    result.finish();
    info!(
        duration_ms = result.duration_millis(),
        issues = result.total_issues(),
        errors = result.error_count(),
        "validation finished"
    );
    result
}

/// Check one GET endpoint: status first, then the body if a schema is declared.
pub fn validate_endpoint(
    base_url: &str,
    path: &str,
    operation: &Operation,
    transport: &dyn Transport,
) -> Vec<ValidationIssue> {
    let context = ValidationContext::root(path, HTTP_METHOD_GET);
    let url = build_full_url(base_url, path);
    debug!(url = %url, "sending GET request");

    let started = Instant::now();
    let response = match transport.get(&url) {
        Ok(response) => response,
        Err(e) => {
            error!(path, error = %e, "request to GET failed");
            return vec![context
                .issue(Severity::Error, "Endpoint unreachable or request failed")
                .expected("Successful response (200 OK)")
                .actual(format!("Connection error: {}", e))];
        }
    };
    debug!(
        path,
        status = response.status,
        duration_ms = started.elapsed().as_millis() as u64,
        "response received"
    );

    if response.status != EXPECTED_STATUS {
        return vec![context
            .issue(Severity::Error, "Unexpected HTTP status")
            .expected("200 OK")
            .actual(response.status.to_string())];
    }

    let Some(schema) = &operation.success_schema else {
        warn!(path, "no JSON schema declared for 200 response, skipping body");
        return Vec::new();
    };

    debug!(path, schema = schema.kind_name(), "validating response body");
    validate_response_body(&response.body, schema, &context)
}
