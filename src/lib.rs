//! API Contract Validator
//!
//! Checks that a running HTTP API answers the way its OpenAPI contract says it
//! does. For every documented GET operation a live request is issued; the
//! status is compared with `200` and the JSON body is compared structurally
//! with the declared response schema. Discrepancies are collected as
//! [`ValidationIssue`]s in one [`ValidationResult`].
//!
//! # Example
//!
//! ```
//! use api_contract_validator::{
//!     validate_response_body, SchemaNode, Severity, ValidationContext,
//! };
//! use serde_json::json;
//!
//! let schema = SchemaNode::from_openapi(
//!     &json!({
//!         "type": "object",
//!         "required": ["id", "name"],
//!         "properties": {
//!             "id": { "type": "integer" },
//!             "name": { "type": "string" }
//!         }
//!     }),
//!     &json!({}),
//! )
//! .unwrap();
//!
//! let context = ValidationContext::root("/users/{id}", "GET");
//! let issues = validate_response_body(r#"{"id": "1", "name": "Ann"}"#, &schema, &context);
//!
//! assert_eq!(issues.len(), 1);
//! assert_eq!(issues[0].severity, Severity::Error);
//! assert_eq!(issues[0].expected.as_deref(), Some("Expected type: integer"));
//! ```
//!
//! # Issue Severities
//!
//! | Finding | Severity |
//! |---------|----------|
//! | Endpoint unreachable | ERROR |
//! | Status other than 200 | ERROR |
//! | Empty or malformed body | ERROR |
//! | Type mismatch, missing required field, unexpected null | ERROR |
//! | Undeclared field in response | WARNING |
//!
//! Only ERRORs make [`ValidationResult::has_errors`] true.

mod config;
mod error;
mod loader;
mod orchestrator;
mod report;
mod schema;
mod transport;
mod types;
mod validator;

pub use config::{validate_base_url, validate_spec_source};
pub use error::{ConfigError, ContractError, ReportError, TransportError};
pub use loader::{
    is_url, load_contract, load_contract_auto, load_contract_str, load_contract_url,
    navigate_fragment, parse_document, Contract, DocumentFormat, Operation, PathItem,
};
pub use orchestrator::{validate_contract, validate_endpoint};
pub use report::{render_html, render_json, render_text, write_report, ReportFormat};
pub use schema::{ObjectSchema, PrimitiveKind, SchemaNode};
pub use transport::{
    build_full_url, HttpConfig, HttpResponse, HttpTransport, Transport, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_READ_TIMEOUT,
};
pub use types::{
    json_type_name, Severity, ValidationContext, ValidationIssue, ValidationResult,
    CONTENT_TYPE_JSON, HTTP_METHOD_GET, JSON_PATH_ROOT, STATUS_OK,
};
pub use validator::{validate_response_body, validate_value};
