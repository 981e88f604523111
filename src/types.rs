//! Core types for contract validation: issues, results and the descent context.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// The only HTTP method whose operations are checked.
pub const HTTP_METHOD_GET: &str = "GET";

/// Media type under which the success schema is looked up.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Response key of the declared success status.
pub const STATUS_OK: &str = "200";

/// Root of every field path.
pub const JSON_PATH_ROOT: &str = "$";

/// Returns the JSON type name for issue messages.
///
/// Numbers are split into `integer` and `number` so that a fractional value
/// reported against an `integer` schema reads as a real mismatch.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Contract violation: the implementation diverges from the declared shape.
    Error,
    /// Benign drift: undocumented but non-breaking.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("ERROR"),
            Severity::Warning => f.write_str("WARNING"),
        }
    }
}

/// Location of the current validation step.
///
/// Immutable: descending into a field or array item builds a new context,
/// the parent is never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    /// Current JSON path, e.g. `$.users[0].name`.
    pub field_path: String,
    /// Endpoint path as declared in the contract, e.g. `/users/{id}`.
    pub endpoint_path: String,
    /// HTTP method being checked.
    pub http_method: String,
}

impl ValidationContext {
    /// Root context for one endpoint (`field_path` = `$`).
    pub fn root(endpoint_path: impl Into<String>, http_method: impl Into<String>) -> Self {
        Self {
            field_path: JSON_PATH_ROOT.to_string(),
            endpoint_path: endpoint_path.into(),
            http_method: http_method.into(),
        }
    }

    /// Context for an object member: `<path>.<name>`.
    pub fn field(&self, name: &str) -> Self {
        Self {
            field_path: self.field_path_of(name),
            ..self.clone()
        }
    }

    /// Context for an array element: `<path>[<index>]`.
    pub fn item(&self, index: usize) -> Self {
        Self {
            field_path: format!("{}[{}]", self.field_path, index),
            ..self.clone()
        }
    }

    /// Path a member named `name` would have, without building a context.
    pub fn field_path_of(&self, name: &str) -> String {
        format!("{}.{}", self.field_path, name)
    }

    /// Start an issue located at this context's endpoint and method.
    pub fn issue(&self, severity: Severity, description: impl Into<String>) -> ValidationIssue {
        ValidationIssue::new(
            self.http_method.clone(),
            self.endpoint_path.clone(),
            severity,
            description,
        )
    }
}

/// One recorded discrepancy between observed and declared behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// HTTP method (GET, ...).
    pub method: String,
    /// Endpoint path, e.g. `/api/users/{id}`.
    pub path: String,
    pub severity: Severity,
    /// Human-readable description.
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    /// JSON path of the offending value, for structural issues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            severity,
            description: description.into(),
            expected: None,
            actual: None,
            field: None,
        }
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    pub fn at_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity, self.method, self.path, self.description
        )?;
        if let (Some(expected), Some(actual)) = (&self.expected, &self.actual) {
            write!(f, " (expected: '{}', actual: '{}')", expected, actual)?;
        }
        Ok(())
    }
}

/// Accumulated outcome of one validation run.
///
/// Mutated only through [`add_issue`](Self::add_issue) and a single
/// [`finish`](Self::finish); renderers read it afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    base_url: String,
    total_endpoints: usize,
    total_issues: usize,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Start a run; `started_at` is stamped now.
    pub fn new(base_url: impl Into<String>, total_endpoints: usize) -> Self {
        Self {
            base_url: base_url.into(),
            total_endpoints,
            total_issues: 0,
            started_at: Utc::now(),
            finished_at: None,
            issues: Vec::new(),
        }
    }

    pub fn add_issue(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
        self.total_issues += 1;
    }

    pub fn extend_issues(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        for issue in issues {
            self.add_issue(issue);
        }
    }

    /// Stamp `finished_at`. Later calls keep the first timestamp.
    pub fn finish(&mut self) {
        if self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
    }

    /// True iff at least one issue has severity ERROR.
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn total_endpoints(&self) -> usize {
        self.total_endpoints
    }

    pub fn total_issues(&self) -> usize {
        self.total_issues
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.total_issues - self.error_count()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Wall-clock duration in milliseconds; 0 until finished.
    pub fn duration_millis(&self) -> i64 {
        match self.finished_at {
            Some(end) => (end - self.started_at).num_milliseconds(),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(true)), "boolean");
        assert_eq!(json_type_name(&json!(1)), "integer");
        assert_eq!(json_type_name(&json!(-7)), "integer");
        assert_eq!(json_type_name(&json!(1.5)), "number");
        assert_eq!(json_type_name(&json!("x")), "string");
        assert_eq!(json_type_name(&json!([])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
    }

    #[test]
    fn context_descent_does_not_touch_parent() {
        let root = ValidationContext::root("/users", "GET");
        let item = root.item(0);
        let name = item.field("name");

        assert_eq!(root.field_path, "$");
        assert_eq!(item.field_path, "$[0]");
        assert_eq!(name.field_path, "$[0].name");
        assert_eq!(name.endpoint_path, "/users");
        assert_eq!(name.http_method, "GET");
    }

    #[test]
    fn issue_display_with_expected_and_actual() {
        let issue = ValidationIssue::new("GET", "/users", Severity::Error, "Type mismatch at $.id")
            .expected("Expected type: integer")
            .actual("Actual type: string");
        assert_eq!(
            issue.to_string(),
            "[ERROR] GET /users: Type mismatch at $.id (expected: 'Expected type: integer', actual: 'Actual type: string')"
        );
    }

    #[test]
    fn issue_display_omits_partial_expectation() {
        let issue =
            ValidationIssue::new("GET", "/users", Severity::Warning, "Unexpected field").expected("x");
        assert_eq!(issue.to_string(), "[WARNING] GET /users: Unexpected field");
    }

    #[test]
    fn result_counter_tracks_issues() {
        let mut result = ValidationResult::new("http://localhost", 2);
        assert_eq!(result.total_issues(), 0);
        assert!(!result.has_errors());

        result.add_issue(ValidationIssue::new("GET", "/a", Severity::Warning, "w"));
        assert_eq!(result.total_issues(), result.issues().len());
        assert!(!result.has_errors());

        result.extend_issues(vec![
            ValidationIssue::new("GET", "/a", Severity::Error, "e1"),
            ValidationIssue::new("GET", "/b", Severity::Error, "e2"),
        ]);
        assert_eq!(result.total_issues(), 3);
        assert_eq!(result.total_issues(), result.issues().len());
        assert_eq!(result.error_count(), 2);
        assert_eq!(result.warning_count(), 1);
        assert!(result.has_errors());
    }

    #[test]
    fn result_finish_stamps_once() {
        let mut result = ValidationResult::new("http://localhost", 0);
        assert!(result.finished_at().is_none());
        assert_eq!(result.duration_millis(), 0);

        result.finish();
        let first = result.finished_at();
        assert!(first.is_some());
        result.finish();
        assert_eq!(result.finished_at(), first);
        assert!(result.duration_millis() >= 0);
    }

    #[test]
    fn severity_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Severity::Error).unwrap(), json!("ERROR"));
        assert_eq!(serde_json::to_value(Severity::Warning).unwrap(), json!("WARNING"));
    }
}
