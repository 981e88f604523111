//! Rendering of a finished [`ValidationResult`] as text, JSON or HTML.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use serde_json::json;
use tera::{Context, Tera};

use crate::error::ReportError;
use crate::types::ValidationResult;

const RULE: &str = "========================================";

/// Output format of a report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Html,
}

impl ReportFormat {
    /// Pick the format from the output file extension (text when unknown).
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("html") | Some("htm") => ReportFormat::Html,
            Some("json") => ReportFormat::Json,
            _ => ReportFormat::Text,
        }
    }
}

/// Plain-text report, one issue per line.
pub fn render_text(result: &ValidationResult) -> String {
    let mut out = String::new();
    let finished = result
        .finished_at()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "VALIDATION RESULTS");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Base URL:    {}", result.base_url());
    let _ = writeln!(out, "Endpoints:   {}", result.total_endpoints());
    let _ = writeln!(
        out,
        "Issues:      {} ({} errors, {} warnings)",
        result.total_issues(),
        result.error_count(),
        result.warning_count()
    );
    let _ = writeln!(out, "Duration:    {} ms", result.duration_millis());
    let _ = writeln!(out, "Started:     {}", result.started_at().format("%H:%M:%S"));
    let _ = writeln!(out, "Finished:    {}", finished);
    let _ = writeln!(out, "{}", RULE);

    if result.issues().is_empty() {
        let _ = writeln!(out, "All endpoints passed validation!");
    } else {
        let _ = writeln!(out, "ISSUES FOUND:");
        for issue in result.issues() {
            let _ = writeln!(out, "  {}", issue);
        }
    }
    let _ = writeln!(out, "{}", RULE);
    out
}

/// Machine-readable report.
pub fn render_json(result: &ValidationResult) -> Result<String, ReportError> {
    let serialize = |source: serde_json::Error| ReportError::Serialize { source };
    let report = json!({
        "valid": !result.has_errors(),
        "has_errors": result.has_errors(),
        "errors": result.error_count(),
        "warnings": result.warning_count(),
        "duration_ms": result.duration_millis(),
        "result": serde_json::to_value(result).map_err(serialize)?,
    });
    serde_json::to_string_pretty(&report).map_err(serialize)
}

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>API Contract Validation Report</title>
<style>
body { font-family: sans-serif; margin: 40px; background: #f5f5f5; }
.container { max-width: 1200px; margin: 0 auto; background: white; padding: 30px; }
.status { padding: 5px 15px; border-radius: 20px; font-weight: bold; color: white; }
.status-success { background: #27ae60; }
.status-error { background: #e74c3c; }
.status-warning { background: #f39c12; }
table { width: 100%; border-collapse: collapse; margin-top: 20px; }
th, td { padding: 8px; border-bottom: 1px solid #ddd; text-align: left; }
.sev-ERROR { color: #e74c3c; font-weight: bold; }
.sev-WARNING { color: #f39c12; font-weight: bold; }
</style>
</head>
<body>
<div class="container">
<h1>API Contract Validation Report</h1>
<p><span class="status {{ status_class }}">{{ status_text }}</span></p>
<table class="summary">
<tr><th>Base URL</th><td>{{ base_url }}</td></tr>
<tr><th>Endpoints</th><td>{{ total_endpoints }}</td></tr>
<tr><th>Issues</th><td>{{ total_issues }}</td></tr>
<tr><th>Errors</th><td>{{ errors }}</td></tr>
<tr><th>Warnings</th><td>{{ warnings }}</td></tr>
<tr><th>Duration</th><td>{{ duration_ms }} ms</td></tr>
<tr><th>Started</th><td>{{ started }}</td></tr>
<tr><th>Finished</th><td>{{ finished }}</td></tr>
</table>
{% if issues | length == 0 -%}
<p>All endpoints passed validation!</p>
{% else -%}
<h2>Issues</h2>
<table class="issues">
<tr><th>Severity</th><th>Method</th><th>Path</th><th>Description</th><th>Expected</th><th>Actual</th></tr>
{% for issue in issues -%}
<tr><td class="sev-{{ issue.severity }}">{{ issue.severity }}</td><td>{{ issue.method }}</td><td>{{ issue.path }}</td><td>{{ issue.description }}</td><td>{{ issue.expected }}</td><td>{{ issue.actual }}</td></tr>
{% endfor -%}
</table>
{% endif -%}
</div>
</body>
</html>
"#;

/// Template context for the HTML page.
#[derive(Serialize)]
struct HtmlPage<'a> {
    status_class: &'static str,
    status_text: &'static str,
    base_url: &'a str,
    total_endpoints: usize,
    total_issues: usize,
    errors: usize,
    warnings: usize,
    duration_ms: i64,
    started: String,
    finished: String,
    issues: Vec<HtmlIssue<'a>>,
}

#[derive(Serialize)]
struct HtmlIssue<'a> {
    severity: String,
    method: &'a str,
    path: &'a str,
    description: &'a str,
    expected: &'a str,
    actual: &'a str,
}

impl<'a> HtmlPage<'a> {
    fn new(result: &'a ValidationResult) -> Self {
        let (status_class, status_text) = if result.has_errors() {
            ("status-error", "FAILED")
        } else if result.warning_count() > 0 {
            ("status-warning", "PASSED WITH WARNINGS")
        } else {
            ("status-success", "PASSED")
        };

        Self {
            status_class,
            status_text,
            base_url: result.base_url(),
            total_endpoints: result.total_endpoints(),
            total_issues: result.total_issues(),
            errors: result.error_count(),
            warnings: result.warning_count(),
            duration_ms: result.duration_millis(),
            started: result.started_at().format("%Y-%m-%d %H:%M:%S").to_string(),
            finished: result
                .finished_at()
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
            issues: result
                .issues()
                .iter()
                .map(|issue| HtmlIssue {
                    severity: issue.severity.to_string(),
                    method: &issue.method,
                    path: &issue.path,
                    description: &issue.description,
                    expected: issue.expected.as_deref().unwrap_or(""),
                    actual: issue.actual.as_deref().unwrap_or(""),
                })
                .collect(),
        }
    }
}

/// Self-contained HTML page. Every value is HTML-escaped by the template.
pub fn render_html(result: &ValidationResult) -> Result<String, ReportError> {
    let template = |source: tera::Error| ReportError::Template { source };
    let context = Context::from_serialize(HtmlPage::new(result)).map_err(template)?;
    Tera::one_off(HTML_TEMPLATE, &context, true).map_err(template)
}

/// Render `result` in the format implied by `path` and write it there.
pub fn write_report(result: &ValidationResult, path: &Path) -> Result<(), ReportError> {
    let content = match ReportFormat::from_path(path) {
        ReportFormat::Text => render_text(result),
        ReportFormat::Json => render_json(result)?,
        ReportFormat::Html => render_html(result)?,
    };
    std::fs::write(path, content).map_err(|source| ReportError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}
