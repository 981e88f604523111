//! Structural validation of response bodies against declared schemas.
//!
//! [`validate_response_body`] parses a raw body and hands the root value to
//! [`validate_value`], which dispatches on the schema shape and recurses into
//! object members and array items. Validation is a pure descent over the parsed
//! value: no I/O, no shared state, and the same input always yields the same
//! issues in the same order.
//!
//! # Issue classification
//!
//! | Finding | Severity |
//! |---------|----------|
//! | Empty or malformed body | ERROR |
//! | Type mismatch, null on non-nullable | ERROR |
//! | Missing required field | ERROR |
//! | Undeclared field present | WARNING |
//! | Untyped schema (`Unknown`) | none |

use serde_json::Value;
use tracing::{debug, warn};

use crate::schema::{ObjectSchema, PrimitiveKind, SchemaNode};
use crate::types::{json_type_name, Severity, ValidationContext, ValidationIssue};

/// Validate a raw response body against `schema`.
///
/// An empty (or all-whitespace) body and a body that is not valid JSON each
/// produce exactly one ERROR and stop validation.
pub fn validate_response_body(
    body: &str,
    schema: &SchemaNode,
    context: &ValidationContext,
) -> Vec<ValidationIssue> {
    if body.trim().is_empty() {
        return vec![context
            .issue(Severity::Error, "Response body is empty")
            .expected("Valid JSON object/array")
            .actual("Empty response")];
    }

    let root: Value = match serde_json::from_str(body) {
        Ok(root) => root,
        Err(e) => {
            warn!(
                endpoint = %context.endpoint_path,
                error = %e,
                "failed to parse response body as JSON"
            );
            return vec![context
                .issue(Severity::Error, "Failed to parse response body as JSON")
                .expected("Valid JSON")
                .actual(format!("Parse error: {}", e))];
        }
    };

    validate_value(&root, schema, context)
}

/// Validate an already-parsed value against `schema`.
pub fn validate_value(
    value: &Value,
    schema: &SchemaNode,
    context: &ValidationContext,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    dispatch(value, schema, context, &mut issues);
    issues
}

fn dispatch(
    value: &Value,
    schema: &SchemaNode,
    context: &ValidationContext,
    issues: &mut Vec<ValidationIssue>,
) {
    match schema {
        SchemaNode::Primitive { kind, nullable } => {
            check_primitive(value, *kind, *nullable, context, issues)
        }
        SchemaNode::Object(object) => check_object(value, object, context, issues),
        SchemaNode::Array { items } => check_array(value, items.as_deref(), context, issues),
        // The contract format permits schemas without type information;
        // there is nothing to compare against.
        SchemaNode::Unknown => {
            debug!(field = %context.field_path, "schema type not specified, skipping");
        }
    }
}

fn check_primitive(
    value: &Value,
    kind: PrimitiveKind,
    nullable: bool,
    context: &ValidationContext,
    issues: &mut Vec<ValidationIssue>,
) {
    let path = &context.field_path;

    if value.is_null() {
        if !nullable {
            issues.push(
                context
                    .issue(
                        Severity::Error,
                        format!("Field is null but not marked as nullable at {}", path),
                    )
                    .expected("Non-null value")
                    .actual("null")
                    .at_field(path.as_str()),
            );
        }
        return;
    }

    if !kind.matches(value) {
        issues.push(
            context
                .issue(Severity::Error, format!("Type mismatch at {}", path))
                .expected(format!("Expected type: {}", kind.as_str()))
                .actual(format!("Actual type: {}", json_type_name(value)))
                .at_field(path.as_str()),
        );
    }
}

fn check_object(
    value: &Value,
    schema: &ObjectSchema,
    context: &ValidationContext,
    issues: &mut Vec<ValidationIssue>,
) {
    let Value::Object(members) = value else {
        issues.push(expected_shape(context, "object", value));
        return;
    };

    for name in &schema.required {
        if !members.contains_key(name) {
            let field_path = context.field_path_of(name);
            issues.push(
                context
                    .issue(
                        Severity::Error,
                        format!("Missing required field: {} at {}", name, field_path),
                    )
                    .expected(format!("Field '{}' must be present", name))
                    .actual("Field is missing")
                    .at_field(field_path),
            );
        }
    }

    for (name, property) in &schema.properties {
        if let Some(member) = members.get(name) {
            dispatch(member, property, &context.field(name), issues);
        }
    }

    if schema.allows_undeclared {
        return;
    }
    for name in members.keys() {
        if !schema.properties.contains_key(name) {
            let field_path = context.field_path_of(name);
            issues.push(
                context
                    .issue(
                        Severity::Warning,
                        format!("Unexpected field in response: {}", field_path),
                    )
                    .expected("Only documented fields")
                    .actual("Field not in specification")
                    .at_field(field_path),
            );
        }
    }
}

fn check_array(
    value: &Value,
    items: Option<&SchemaNode>,
    context: &ValidationContext,
    issues: &mut Vec<ValidationIssue>,
) {
    let Value::Array(elements) = value else {
        issues.push(expected_shape(context, "array", value));
        return;
    };

    // No item schema: elements are structurally unchecked.
    let Some(items) = items else {
        return;
    };
    for (index, element) in elements.iter().enumerate() {
        dispatch(element, items, &context.item(index), issues);
    }
}

fn expected_shape(context: &ValidationContext, shape: &str, value: &Value) -> ValidationIssue {
    context
        .issue(
            Severity::Error,
            format!("Expected {} at {}", shape, context.field_path),
        )
        .expected(format!("JSON {}", shape))
        .actual(format!("Type: {}", json_type_name(value)))
        .at_field(context.field_path.as_str())
}
