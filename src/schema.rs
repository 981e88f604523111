//! Declared response shapes.
//!
//! A [`SchemaNode`] is the checked subset of an OpenAPI schema object: primitives,
//! objects and arrays. Everything else (no `type`, composition keywords) becomes
//! [`SchemaNode::Unknown`], which the validator accepts without comment.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::error::ContractError;
use crate::loader::navigate_fragment;

/// Primitive schema kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl PrimitiveKind {
    /// Parse an OpenAPI `type` value. Returns `None` for non-primitive types.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(PrimitiveKind::String),
            "integer" => Some(PrimitiveKind::Integer),
            "number" => Some(PrimitiveKind::Number),
            "boolean" => Some(PrimitiveKind::Boolean),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
        }
    }

    /// Whether `value` (known to be non-null) has this kind.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            PrimitiveKind::String => value.is_string(),
            PrimitiveKind::Integer => value.is_i64() || value.is_u64(),
            PrimitiveKind::Number => value.is_number(),
            PrimitiveKind::Boolean => value.is_boolean(),
        }
    }
}

/// Object shape: declared members and which of them must be present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    /// Declared members, in document order.
    pub properties: IndexMap<String, SchemaNode>,
    /// Names that must be present, in document order.
    pub required: Vec<String>,
    /// Undeclared members are expected (no `properties`, or an explicit
    /// `additionalProperties`), so they are not reported.
    pub allows_undeclared: bool,
}

/// One node of the declared shape tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Primitive { kind: PrimitiveKind, nullable: bool },
    Object(ObjectSchema),
    Array { items: Option<Box<SchemaNode>> },
    /// Untyped or unsupported schema; never produces issues.
    Unknown,
}

impl SchemaNode {
    /// Convert an OpenAPI schema object, resolving `#/...` references against `root`.
    ///
    /// A reference that points back into its own chain (a recursive schema)
    /// becomes [`SchemaNode::Unknown`] at the point of recursion.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::UnresolvedRef` for external references or
    /// pointers that do not resolve inside `root`.
    pub fn from_openapi(schema: &Value, root: &Value) -> Result<Self, ContractError> {
        Self::from_openapi_at(schema, root, "#")
    }

    /// Like [`from_openapi`](Self::from_openapi), with `location` naming where
    /// `schema` sits in the document (used in error messages).
    pub(crate) fn from_openapi_at(
        schema: &Value,
        root: &Value,
        location: &str,
    ) -> Result<Self, ContractError> {
        let mut converter = Converter {
            root,
            ref_stack: Vec::new(),
        };
        converter.convert(schema, location)
    }

    /// Short name of the shape, for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaNode::Primitive { kind, .. } => kind.as_str(),
            SchemaNode::Object(_) => "object",
            SchemaNode::Array { .. } => "array",
            SchemaNode::Unknown => "unknown",
        }
    }
}

struct Converter<'a> {
    root: &'a Value,
    ref_stack: Vec<String>,
}

impl Converter<'_> {
    fn convert(&mut self, schema: &Value, location: &str) -> Result<SchemaNode, ContractError> {
        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            return self.convert_ref(reference, location);
        }

        let Value::Object(map) = schema else {
            return Ok(SchemaNode::Unknown);
        };

        let (type_name, type_allows_null) = match map.get("type") {
            Some(Value::String(t)) => (Some(t.as_str()), false),
            // OpenAPI 3.1: ["string", "null"]
            Some(Value::Array(types)) => {
                let names: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
                let non_null: Vec<&str> = names.iter().copied().filter(|t| *t != "null").collect();
                let single = if non_null.len() == 1 {
                    Some(non_null[0])
                } else {
                    None
                };
                (single, names.contains(&"null"))
            }
            _ => (None, false),
        };
        let nullable =
            type_allows_null || map.get("nullable").and_then(Value::as_bool).unwrap_or(false);

        let node = match type_name {
            Some("object") => SchemaNode::Object(self.convert_object(map, location)?),
            Some("array") => {
                let items = match map.get("items") {
                    Some(items) => Some(Box::new(
                        self.convert(items, &format!("{}/items", location))?,
                    )),
                    None => None,
                };
                SchemaNode::Array { items }
            }
            Some(other) => match PrimitiveKind::parse(other) {
                Some(kind) => SchemaNode::Primitive { kind, nullable },
                None => SchemaNode::Unknown,
            },
            None => SchemaNode::Unknown,
        };
        Ok(node)
    }

    fn convert_ref(&mut self, reference: &str, location: &str) -> Result<SchemaNode, ContractError> {
        let unresolved = || ContractError::UnresolvedRef {
            reference: reference.to_string(),
            path: location.to_string(),
        };

        if !reference.starts_with('#') {
            return Err(unresolved());
        }
        if self.ref_stack.iter().any(|r| r == reference) {
            debug!(reference, "recursive schema reference left unchecked");
            return Ok(SchemaNode::Unknown);
        }

        let target = navigate_fragment(self.root, reference).ok_or_else(unresolved)?;

        self.ref_stack.push(reference.to_string());
        let node = self.convert(target, reference);
        self.ref_stack.pop();
        node
    }

    fn convert_object(
        &mut self,
        map: &serde_json::Map<String, Value>,
        location: &str,
    ) -> Result<ObjectSchema, ContractError> {
        let mut properties = IndexMap::new();
        let declared = map.get("properties").and_then(Value::as_object);
        if let Some(declared) = declared {
            for (name, schema) in declared {
                let child = format!("{}/properties/{}", location, escape_pointer(name));
                properties.insert(name.clone(), self.convert(schema, &child)?);
            }
        }

        let required = map
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let explicitly_open = match map.get("additionalProperties") {
            Some(Value::Bool(allowed)) => *allowed,
            Some(Value::Object(_)) => true,
            _ => false,
        };

        Ok(ObjectSchema {
            properties,
            required,
            allows_undeclared: declared.is_none() || explicitly_open,
        })
    }
}

/// JSON Pointer escaping (`~` → `~0`, `/` → `~1`).
pub(crate) fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
