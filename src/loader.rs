//! Contract loading from various sources.
//!
//! Reads an OpenAPI document (JSON or YAML) from a file, string or HTTP URL and
//! extracts, per path and method, the schema declared for the success response.

use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ContractError;
use crate::schema::{escape_pointer, SchemaNode};
use crate::types::{CONTENT_TYPE_JSON, STATUS_OK};

/// Default timeout for fetching a remote contract (10 seconds).
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Operation keys of an OpenAPI path item.
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Serialization format of a contract document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    /// Try JSON, fall back to YAML.
    Auto,
}

impl DocumentFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            Some("json") => DocumentFormat::Json,
            _ => DocumentFormat::Auto,
        }
    }
}

/// One declared operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operation_id: Option<String>,
    /// Schema of the `200` response under `application/json`, if declared.
    pub success_schema: Option<SchemaNode>,
}

/// Operations declared for one path, keyed by lowercase method.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathItem {
    pub operations: IndexMap<String, Operation>,
}

impl PathItem {
    pub fn get(&self) -> Option<&Operation> {
        self.operations.get("get")
    }
}

/// Parsed contract document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contract {
    pub title: Option<String>,
    pub version: Option<String>,
    /// Declared paths, in document order.
    pub paths: IndexMap<String, PathItem>,
}

impl Contract {
    /// Build a contract from a parsed OpenAPI document.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::InvalidContract` if the document has no `paths`
    /// object, or `ContractError::UnresolvedRef` for dangling references.
    pub fn from_document(doc: &Value) -> Result<Self, ContractError> {
        let Some(root) = doc.as_object() else {
            return Err(ContractError::InvalidContract {
                message: "document root must be an object".to_string(),
            });
        };
        let paths_obj = root
            .get("paths")
            .and_then(Value::as_object)
            .ok_or_else(|| ContractError::InvalidContract {
                message: "missing \"paths\" object".to_string(),
            })?;

        let info = root.get("info");
        let title = info
            .and_then(|i| i.get("title"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let version = info
            .and_then(|i| i.get("version"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut paths = IndexMap::new();
        for (path, item) in paths_obj {
            let mut operations = IndexMap::new();
            for method in HTTP_METHODS {
                if let Some(op) = item.get(*method) {
                    let location = format!("#/paths/{}/{}", escape_pointer(path), method);
                    operations.insert(method.to_string(), parse_operation(op, doc, &location)?);
                }
            }
            paths.insert(path.clone(), PathItem { operations });
        }

        Ok(Contract {
            title,
            version,
            paths,
        })
    }

    /// Paths that declare a GET operation, in document order.
    pub fn get_endpoints(&self) -> impl Iterator<Item = (&str, &Operation)> {
        self.paths
            .iter()
            .filter_map(|(path, item)| item.get().map(|op| (path.as_str(), op)))
    }
}

fn parse_operation(op: &Value, doc: &Value, location: &str) -> Result<Operation, ContractError> {
    let operation_id = op
        .get("operationId")
        .and_then(Value::as_str)
        .map(str::to_string);

    let Some(response) = op.get("responses").and_then(|r| r.get(STATUS_OK)) else {
        return Ok(Operation {
            operation_id,
            success_schema: None,
        });
    };

    let response_location = format!("{}/responses/{}", location, STATUS_OK);
    let response = match response.get("$ref").and_then(Value::as_str) {
        Some(reference) => navigate_fragment(doc, reference).ok_or_else(|| {
            ContractError::UnresolvedRef {
                reference: reference.to_string(),
                path: response_location.clone(),
            }
        })?,
        None => response,
    };

    let schema = response
        .get("content")
        .and_then(|c| c.get(CONTENT_TYPE_JSON))
        .and_then(|m| m.get("schema"));

    let success_schema = match schema {
        Some(schema) => {
            let schema_location = format!(
                "{}/content/{}/schema",
                response_location,
                escape_pointer(CONTENT_TYPE_JSON)
            );
            Some(SchemaNode::from_openapi_at(schema, doc, &schema_location)?)
        }
        None => None,
    };

    Ok(Operation {
        operation_id,
        success_schema,
    })
}

/// Load a contract from a file path.
///
/// # Errors
///
/// Returns `ContractError::FileNotFound` if the file doesn't exist,
/// or a parse error if the file isn't a valid document.
pub fn load_contract(path: &Path) -> Result<Contract, ContractError> {
    if !path.exists() {
        return Err(ContractError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ContractError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "read contract file");

    let doc = parse_document(&content, DocumentFormat::from_path(path))?;
    finish_load(&doc)
}

/// Load a contract from a JSON or YAML string.
pub fn load_contract_str(content: &str) -> Result<Contract, ContractError> {
    let doc = parse_document(content, DocumentFormat::Auto)?;
    finish_load(&doc)
}

/// Load a contract from an HTTP/HTTPS URL.
///
/// # Errors
///
/// Returns `ContractError::NetworkError` if the request fails or the server
/// answers with a non-success status.
pub fn load_contract_url(url: &str) -> Result<Contract, ContractError> {
    let network = |source: reqwest::Error| ContractError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    let content = client
        .get(url)
        .send()
        .map_err(network)?
        .error_for_status()
        .map_err(network)?
        .text()
        .map_err(network)?;

    let doc = parse_document(&content, DocumentFormat::Auto)?;
    finish_load(&doc)
}

/// Load a contract from a file path or URL.
pub fn load_contract_auto(source: &str) -> Result<Contract, ContractError> {
    if is_url(source) {
        load_contract_url(source)
    } else {
        load_contract(Path::new(source))
    }
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn finish_load(doc: &Value) -> Result<Contract, ContractError> {
    let contract = Contract::from_document(doc)?;
    info!(
        title = contract.title.as_deref().unwrap_or("<untitled>"),
        version = contract.version.as_deref().unwrap_or("-"),
        paths = contract.paths.len(),
        "contract loaded"
    );
    Ok(contract)
}

/// Parse a document in the given format into a JSON tree.
pub fn parse_document(content: &str, format: DocumentFormat) -> Result<Value, ContractError> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(content).map_err(|source| ContractError::InvalidJson { source })
        }
        DocumentFormat::Yaml => parse_yaml(content),
        DocumentFormat::Auto => match serde_json::from_str(content) {
            Ok(doc) => Ok(doc),
            Err(_) => parse_yaml(content),
        },
    }
}

fn parse_yaml(content: &str) -> Result<Value, ContractError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|source| ContractError::InvalidYaml { source })?;
    Ok(yaml_to_json(yaml))
}

/// Convert YAML to JSON, stringifying non-string mapping keys
/// (status codes are routinely written as bare `200:`).
fn yaml_to_json(yaml: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(seq) => Value::Array(seq.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(map) => {
            let mut obj = serde_json::Map::new();
            for (key, value) in map {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    Yaml::Null => "null".to_string(),
                    other => serde_yaml::to_string(&other)
                        .map(|s| s.trim_end().to_string())
                        .unwrap_or_default(),
                };
                obj.insert(key, yaml_to_json(value));
            }
            Value::Object(obj)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

/// Navigate a JSON Pointer fragment (e.g., "#/components/schemas/User").
///
/// Returns the value at the given pointer within `doc`, or `None` if any
/// segment is missing.
pub fn navigate_fragment<'a>(doc: &'a Value, fragment: &str) -> Option<&'a Value> {
    let path = fragment.trim_start_matches('#').trim_start_matches('/');
    if path.is_empty() {
        return Some(doc);
    }

    let mut current = doc;
    for part in path.split('/') {
        // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
        let key = part.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            other => other.get(&key)?,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PrimitiveKind;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PETS_YAML: &str = r#"
openapi: 3.0.3
info:
  title: Pets
  version: "1.2"
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        200:
          description: ok
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: '#/components/schemas/Pet'
    post:
      responses:
        '201':
          description: created
  /health:
    get:
      responses:
        '200':
          description: ok
components:
  schemas:
    Pet:
      type: object
      required: [id]
      properties:
        id:
          type: integer
        name:
          type: string
"#;

    #[test]
    fn load_contract_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(file, "{}", PETS_YAML).unwrap();

        let contract = load_contract(file.path()).unwrap();
        assert_eq!(contract.title.as_deref(), Some("Pets"));
        assert_eq!(contract.version.as_deref(), Some("1.2"));

        let paths: Vec<&str> = contract.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, ["/pets", "/health"]);

        let pets = &contract.paths["/pets"];
        let methods: Vec<&str> = pets.operations.keys().map(String::as_str).collect();
        assert_eq!(methods, ["get", "post"]);

        let get = pets.get().unwrap();
        assert_eq!(get.operation_id.as_deref(), Some("listPets"));
        let Some(SchemaNode::Array { items: Some(items) }) = &get.success_schema else {
            panic!("expected array schema, got {:?}", get.success_schema);
        };
        let SchemaNode::Object(pet) = items.as_ref() else {
            panic!("expected object items");
        };
        assert_eq!(pet.required, ["id"]);
        assert_eq!(
            pet.properties["id"],
            SchemaNode::Primitive {
                kind: PrimitiveKind::Integer,
                nullable: false
            }
        );

        assert!(contract.paths["/health"].get().unwrap().success_schema.is_none());
    }

    #[test]
    fn load_contract_file_not_found() {
        let result = load_contract(Path::new("/nonexistent/openapi.yaml"));
        assert!(matches!(result, Err(ContractError::FileNotFound { .. })));
    }

    #[test]
    fn load_contract_invalid_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "not valid json").unwrap();

        let result = load_contract(file.path());
        assert!(matches!(result, Err(ContractError::InvalidJson { .. })));
    }

    #[test]
    fn load_contract_without_paths() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"openapi": "3.0.0"}}"#).unwrap();

        let result = load_contract(file.path());
        assert!(matches!(result, Err(ContractError::InvalidContract { .. })));
    }

    #[test]
    fn load_contract_str_json() {
        let contract = load_contract_str(
            r#"{"paths": {"/users": {"get": {"responses": {"200": {
                "content": {"application/json": {"schema": {"type": "object"}}}
            }}}}}}"#,
        )
        .unwrap();
        let endpoints: Vec<&str> = contract.get_endpoints().map(|(p, _)| p).collect();
        assert_eq!(endpoints, ["/users"]);
    }

    #[test]
    fn only_json_media_type_is_consulted() {
        let contract = Contract::from_document(&json!({
            "paths": {
                "/report": {
                    "get": {
                        "responses": {
                            "200": {
                                "content": {
                                    "text/csv": {"schema": {"type": "string"}}
                                }
                            }
                        }
                    }
                }
            }
        }))
        .unwrap();
        assert!(contract.paths["/report"].get().unwrap().success_schema.is_none());
    }

    #[test]
    fn response_ref_is_followed() {
        let contract = Contract::from_document(&json!({
            "paths": {
                "/me": {
                    "get": {
                        "responses": {"200": {"$ref": "#/components/responses/Me"}}
                    }
                }
            },
            "components": {
                "responses": {
                    "Me": {
                        "content": {
                            "application/json": {"schema": {"type": "string"}}
                        }
                    }
                }
            }
        }))
        .unwrap();
        assert_eq!(
            contract.paths["/me"].get().unwrap().success_schema,
            Some(SchemaNode::Primitive {
                kind: PrimitiveKind::String,
                nullable: false
            })
        );
    }

    #[test]
    fn dangling_schema_ref_fails_load() {
        let result = Contract::from_document(&json!({
            "paths": {
                "/users": {
                    "get": {
                        "responses": {"200": {"content": {"application/json": {
                            "schema": {"$ref": "#/components/schemas/User"}
                        }}}}
                    }
                }
            }
        }));
        assert!(matches!(result, Err(ContractError::UnresolvedRef { .. })));
    }

    #[test]
    fn get_endpoints_skips_paths_without_get() {
        let contract = Contract::from_document(&json!({
            "paths": {
                "/a": {"get": {}},
                "/b": {"post": {}},
                "/c": {"get": {}}
            }
        }))
        .unwrap();
        let endpoints: Vec<&str> = contract.get_endpoints().map(|(p, _)| p).collect();
        assert_eq!(endpoints, ["/a", "/c"]);
    }

    #[test]
    fn navigate_fragment_unescapes() {
        let doc = json!({"paths": {"/users/{id}": {"get": {"x": [10, 20]}}}});
        assert_eq!(
            navigate_fragment(&doc, "#/paths/~1users~1{id}/get/x/1"),
            Some(&json!(20))
        );
        assert_eq!(navigate_fragment(&doc, "#"), Some(&doc));
        assert_eq!(navigate_fragment(&doc, "#/paths/missing"), None);
    }

    #[test]
    fn document_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.YML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("openapi")), DocumentFormat::Auto);
    }

    #[test]
    fn is_url_detection() {
        assert!(is_url("https://example.com/openapi.yaml"));
        assert!(is_url("http://example.com/openapi.json"));
        assert!(!is_url("./openapi.yaml"));
        assert!(!is_url("openapi.yaml"));
    }
}
