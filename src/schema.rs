use crate::inspection::{BodyView, print_api_response};
use serde_json::Value;

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("Invalid JSON response for {name}: {source}\nBody: {body}")]
    InvalidJson {
        name: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid {name} schema: {message}")]
    InvalidSchema { name: String, message: String },
    #[error("{name} schema validation failed:\n{}", .violations.join("\n"))]
    Mismatch {
        name: String,
        violations: Vec<String>,
    },
}

/// Validate a response body against a JSON Schema.
///
/// Text bodies are parsed first. On mismatch the offending instance is
/// printed and every violation is reported with its instance path.
pub fn validate_schema<'a>(
    body: impl Into<BodyView<'a>>,
    schema: &Value,
    name: &str,
) -> Result<(), SchemaError> {
    let body = body.into();
    let instance = body.to_json().map_err(|source| SchemaError::InvalidJson {
        name: name.to_owned(),
        body: format!("{:?}", body),
        source,
    })?;

    let validator = jsonschema::validator_for(schema).map_err(|e| SchemaError::InvalidSchema {
        name: name.to_owned(),
        message: e.to_string(),
    })?;

    let violations: Vec<String> = validator
        .iter_errors(&instance)
        .map(|error| {
            let path = error.instance_path.to_string();
            if path.is_empty() {
                error.to_string()
            } else {
                format!("{}: {}", path, error)
            }
        })
        .collect();

    if !violations.is_empty() {
        print_api_response(&format!("{} Schema Validation Failed", name), None, body);
        return Err(SchemaError::Mismatch {
            name: name.to_owned(),
            violations,
        });
    }

    tracing::info!("{} schema validation passed", name);
    Ok(())
}

/// Shape of a single category, wherever the envelope puts it.
pub fn category_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "required": ["name", "description"],
        "properties": {
            "name": {"type": "string", "minLength": 1},
            "description": {"type": ["string", "null"]}
        }
    })
}

/// Shape of a list response: `data` is a list or holds a `categories` list.
pub fn category_list_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "required": ["data"],
        "properties": {
            "data": {
                "oneOf": [
                    {"type": "array", "items": {"type": "object"}},
                    {
                        "type": "object",
                        "required": ["categories"],
                        "properties": {
                            "categories": {"type": "array", "items": {"type": "object"}}
                        }
                    }
                ]
            }
        }
    })
}

/// Shape of an error response: an `error` or a `message`.
pub fn error_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "anyOf": [
            {"required": ["error"]},
            {"required": ["message"]}
        ]
    })
}
