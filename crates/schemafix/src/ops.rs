//! The text-in/text-out operation surface consumed by host integrations.
//!
//! Each operation takes raw schema/document text and reports every failure,
//! including plain schema/value mismatches, as a single [`OpError`] carrying
//! the cause and a truncated echo of the offending input. A bare `false` is
//! never returned for structural problems.

use std::fmt;

use serde_json::Value;

use crate::{compile, error::ParseError, patch, validator::Mode, Error};

/// How much of the offending input is echoed back in error messages.
const ECHO_LIMIT: usize = 256;

/// A failed operation, rendered as
/// `"<operation> failed, here is why: <detail>\n<label>: <input>"`.
#[derive(Debug)]
pub struct OpError {
    operation: &'static str,
    label: &'static str,
    input: String,
    source: Error,
}

impl OpError {
    fn new(operation: &'static str, label: &'static str, input: &str, source: Error) -> OpError {
        OpError {
            operation,
            label,
            input: truncate(input),
            source,
        }
    }

    pub fn source(&self) -> &Error {
        &self.source
    }
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed, here is why: {}\n{}: {}",
            self.operation, self.source, self.label, self.input
        )
    }
}

impl std::error::Error for OpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

fn truncate(input: &str) -> String {
    if input.len() <= ECHO_LIMIT {
        return input.to_string();
    }
    let mut end = ECHO_LIMIT;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &input[..end])
}

fn parse(
    operation: &'static str,
    label: &'static str,
    echo: &str,
    text: &str,
) -> Result<Value, OpError> {
    serde_json::from_str(text)
        .map_err(|error| OpError::new(operation, label, echo, ParseError::new(&error, text).into()))
}

/// Check that `schema_text` is a syntactically valid JSON Schema document.
pub fn validate_schema(schema_text: &str) -> Result<bool, OpError> {
    const OPERATION: &str = "validate_schema";
    let schema = parse(OPERATION, "Schema", schema_text, schema_text)?;
    compile(&schema).map_err(|error| OpError::new(OPERATION, "Schema", schema_text, error))?;
    Ok(true)
}

/// Validate a document against a schema. Mismatches fail with the violation
/// path and reason; `true` is returned only for a conforming document.
pub fn validate(schema_text: &str, document_text: &str) -> Result<bool, OpError> {
    const OPERATION: &str = "validate";
    let schema = parse(OPERATION, "Value", document_text, schema_text)?;
    let compiled =
        compile(&schema).map_err(|error| OpError::new(OPERATION, "Value", document_text, error))?;
    let document = parse(OPERATION, "Value", document_text, document_text)?;
    compiled
        .validate(&document, Mode::CollectAll)
        .map_err(|error| OpError::new(OPERATION, "Value", document_text, error))?;
    Ok(true)
}

/// Compute the corrective patch and return it as a JSON array of operations.
pub fn patch(schema_text: &str, document_text: &str) -> Result<String, OpError> {
    const OPERATION: &str = "patch";
    let (compiled, document) = prepare(OPERATION, schema_text, document_text)?;
    let operations = compiled
        .generate_patch(&document)
        .map_err(|error| OpError::new(OPERATION, "Value", document_text, error))?;
    serialize(OPERATION, document_text, &operations)
}

/// Compute and apply the corrective patch, returning the updated document.
pub fn update(schema_text: &str, document_text: &str) -> Result<String, OpError> {
    const OPERATION: &str = "update";
    let (compiled, document) = prepare(OPERATION, schema_text, document_text)?;
    let operations = compiled
        .generate_patch(&document)
        .map_err(|error| OpError::new(OPERATION, "Value", document_text, error))?;
    let updated = patch::apply(&document, &operations)
        .map_err(|error| OpError::new(OPERATION, "Value", document_text, error))?;
    serialize(OPERATION, document_text, &updated)
}

fn prepare(
    operation: &'static str,
    schema_text: &str,
    document_text: &str,
) -> Result<(crate::CompiledSchema, Value), OpError> {
    let schema = parse(operation, "Value", document_text, schema_text)?;
    let compiled =
        compile(&schema).map_err(|error| OpError::new(operation, "Value", document_text, error))?;
    let document = parse(operation, "Value", document_text, document_text)?;
    Ok((compiled, document))
}

fn serialize<T: serde::Serialize>(
    operation: &'static str,
    document_text: &str,
    value: &T,
) -> Result<String, OpError> {
    serde_json::to_string(value).map_err(|error| {
        OpError::new(
            operation,
            "Value",
            document_text,
            ParseError::new(&error, "").into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::{patch, update, validate, validate_schema};
    use crate::Error;
    use serde_json::json;

    #[test]
    fn validate_schema_accepts_well_formed_schemas() {
        assert!(validate_schema(r#"{"type": "object"}"#).unwrap());
        assert!(validate_schema("true").unwrap());
    }

    #[test]
    fn malformed_schema_text_reports_parse_offset() {
        let error = validate_schema(r#"{"type": }"#).unwrap_err();
        assert!(matches!(error.source(), Error::Parse(parse) if parse.offset() == 9));
        let message = error.to_string();
        assert!(message.starts_with("validate_schema failed, here is why: "));
        assert!(message.contains("\nSchema: {\"type\": }"));
    }

    #[test]
    fn validate_fails_with_violation_detail_instead_of_false() {
        let schema = r#"{"type": "object", "required": ["id"]}"#;
        let error = validate(schema, r#"{"name": "x"}"#).unwrap_err();
        let message = error.to_string();
        assert!(message.starts_with("validate failed, here is why: "));
        assert!(message.contains("missing required property \"id\""));
        assert!(message.ends_with("\nValue: {\"name\": \"x\"}"));
    }

    #[test]
    fn validate_returns_true_for_conforming_documents() {
        let schema = r#"{"type": "object", "required": ["id"]}"#;
        assert!(validate(schema, r#"{"id": 5}"#).unwrap());
    }

    #[test]
    fn patch_returns_serialized_operations() {
        let schema = r#"{"required": ["id"], "properties": {"id": {"default": 0}}}"#;
        let serialized = patch(schema, "{}").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, json!([{"op": "add", "path": "/id", "value": 0}]));
    }

    #[test]
    fn update_returns_the_corrected_document() {
        let schema = r#"{"required": ["id"], "properties": {"id": {"default": 0}}}"#;
        let updated = update(schema, r#"{"name": "x"}"#).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&updated).unwrap();
        assert_eq!(parsed, json!({"name": "x", "id": 0}));
    }

    #[test]
    fn update_propagates_patch_errors() {
        let schema = r#"{"required": ["id"]}"#;
        let error = update(schema, "{}").unwrap_err();
        assert!(matches!(error.source(), Error::Patch(_)));
        assert!(error.to_string().starts_with("update failed, here is why: "));
    }

    #[test]
    fn long_inputs_are_truncated_in_the_echo() {
        let document = format!("\"{}\"", "x".repeat(1000));
        let schema = r#"{"type": "integer"}"#;
        let error = validate(schema, &document).unwrap_err();
        let message = error.to_string();
        assert!(message.ends_with("..."));
        assert!(message.len() < document.len());
    }
}
