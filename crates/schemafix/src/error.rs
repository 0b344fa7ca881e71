use std::fmt;

use serde_json::{Number, Value};

use crate::{
    paths::Location,
    types::{JsonType, JsonTypeSet},
};

/// Any failure the engine can produce.
///
/// "Document does not satisfy schema" travels as [`Error::Validation`] and
/// carries the full ordered violation list; everything else is a hard error
/// that aborted the operation at its point of origin.
#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    Schema(SchemaError),
    RecursionLimit(RecursionLimitError),
    Validation(ValidationFailure),
    Patch(PatchError),
    PatchApply(PatchApplyError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(error) => error.fmt(f),
            Error::Schema(error) => error.fmt(f),
            Error::RecursionLimit(error) => error.fmt(f),
            Error::Validation(error) => error.fmt(f),
            Error::Patch(error) => error.fmt(f),
            Error::PatchApply(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

macro_rules! impl_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Error {
                fn from(error: $ty) -> Error {
                    Error::$variant(error)
                }
            }
        )*
    };
}

impl_from!(
    Parse => ParseError,
    Schema => SchemaError,
    RecursionLimit => RecursionLimitError,
    Validation => ValidationFailure,
    Patch => PatchError,
    PatchApply => PatchApplyError,
);

/// Malformed JSON text.
#[derive(Debug)]
pub struct ParseError {
    offset: usize,
    message: String,
}

impl ParseError {
    /// Wrap a serde_json error, recovering the byte offset of the failure
    /// from its line/column against the original input.
    pub(crate) fn new(error: &serde_json::Error, input: &str) -> ParseError {
        ParseError {
            offset: byte_offset(input, error.line(), error.column()),
            message: error.to_string(),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn byte_offset(input: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let skipped: usize = input
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    (skipped + column.saturating_sub(1)).min(input.len())
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (byte offset {})", self.message, self.offset)
    }
}

impl std::error::Error for ParseError {}

/// Structurally invalid schema document.
#[derive(Debug)]
pub struct SchemaError {
    keyword: &'static str,
    location: Location,
    message: String,
}

impl SchemaError {
    pub(crate) fn new(
        keyword: &'static str,
        location: Location,
        message: impl Into<String>,
    ) -> SchemaError {
        SchemaError {
            keyword,
            location,
            message: message.into(),
        }
    }

    pub fn keyword(&self) -> &str {
        self.keyword
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid schema: {} ({} at {})",
            self.message, self.keyword, self.location
        )
    }
}

impl std::error::Error for SchemaError {}

/// A `$ref` chain went deeper than the configured limit.
#[derive(Debug)]
pub struct RecursionLimitError {
    limit: usize,
    location: Location,
}

impl RecursionLimitError {
    pub(crate) fn new(limit: usize, location: Location) -> RecursionLimitError {
        RecursionLimitError { limit, location }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}

impl fmt::Display for RecursionLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reference recursion limit of {} exceeded at {}",
            self.limit, self.location
        )
    }
}

impl std::error::Error for RecursionLimitError {}

/// The document does not satisfy the schema.
#[derive(Debug)]
pub struct ValidationFailure {
    violations: Vec<Violation>,
}

impl ValidationFailure {
    pub(crate) fn new(violations: Vec<Violation>) -> ValidationFailure {
        ValidationFailure { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.as_slice() {
            [] => f.write_str("validation failed"),
            [single] => single.fmt(f),
            [first, rest @ ..] => {
                first.fmt(f)?;
                for violation in rest {
                    write!(f, "; {violation}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationFailure {}

/// No mechanical correction exists for a violation.
#[derive(Debug)]
pub struct PatchError {
    keyword: &'static str,
    location: Location,
    message: String,
}

impl PatchError {
    pub(crate) fn new(
        keyword: &'static str,
        location: Location,
        message: impl Into<String>,
    ) -> PatchError {
        PatchError {
            keyword,
            location,
            message: message.into(),
        }
    }

    pub fn keyword(&self) -> &str {
        self.keyword
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot derive a patch for {} at {}: {}",
            self.keyword, self.location, self.message
        )
    }
}

impl std::error::Error for PatchError {}

/// A patch could not be applied to the document.
#[derive(Debug)]
pub struct PatchApplyError {
    index: usize,
    path: String,
    message: String,
}

impl PatchApplyError {
    pub(crate) fn new(index: usize, path: &str, message: impl Into<String>) -> PatchApplyError {
        PatchApplyError {
            index,
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub fn operation_index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for PatchApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "patch operation {} at \"{}\" failed: {}",
            self.index, self.path, self.message
        )
    }
}

impl std::error::Error for PatchApplyError {}

/// A single mismatch between a document node and a schema constraint.
#[derive(Debug, Clone)]
pub struct Violation {
    instance_path: Location,
    schema_path: Location,
    kind: ViolationKind,
}

impl Violation {
    pub(crate) fn new(
        instance_path: Location,
        schema_path: Location,
        kind: ViolationKind,
    ) -> Violation {
        Violation {
            instance_path,
            schema_path,
            kind,
        }
    }

    /// JSON Pointer to the offending document node.
    pub fn instance_path(&self) -> &Location {
        &self.instance_path
    }

    /// JSON Pointer to the failed keyword within the schema.
    pub fn schema_path(&self) -> &Location {
        &self.schema_path
    }

    pub fn kind(&self) -> &ViolationKind {
        &self.kind
    }

    /// The schema keyword that failed.
    pub fn keyword(&self) -> &'static str {
        match &self.kind {
            ViolationKind::Type { .. } => "type",
            ViolationKind::Enum { .. } => "enum",
            ViolationKind::Const { .. } => "const",
            ViolationKind::Minimum { .. } => "minimum",
            ViolationKind::Maximum { .. } => "maximum",
            ViolationKind::ExclusiveMinimum { .. } => "exclusiveMinimum",
            ViolationKind::ExclusiveMaximum { .. } => "exclusiveMaximum",
            ViolationKind::MultipleOf { .. } => "multipleOf",
            ViolationKind::MinLength { .. } => "minLength",
            ViolationKind::MaxLength { .. } => "maxLength",
            ViolationKind::Pattern { .. } => "pattern",
            ViolationKind::MinItems { .. } => "minItems",
            ViolationKind::MaxItems { .. } => "maxItems",
            ViolationKind::UniqueItems => "uniqueItems",
            ViolationKind::MinProperties { .. } => "minProperties",
            ViolationKind::MaxProperties { .. } => "maxProperties",
            ViolationKind::Required { .. } => "required",
            ViolationKind::AdditionalProperty { .. } => "additionalProperties",
            ViolationKind::AnyOf { .. } => "anyOf",
            ViolationKind::OneOfNone | ViolationKind::OneOfMultiple { .. } => "oneOf",
            ViolationKind::Not => "not",
            ViolationKind::Never => "false",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.instance_path)?;
        match &self.kind {
            ViolationKind::Type {
                expected, actual, ..
            } => {
                write!(f, "expected {expected}, got {actual}")
            }
            ViolationKind::Enum { .. } => f.write_str("value is not one of the allowed values"),
            ViolationKind::Const { expected } => {
                write!(f, "value must be equal to {expected}")
            }
            ViolationKind::Minimum { limit } => write!(f, "value is less than {limit}"),
            ViolationKind::Maximum { limit } => write!(f, "value is greater than {limit}"),
            ViolationKind::ExclusiveMinimum { limit } => {
                write!(f, "value is not greater than {limit}")
            }
            ViolationKind::ExclusiveMaximum { limit } => {
                write!(f, "value is not less than {limit}")
            }
            ViolationKind::MultipleOf { factor } => {
                write!(f, "value is not a multiple of {factor}")
            }
            ViolationKind::MinLength { limit, actual } => {
                write!(f, "string has {actual} characters, expected at least {limit}")
            }
            ViolationKind::MaxLength { limit, actual } => {
                write!(f, "string has {actual} characters, expected at most {limit}")
            }
            ViolationKind::Pattern { pattern } => {
                write!(f, "string does not match pattern \"{pattern}\"")
            }
            ViolationKind::MinItems { limit, actual, .. } => {
                write!(f, "array has {actual} items, expected at least {limit}")
            }
            ViolationKind::MaxItems { limit, actual } => {
                write!(f, "array has {actual} items, expected at most {limit}")
            }
            ViolationKind::UniqueItems => f.write_str("array items are not unique"),
            ViolationKind::MinProperties { limit, actual } => {
                write!(f, "object has {actual} properties, expected at least {limit}")
            }
            ViolationKind::MaxProperties { limit, actual } => {
                write!(f, "object has {actual} properties, expected at most {limit}")
            }
            ViolationKind::Required { property, .. } => {
                write!(f, "missing required property \"{property}\"")
            }
            ViolationKind::AdditionalProperty { property } => {
                write!(f, "additional property \"{property}\" is not allowed")
            }
            ViolationKind::AnyOf { violations } => {
                f.write_str("no alternative matched")?;
                if let Some(best) = violations.first() {
                    write!(f, " (closest: {best})")?;
                }
                Ok(())
            }
            ViolationKind::OneOfNone => f.write_str("no alternative matched"),
            ViolationKind::OneOfMultiple { matched } => {
                write!(f, "multiple alternatives matched ({} of them)", matched.len())
            }
            ViolationKind::Not => f.write_str("value must not match the schema"),
            ViolationKind::Never => f.write_str("schema allows no values"),
        }
    }
}

/// What exactly failed, with the keyword's parameters.
///
/// Kinds capture the schema-declared defaults relevant to them so that patch
/// generation can work off the violation list alone.
#[derive(Debug, Clone)]
pub enum ViolationKind {
    Type {
        expected: JsonTypeSet,
        actual: JsonType,
        default: Option<Value>,
    },
    Enum {
        allowed: Vec<Value>,
    },
    Const {
        expected: Value,
    },
    Minimum {
        limit: Number,
    },
    Maximum {
        limit: Number,
    },
    ExclusiveMinimum {
        limit: Number,
    },
    ExclusiveMaximum {
        limit: Number,
    },
    MultipleOf {
        factor: f64,
    },
    MinLength {
        limit: u64,
        actual: u64,
    },
    MaxLength {
        limit: u64,
        actual: u64,
    },
    Pattern {
        pattern: String,
    },
    MinItems {
        limit: u64,
        actual: u64,
        pad: Option<Value>,
    },
    MaxItems {
        limit: u64,
        actual: u64,
    },
    UniqueItems,
    MinProperties {
        limit: u64,
        actual: u64,
    },
    MaxProperties {
        limit: u64,
        actual: u64,
    },
    Required {
        property: String,
        default: Option<Value>,
    },
    AdditionalProperty {
        property: String,
    },
    AnyOf {
        /// Violations of the best-diagnostic alternative, not all of them.
        violations: Vec<Violation>,
    },
    OneOfNone,
    OneOfMultiple {
        matched: Vec<usize>,
    },
    Not,
    Never,
}

#[cfg(test)]
mod tests {
    use super::{byte_offset, ParseError};

    #[test]
    fn byte_offset_from_line_and_column() {
        let input = "{\n  \"a\": }\n";
        assert_eq!(byte_offset(input, 2, 10), 11);
        assert_eq!(byte_offset(input, 1, 1), 0);
    }

    #[test]
    fn parse_error_reports_offset() {
        let input = "{\"type\": }";
        let error = serde_json::from_str::<serde_json::Value>(input).unwrap_err();
        let parse = ParseError::new(&error, input);
        assert_eq!(parse.offset(), 9);
        assert!(parse.to_string().contains("byte offset 9"));
    }
}
