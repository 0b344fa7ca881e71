use serde_json::{Map, Value};

use crate::{
    error::{Error, SchemaError},
    paths::Location,
    schema::{CompiledPattern, Constraint},
};

use super::expect_u64;

pub(super) fn compile(
    object: &Map<String, Value>,
    location: &Location,
    constraints: &mut Vec<Constraint>,
) -> Result<(), Error> {
    if let Some(value) = object.get("minLength") {
        constraints.push(Constraint::MinLength(expect_u64(
            "minLength", value, location,
        )?));
    }
    if let Some(value) = object.get("maxLength") {
        constraints.push(Constraint::MaxLength(expect_u64(
            "maxLength", value, location,
        )?));
    }
    if let Some(value) = object.get("pattern") {
        let Value::String(source) = value else {
            return Err(SchemaError::new(
                "pattern",
                location.join("pattern"),
                "pattern must be a string",
            )
            .into());
        };
        let regex = fancy_regex::Regex::new(source).map_err(|error| {
            SchemaError::new(
                "pattern",
                location.join("pattern"),
                format!("invalid regular expression \"{source}\": {error}"),
            )
        })?;
        constraints.push(Constraint::Pattern(CompiledPattern {
            regex,
            source: source.clone(),
        }));
    }
    Ok(())
}
