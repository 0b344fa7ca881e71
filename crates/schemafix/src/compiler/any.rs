use serde_json::{Map, Value};

use crate::{
    error::{Error, SchemaError},
    paths::Location,
    schema::Constraint,
    types::{JsonType, JsonTypeSet},
};

pub(super) fn compile(
    object: &Map<String, Value>,
    location: &Location,
    constraints: &mut Vec<Constraint>,
) -> Result<(), Error> {
    if let Some(value) = object.get("type") {
        constraints.push(Constraint::Type(compile_type(value, location)?));
    }
    if let Some(value) = object.get("enum") {
        match value {
            Value::Array(allowed) if !allowed.is_empty() => {
                constraints.push(Constraint::Enum(allowed.clone()));
            }
            _ => {
                return Err(SchemaError::new(
                    "enum",
                    location.join("enum"),
                    "enum must be a non-empty array",
                )
                .into())
            }
        }
    }
    if let Some(value) = object.get("const") {
        constraints.push(Constraint::Const(value.clone()));
    }
    Ok(())
}

fn compile_type(value: &Value, location: &Location) -> Result<JsonTypeSet, Error> {
    match value {
        Value::String(name) => Ok(JsonTypeSet::empty().insert(type_by_name(name, location)?)),
        Value::Array(names) => {
            let mut set = JsonTypeSet::empty();
            for name in names {
                let Value::String(name) = name else {
                    return Err(SchemaError::new(
                        "type",
                        location.join("type"),
                        "type entries must be strings",
                    )
                    .into());
                };
                set = set.insert(type_by_name(name, location)?);
            }
            Ok(set)
        }
        _ => Err(SchemaError::new(
            "type",
            location.join("type"),
            "type must be a string or an array of strings",
        )
        .into()),
    }
}

fn type_by_name(name: &str, location: &Location) -> Result<JsonType, Error> {
    JsonType::from_keyword(name).ok_or_else(|| {
        SchemaError::new(
            "type",
            location.join("type"),
            format!("unknown type \"{name}\""),
        )
        .into()
    })
}
