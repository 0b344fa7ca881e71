use ahash::AHashSet;
use serde_json::{Map, Value};

use crate::{
    error::{Error, SchemaError},
    paths::Location,
    schema::Constraint,
};

use super::{expect_u64, Compiler};

pub(super) fn compile(
    compiler: &mut Compiler<'_>,
    object: &Map<String, Value>,
    location: &Location,
    constraints: &mut Vec<Constraint>,
) -> Result<(), Error> {
    let mut known = AHashSet::new();
    if let Some(value) = object.get("properties") {
        let Value::Object(map) = value else {
            return Err(SchemaError::new(
                "properties",
                location.join("properties"),
                "properties must be an object",
            )
            .into());
        };
        let base = location.join("properties");
        let mut properties = Vec::with_capacity(map.len());
        for (name, subschema) in map {
            known.insert(name.clone());
            properties.push((
                name.clone(),
                compiler.compile_node(subschema, &base.join(name))?,
            ));
        }
        constraints.push(Constraint::Properties(properties));
    }
    if let Some(value) = object.get("required") {
        let Value::Array(items) = value else {
            return Err(SchemaError::new(
                "required",
                location.join("required"),
                "required must be an array of strings",
            )
            .into());
        };
        let mut required = Vec::with_capacity(items.len());
        for item in items {
            let Value::String(name) = item else {
                return Err(SchemaError::new(
                    "required",
                    location.join("required"),
                    "required entries must be strings",
                )
                .into());
            };
            required.push(name.clone());
        }
        constraints.push(Constraint::Required(required));
    }
    match object.get("additionalProperties") {
        None | Some(Value::Bool(true)) => {}
        Some(Value::Bool(false)) => constraints.push(Constraint::AdditionalProperties {
            known,
            schema: None,
        }),
        Some(subschema) => {
            let schema = compiler.compile_node(subschema, &location.join("additionalProperties"))?;
            constraints.push(Constraint::AdditionalProperties {
                known,
                schema: Some(schema),
            });
        }
    }
    if let Some(value) = object.get("minProperties") {
        constraints.push(Constraint::MinProperties(expect_u64(
            "minProperties",
            value,
            location,
        )?));
    }
    if let Some(value) = object.get("maxProperties") {
        constraints.push(Constraint::MaxProperties(expect_u64(
            "maxProperties",
            value,
            location,
        )?));
    }
    Ok(())
}
