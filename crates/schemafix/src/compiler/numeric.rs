use serde_json::{Map, Number, Value};

use crate::{
    error::{Error, SchemaError},
    paths::Location,
    schema::Constraint,
};

pub(super) fn compile(
    object: &Map<String, Value>,
    location: &Location,
    constraints: &mut Vec<Constraint>,
) -> Result<(), Error> {
    let bounds = [
        ("minimum", Constraint::Minimum as fn(Number) -> Constraint),
        ("maximum", Constraint::Maximum),
        ("exclusiveMinimum", Constraint::ExclusiveMinimum),
        ("exclusiveMaximum", Constraint::ExclusiveMaximum),
    ];
    for (keyword, build) in bounds {
        if let Some(value) = object.get(keyword) {
            let Value::Number(limit) = value else {
                return Err(SchemaError::new(
                    keyword,
                    location.join(keyword),
                    format!("{keyword} must be a number"),
                )
                .into());
            };
            constraints.push(build(limit.clone()));
        }
    }
    if let Some(value) = object.get("multipleOf") {
        let factor = match value {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            _ => 0.0,
        };
        if factor <= 0.0 {
            return Err(SchemaError::new(
                "multipleOf",
                location.join("multipleOf"),
                "multipleOf must be a positive number",
            )
            .into());
        }
        constraints.push(Constraint::MultipleOf(factor));
    }
    Ok(())
}
