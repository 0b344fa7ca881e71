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
    let mut prefix_len = 0;
    if let Some(value) = object.get("prefixItems") {
        let Value::Array(items) = value else {
            return Err(SchemaError::new(
                "prefixItems",
                location.join("prefixItems"),
                "prefixItems must be an array of schemas",
            )
            .into());
        };
        let children = compile_tuple(compiler, items, &location.join("prefixItems"))?;
        prefix_len = children.len();
        constraints.push(Constraint::PrefixItems(children));
    }
    if let Some(value) = object.get("items") {
        match value {
            // Draft-7 tuple form.
            Value::Array(items) if prefix_len == 0 => {
                let children = compile_tuple(compiler, items, &location.join("items"))?;
                prefix_len = children.len();
                constraints.push(Constraint::PrefixItems(children));
            }
            Value::Array(_) => {
                return Err(SchemaError::new(
                    "items",
                    location.join("items"),
                    "array-form items cannot be combined with prefixItems",
                )
                .into())
            }
            _ => {
                let schema = compiler.compile_node(value, &location.join("items"))?;
                constraints.push(Constraint::Items {
                    schema,
                    skip: prefix_len,
                });
            }
        }
    }
    if let Some(value) = object.get("minItems") {
        constraints.push(Constraint::MinItems(expect_u64("minItems", value, location)?));
    }
    if let Some(value) = object.get("maxItems") {
        constraints.push(Constraint::MaxItems(expect_u64("maxItems", value, location)?));
    }
    if let Some(value) = object.get("uniqueItems") {
        match value {
            Value::Bool(true) => constraints.push(Constraint::UniqueItems),
            Value::Bool(false) => {}
            _ => {
                return Err(SchemaError::new(
                    "uniqueItems",
                    location.join("uniqueItems"),
                    "uniqueItems must be a boolean",
                )
                .into())
            }
        }
    }
    Ok(())
}

fn compile_tuple(
    compiler: &mut Compiler<'_>,
    items: &[Value],
    base: &Location,
) -> Result<Vec<crate::schema::NodeId>, Error> {
    let mut children = Vec::with_capacity(items.len());
    for (index, subschema) in items.iter().enumerate() {
        children.push(compiler.compile_node(subschema, &base.join_index(index))?);
    }
    Ok(children)
}
