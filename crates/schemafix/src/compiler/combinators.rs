use serde_json::{Map, Value};

use crate::{
    error::{Error, SchemaError},
    paths::Location,
    schema::{Constraint, NodeId},
};

use super::Compiler;

pub(super) fn compile(
    compiler: &mut Compiler<'_>,
    object: &Map<String, Value>,
    location: &Location,
    constraints: &mut Vec<Constraint>,
) -> Result<(), Error> {
    let combinators = [
        ("allOf", Constraint::AllOf as fn(Vec<NodeId>) -> Constraint),
        ("anyOf", Constraint::AnyOf),
        ("oneOf", Constraint::OneOf),
    ];
    for (keyword, build) in combinators {
        if let Some(value) = object.get(keyword) {
            let children = match value {
                Value::Array(items) if !items.is_empty() => {
                    let base = location.join(keyword);
                    let mut children = Vec::with_capacity(items.len());
                    for (index, subschema) in items.iter().enumerate() {
                        children.push(compiler.compile_node(subschema, &base.join_index(index))?);
                    }
                    children
                }
                _ => {
                    return Err(SchemaError::new(
                        keyword,
                        location.join(keyword),
                        format!("{keyword} must be a non-empty array of schemas"),
                    )
                    .into())
                }
            };
            constraints.push(build(children));
        }
    }
    if let Some(subschema) = object.get("not") {
        let child = compiler.compile_node(subschema, &location.join("not"))?;
        constraints.push(Constraint::Not(child));
    }
    Ok(())
}
