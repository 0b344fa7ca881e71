use serde_json::Value;

use crate::{
    error::{Error, PatchApplyError},
    pointer,
    validator::values_equal,
};

use super::PatchOperation;

/// Apply a patch to a document, strictly in sequence.
///
/// The input document is never mutated; operations build up a new tree. Any
/// failing operation (including a `test` mismatch) aborts the whole
/// application and the partial result is discarded.
pub fn apply(document: &Value, patch: &[PatchOperation]) -> Result<Value, Error> {
    let mut result = document.clone();
    for (index, operation) in patch.iter().enumerate() {
        let step = Step {
            index,
            path: operation.path(),
        };
        match operation {
            PatchOperation::Add { path, value } => add(&mut result, path, value.clone(), step)?,
            PatchOperation::Remove { path } => {
                remove(&mut result, path, step)?;
            }
            PatchOperation::Replace { path, value } => {
                replace(&mut result, path, value.clone(), step)?;
            }
            PatchOperation::Move { from, path } => {
                if path.starts_with(from.as_str()) && path[from.len()..].starts_with('/') {
                    return Err(step.fail("cannot move a value into its own child").into());
                }
                let value = remove(&mut result, from, step)?;
                add(&mut result, path, value, step)?;
            }
            PatchOperation::Copy { from, path } => {
                let value = get(&result, from, step)?.clone();
                add(&mut result, path, value, step)?;
            }
            PatchOperation::Test { path, value } => {
                let actual = get(&result, path, step)?;
                if !values_equal(actual, value) {
                    return Err(step
                        .fail(format!("test failed: expected {value}, found {actual}"))
                        .into());
                }
            }
        }
    }
    Ok(result)
}

#[derive(Clone, Copy)]
struct Step<'a> {
    index: usize,
    path: &'a str,
}

impl Step<'_> {
    fn fail(&self, message: impl Into<String>) -> PatchApplyError {
        PatchApplyError::new(self.index, self.path, message)
    }
}

fn tokens(pointer: &str, step: Step<'_>) -> Result<Vec<String>, PatchApplyError> {
    pointer::parse(pointer).map_err(|message| step.fail(message))
}

fn get<'a>(document: &'a Value, path: &str, step: Step<'_>) -> Result<&'a Value, PatchApplyError> {
    let tokens = tokens(path, step)?;
    pointer::lookup(document, &tokens)
        .ok_or_else(|| step.fail(format!("path \"{path}\" does not exist")))
}

fn navigate_mut<'a>(
    document: &'a mut Value,
    tokens: &[String],
    step: Step<'_>,
) -> Result<&'a mut Value, PatchApplyError> {
    let mut current = document;
    for token in tokens {
        current = match current {
            Value::Object(map) => map
                .get_mut(token)
                .ok_or_else(|| step.fail(format!("no member \"{token}\" along the path")))?,
            Value::Array(items) => {
                let len = items.len();
                let index = pointer::array_index(token, len)
                    .ok_or_else(|| step.fail(format!("invalid array index \"{token}\"")))?;
                &mut items[index]
            }
            _ => return Err(step.fail(format!("cannot traverse into a scalar at \"{token}\""))),
        };
    }
    Ok(current)
}

fn add(document: &mut Value, path: &str, value: Value, step: Step<'_>) -> Result<(), Error> {
    let tokens = tokens(path, step)?;
    let Some((last, parents)) = tokens.split_last() else {
        *document = value;
        return Ok(());
    };
    let parent = navigate_mut(document, parents, step)?;
    match parent {
        Value::Object(map) => {
            map.insert(last.clone(), value);
        }
        Value::Array(items) => {
            if last == "-" {
                items.push(value);
            } else {
                // Insertion may target one past the end, unlike lookup.
                let index = pointer::array_index(last, items.len() + 1)
                    .ok_or_else(|| step.fail(format!("invalid array index \"{last}\"")))?;
                items.insert(index, value);
            }
        }
        _ => return Err(step.fail("the parent of the target is not a container").into()),
    }
    Ok(())
}

fn remove(document: &mut Value, path: &str, step: Step<'_>) -> Result<Value, Error> {
    let tokens = tokens(path, step)?;
    let Some((last, parents)) = tokens.split_last() else {
        return Err(step.fail("cannot remove the whole document").into());
    };
    let parent = navigate_mut(document, parents, step)?;
    match parent {
        Value::Object(map) => map
            .shift_remove(last)
            .ok_or_else(|| step.fail(format!("path \"{path}\" does not exist")).into()),
        Value::Array(items) => {
            let index = pointer::array_index(last, items.len())
                .ok_or_else(|| step.fail(format!("path \"{path}\" does not exist")))?;
            Ok(items.remove(index))
        }
        _ => Err(step.fail("the parent of the target is not a container").into()),
    }
}

fn replace(document: &mut Value, path: &str, value: Value, step: Step<'_>) -> Result<(), Error> {
    let tokens = tokens(path, step)?;
    let target = navigate_mut(document, &tokens, step)?;
    *target = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::apply;
    use crate::{Error, PatchOperation};
    use serde_json::{json, Value};
    use test_case::test_case;

    fn run(document: Value, patch: Value) -> Result<Value, Error> {
        let patch: Vec<PatchOperation> = serde_json::from_value(patch).unwrap();
        apply(&document, &patch)
    }

    #[test_case(
        json!({"a": 1}),
        json!([{"op": "add", "path": "/b", "value": 2}]),
        json!({"a": 1, "b": 2});
        "add member"
    )]
    #[test_case(
        json!([1, 2]),
        json!([{"op": "add", "path": "/-", "value": 3}]),
        json!([1, 2, 3]);
        "append with dash"
    )]
    #[test_case(
        json!([1, 3]),
        json!([{"op": "add", "path": "/1", "value": 2}]),
        json!([1, 2, 3]);
        "insert shifts elements"
    )]
    #[test_case(
        json!({"a": 1, "b": 2}),
        json!([{"op": "remove", "path": "/a"}]),
        json!({"b": 2});
        "remove member"
    )]
    #[test_case(
        json!({"a": 1}),
        json!([{"op": "replace", "path": "/a", "value": "one"}]),
        json!({"a": "one"});
        "replace member"
    )]
    #[test_case(
        json!({"a": {"b": 1}}),
        json!([{"op": "move", "from": "/a/b", "path": "/c"}]),
        json!({"a": {}, "c": 1});
        "move member"
    )]
    #[test_case(
        json!({"a": 1}),
        json!([{"op": "copy", "from": "/a", "path": "/b"}]),
        json!({"a": 1, "b": 1});
        "copy member"
    )]
    #[test_case(
        json!({"a": 1}),
        json!([
            {"op": "test", "path": "/a", "value": 1},
            {"op": "replace", "path": "/a", "value": 2}
        ]),
        json!({"a": 2});
        "test then replace"
    )]
    #[test_case(
        json!({"a": 1}),
        json!([{"op": "add", "path": "", "value": [true]}]),
        json!([true]);
        "add at root replaces document"
    )]
    #[test_case(
        json!({"a": 1.0}),
        json!([
            {"op": "test", "path": "/a", "value": 1},
            {"op": "replace", "path": "/a", "value": 2}
        ]),
        json!({"a": 2});
        "test compares numbers numerically"
    )]
    fn successful_application(document: Value, patch: Value, expected: Value) {
        assert_eq!(run(document, patch).unwrap(), expected);
    }

    #[test]
    fn preserves_object_key_order() {
        let document = json!({"z": 1, "a": 2, "m": 3});
        let patched = run(
            document,
            json!([{"op": "remove", "path": "/a"}, {"op": "add", "path": "/b", "value": 4}]),
        )
        .unwrap();
        let keys: Vec<_> = patched.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "m", "b"]);
    }

    #[test]
    fn failed_test_aborts_and_leaves_input_untouched() {
        let document = json!({"a": 1});
        let patch: Vec<PatchOperation> = serde_json::from_value(json!([
            {"op": "replace", "path": "/a", "value": 2},
            {"op": "test", "path": "/a", "value": 99}
        ]))
        .unwrap();
        let result = apply(&document, &patch);
        assert!(matches!(result, Err(Error::PatchApply(_))));
        assert_eq!(document, json!({"a": 1}));
    }

    #[test_case(json!([{"op": "remove", "path": "/missing"}]); "remove missing")]
    #[test_case(json!([{"op": "replace", "path": "/missing", "value": 1}]); "replace missing")]
    #[test_case(json!([{"op": "copy", "from": "/missing", "path": "/b"}]); "copy from missing")]
    #[test_case(json!([{"op": "move", "from": "/a", "path": "/a/inner"}]); "move into own child")]
    #[test_case(json!([{"op": "add", "path": "/items/9", "value": 1}]); "index out of bounds")]
    fn failing_operations(patch: Value) {
        let document = json!({"a": {"x": 1}, "items": [1]});
        let result = run(document, patch);
        assert!(matches!(result, Err(Error::PatchApply(_))));
    }

    #[test]
    fn error_reports_operation_index_and_path() {
        let document = json!({});
        let result = run(
            document,
            json!([
                {"op": "add", "path": "/ok", "value": 1},
                {"op": "remove", "path": "/missing"}
            ]),
        );
        let Err(Error::PatchApply(error)) = result else {
            panic!("expected a patch apply error");
        };
        assert_eq!(error.operation_index(), 1);
        assert_eq!(error.path(), "/missing");
    }
}
