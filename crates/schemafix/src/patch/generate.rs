use serde_json::{Number, Value};

use crate::{
    error::{Error, PatchError, Violation, ViolationKind},
    pointer,
    registry::SchemaRegistry,
    schema::CompiledSchema,
    types::{JsonType, JsonTypeSet},
    validator::{self, Mode},
};

use super::{apply, Patch, PatchOperation};

/// Correction rounds before giving up on convergence.
const MAX_ROUNDS: usize = 8;

/// Derive the ordered operation sequence that brings `document` into
/// compliance with `schema`.
///
/// The validator's collect-all violation list is the work list; each
/// violation either maps to a correction through a fixed set of heuristics
/// or fails with [`PatchError`]. A correction can surface violations that
/// were vacuous on the original value (a coerced number now subject to a
/// bound, say), so the patched document is re-validated and further rounds
/// of corrections appended until it conforms. A successful result therefore
/// always applies to a conforming document; anything that cannot be fixed
/// fails with [`PatchError`] naming the surviving violation. A compliant
/// document yields an empty patch.
pub(crate) fn generate(
    schema: &CompiledSchema,
    registry: Option<&SchemaRegistry>,
    document: &Value,
) -> Result<Patch, Error> {
    let mut operations = Vec::new();
    let mut current = document.clone();
    for _ in 0..MAX_ROUNDS {
        let violations = validator::evaluate_root(schema, registry, &current, Mode::CollectAll)?;
        if violations.is_empty() {
            return Ok(operations);
        }
        let mut round = Vec::new();
        for violation in &violations {
            correct(violation, &current, &mut round)?;
        }
        current = apply(&current, &round)?;
        operations.extend(round);
    }
    let violations = validator::evaluate_root(schema, registry, &current, Mode::CollectAll)?;
    match violations.first() {
        None => Ok(operations),
        Some(violation) => Err(no_correction(violation, "corrections did not converge").into()),
    }
}

fn correct(
    violation: &Violation,
    document: &Value,
    operations: &mut Vec<PatchOperation>,
) -> Result<(), Error> {
    let path = violation.instance_path();
    match violation.kind() {
        ViolationKind::Required {
            property,
            default: Some(value),
        } => {
            operations.push(PatchOperation::Add {
                path: path.join(property).as_str().to_string(),
                value: value.clone(),
            });
            Ok(())
        }
        ViolationKind::Type {
            expected, default, ..
        } => {
            let value = coerce(violation, document, *expected, default.as_ref())?;
            operations.push(PatchOperation::Replace {
                path: path.as_str().to_string(),
                value,
            });
            Ok(())
        }
        ViolationKind::AdditionalProperty { .. } => {
            operations.push(PatchOperation::Remove {
                path: path.as_str().to_string(),
            });
            Ok(())
        }
        ViolationKind::MaxItems { limit, actual } => {
            // Remove from the end so earlier indices stay stable.
            for index in (*limit..*actual).rev() {
                #[allow(clippy::cast_possible_truncation)]
                operations.push(PatchOperation::Remove {
                    path: path.join_index(index as usize).as_str().to_string(),
                });
            }
            Ok(())
        }
        ViolationKind::MinItems {
            limit,
            actual,
            pad: Some(value),
        } => {
            let mut append = String::with_capacity(path.as_str().len() + 2);
            append.push_str(path.as_str());
            append.push_str("/-");
            for _ in *actual..*limit {
                operations.push(PatchOperation::Add {
                    path: append.clone(),
                    value: value.clone(),
                });
            }
            Ok(())
        }
        _ => Err(no_correction(violation, "no applicable correction heuristic").into()),
    }
}

/// Lossless coercions for type mismatches: numeric strings become numbers,
/// integral floats become integers, scalars become their string rendering,
/// and `null` takes the schema default when one is declared.
fn coerce(
    violation: &Violation,
    document: &Value,
    expected: JsonTypeSet,
    default: Option<&Value>,
) -> Result<Value, Error> {
    let current = value_at(violation, document)?;
    if let Value::Null = current {
        if let Some(value) = default {
            return Ok(value.clone());
        }
    }
    match current {
        Value::String(text) => {
            if expected.contains(JsonType::Integer) {
                if let Ok(int) = text.trim().parse::<i64>() {
                    return Ok(Value::Number(int.into()));
                }
            }
            if expected.contains(JsonType::Number) {
                if let Ok(float) = text.trim().parse::<f64>() {
                    if float.is_finite() {
                        if let Some(number) = Number::from_f64(float) {
                            return Ok(Value::Number(number));
                        }
                    }
                }
            }
            if expected.contains(JsonType::Boolean) {
                match text.as_str() {
                    "true" => return Ok(Value::Bool(true)),
                    "false" => return Ok(Value::Bool(false)),
                    _ => {}
                }
            }
        }
        Value::Number(number) => {
            if expected.contains(JsonType::String) {
                return Ok(Value::String(number.to_string()));
            }
        }
        Value::Bool(flag) => {
            if expected.contains(JsonType::String) {
                return Ok(Value::String(flag.to_string()));
            }
        }
        _ => {}
    }
    Err(no_correction(
        violation,
        format!(
            "no lossless coercion from {} to {expected}",
            JsonType::of(current)
        ),
    )
    .into())
}

fn value_at<'a>(violation: &Violation, document: &'a Value) -> Result<&'a Value, Error> {
    let tokens = pointer::parse(violation.instance_path().as_str())
        .map_err(|message| no_correction(violation, message))?;
    pointer::lookup(document, &tokens)
        .ok_or_else(|| no_correction(violation, "offending value vanished from the document").into())
}

fn no_correction(violation: &Violation, message: impl Into<String>) -> PatchError {
    PatchError::new(violation.keyword(), violation.instance_path().clone(), message)
}
