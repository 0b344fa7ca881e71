use std::cmp::Ordering;

use num_cmp::NumCmp;
use serde_json::{Number, Value};

use crate::{
    error::{Error, RecursionLimitError, SchemaError, Violation, ViolationKind},
    paths::{LazyLocation, Location},
    registry::SchemaRegistry,
    schema::{CompiledSchema, Constraint, NodeId, RefTarget},
    types::JsonType,
};

/// Violation reporting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Short-circuit the whole traversal at the first violation.
    FailFast,
    /// Evaluate every independent branch; violations come out concatenated
    /// in document-traversal order (depth-first, then key/index order).
    CollectAll,
}

struct EvaluationContext<'a> {
    registry: Option<&'a SchemaRegistry>,
    /// Active `$ref` expansions on the call stack.
    depth: usize,
}

pub(crate) fn evaluate_root(
    schema: &CompiledSchema,
    registry: Option<&SchemaRegistry>,
    instance: &Value,
    mode: Mode,
) -> Result<Vec<Violation>, Error> {
    let mut ctx = EvaluationContext {
        registry,
        depth: 0,
    };
    let mut out = Vec::new();
    evaluate(
        schema,
        schema.root,
        instance,
        &LazyLocation::new(),
        mode,
        &mut ctx,
        &mut out,
    )?;
    Ok(out)
}

fn evaluate(
    schema: &CompiledSchema,
    node: NodeId,
    instance: &Value,
    path: &LazyLocation<'_, '_>,
    mode: Mode,
    ctx: &mut EvaluationContext<'_>,
    out: &mut Vec<Violation>,
) -> Result<(), Error> {
    for constraint in &schema.node(node).constraints {
        check(schema, node, constraint, instance, path, mode, ctx, out)?;
        if mode == Mode::FailFast && !out.is_empty() {
            return Ok(());
        }
    }
    Ok(())
}

fn is_valid(
    schema: &CompiledSchema,
    node: NodeId,
    instance: &Value,
    ctx: &mut EvaluationContext<'_>,
) -> Result<bool, Error> {
    let mut probe = Vec::new();
    evaluate(
        schema,
        node,
        instance,
        &LazyLocation::new(),
        Mode::FailFast,
        ctx,
        &mut probe,
    )?;
    Ok(probe.is_empty())
}

fn report(
    out: &mut Vec<Violation>,
    schema: &CompiledSchema,
    node: NodeId,
    keyword: &str,
    path: &LazyLocation<'_, '_>,
    kind: ViolationKind,
) {
    out.push(Violation::new(
        Location::from(path),
        schema.node(node).location.join(keyword),
        kind,
    ));
}

fn check(
    schema: &CompiledSchema,
    node: NodeId,
    constraint: &Constraint,
    instance: &Value,
    path: &LazyLocation<'_, '_>,
    mode: Mode,
    ctx: &mut EvaluationContext<'_>,
    out: &mut Vec<Violation>,
) -> Result<(), Error> {
    match constraint {
        Constraint::Type(expected) => {
            if !expected.matches(instance) {
                report(
                    out,
                    schema,
                    node,
                    "type",
                    path,
                    ViolationKind::Type {
                        expected: *expected,
                        actual: JsonType::of(instance),
                        default: schema.node(node).default.clone(),
                    },
                );
            }
        }
        Constraint::Enum(allowed) => {
            if !allowed.iter().any(|option| values_equal(instance, option)) {
                report(
                    out,
                    schema,
                    node,
                    "enum",
                    path,
                    ViolationKind::Enum {
                        allowed: allowed.clone(),
                    },
                );
            }
        }
        Constraint::Const(expected) => {
            if !values_equal(instance, expected) {
                report(
                    out,
                    schema,
                    node,
                    "const",
                    path,
                    ViolationKind::Const {
                        expected: expected.clone(),
                    },
                );
            }
        }
        Constraint::Minimum(limit) => {
            if let Value::Number(n) = instance {
                if compare(n, limit) == Ordering::Less {
                    report(
                        out,
                        schema,
                        node,
                        "minimum",
                        path,
                        ViolationKind::Minimum {
                            limit: limit.clone(),
                        },
                    );
                }
            }
        }
        Constraint::Maximum(limit) => {
            if let Value::Number(n) = instance {
                if compare(n, limit) == Ordering::Greater {
                    report(
                        out,
                        schema,
                        node,
                        "maximum",
                        path,
                        ViolationKind::Maximum {
                            limit: limit.clone(),
                        },
                    );
                }
            }
        }
        Constraint::ExclusiveMinimum(limit) => {
            if let Value::Number(n) = instance {
                if compare(n, limit) != Ordering::Greater {
                    report(
                        out,
                        schema,
                        node,
                        "exclusiveMinimum",
                        path,
                        ViolationKind::ExclusiveMinimum {
                            limit: limit.clone(),
                        },
                    );
                }
            }
        }
        Constraint::ExclusiveMaximum(limit) => {
            if let Value::Number(n) = instance {
                if compare(n, limit) != Ordering::Less {
                    report(
                        out,
                        schema,
                        node,
                        "exclusiveMaximum",
                        path,
                        ViolationKind::ExclusiveMaximum {
                            limit: limit.clone(),
                        },
                    );
                }
            }
        }
        Constraint::MultipleOf(factor) => {
            if let Value::Number(n) = instance {
                let value = n.as_f64().unwrap_or(f64::NAN);
                let ratio = value / factor;
                if (ratio - ratio.round()).abs() > 1e-9 {
                    report(
                        out,
                        schema,
                        node,
                        "multipleOf",
                        path,
                        ViolationKind::MultipleOf { factor: *factor },
                    );
                }
            }
        }
        Constraint::MinLength(limit) => {
            if let Value::String(item) = instance {
                let actual = item.chars().count() as u64;
                if actual < *limit {
                    report(
                        out,
                        schema,
                        node,
                        "minLength",
                        path,
                        ViolationKind::MinLength {
                            limit: *limit,
                            actual,
                        },
                    );
                }
            }
        }
        Constraint::MaxLength(limit) => {
            if let Value::String(item) = instance {
                let actual = item.chars().count() as u64;
                if actual > *limit {
                    report(
                        out,
                        schema,
                        node,
                        "maxLength",
                        path,
                        ViolationKind::MaxLength {
                            limit: *limit,
                            actual,
                        },
                    );
                }
            }
        }
        Constraint::Pattern(pattern) => {
            if let Value::String(item) = instance {
                if !pattern.regex.is_match(item).unwrap_or(false) {
                    report(
                        out,
                        schema,
                        node,
                        "pattern",
                        path,
                        ViolationKind::Pattern {
                            pattern: pattern.source.clone(),
                        },
                    );
                }
            }
        }
        Constraint::MinItems(limit) => {
            if let Value::Array(items) = instance {
                let actual = items.len() as u64;
                if actual < *limit {
                    report(
                        out,
                        schema,
                        node,
                        "minItems",
                        path,
                        ViolationKind::MinItems {
                            limit: *limit,
                            actual,
                            pad: items_default(schema, node),
                        },
                    );
                }
            }
        }
        Constraint::MaxItems(limit) => {
            if let Value::Array(items) = instance {
                let actual = items.len() as u64;
                if actual > *limit {
                    report(
                        out,
                        schema,
                        node,
                        "maxItems",
                        path,
                        ViolationKind::MaxItems {
                            limit: *limit,
                            actual,
                        },
                    );
                }
            }
        }
        Constraint::UniqueItems => {
            if let Value::Array(items) = instance {
                for index in 1..items.len() {
                    if items[..index]
                        .iter()
                        .any(|previous| values_equal(previous, &items[index]))
                    {
                        report(out, schema, node, "uniqueItems", path, ViolationKind::UniqueItems);
                        break;
                    }
                }
            }
        }
        Constraint::Items { schema: item_node, skip } => {
            if let Value::Array(items) = instance {
                for (index, item) in items.iter().enumerate().skip(*skip) {
                    let item_path = path.push_index(index);
                    evaluate(schema, *item_node, item, &item_path, mode, ctx, out)?;
                    if mode == Mode::FailFast && !out.is_empty() {
                        return Ok(());
                    }
                }
            }
        }
        Constraint::PrefixItems(children) => {
            if let Value::Array(items) = instance {
                for (index, (item, child)) in items.iter().zip(children).enumerate() {
                    let item_path = path.push_index(index);
                    evaluate(schema, *child, item, &item_path, mode, ctx, out)?;
                    if mode == Mode::FailFast && !out.is_empty() {
                        return Ok(());
                    }
                }
            }
        }
        Constraint::MinProperties(limit) => {
            if let Value::Object(map) = instance {
                let actual = map.len() as u64;
                if actual < *limit {
                    report(
                        out,
                        schema,
                        node,
                        "minProperties",
                        path,
                        ViolationKind::MinProperties {
                            limit: *limit,
                            actual,
                        },
                    );
                }
            }
        }
        Constraint::MaxProperties(limit) => {
            if let Value::Object(map) = instance {
                let actual = map.len() as u64;
                if actual > *limit {
                    report(
                        out,
                        schema,
                        node,
                        "maxProperties",
                        path,
                        ViolationKind::MaxProperties {
                            limit: *limit,
                            actual,
                        },
                    );
                }
            }
        }
        Constraint::Required(names) => {
            if let Value::Object(map) = instance {
                for name in names {
                    if !map.contains_key(name) {
                        report(
                            out,
                            schema,
                            node,
                            "required",
                            path,
                            ViolationKind::Required {
                                property: name.clone(),
                                default: property_default(schema, node, name),
                            },
                        );
                        if mode == Mode::FailFast {
                            return Ok(());
                        }
                    }
                }
            }
        }
        Constraint::Properties(properties) => {
            if let Value::Object(map) = instance {
                // Walk the document, not the schema, so collected violations
                // come out in the document's own key order.
                for (name, value) in map {
                    let Some((_, child)) = properties.iter().find(|(property, _)| property == name)
                    else {
                        continue;
                    };
                    let property_path = path.push(name);
                    evaluate(schema, *child, value, &property_path, mode, ctx, out)?;
                    if mode == Mode::FailFast && !out.is_empty() {
                        return Ok(());
                    }
                }
            }
        }
        Constraint::AdditionalProperties { known, schema: extra } => {
            if let Value::Object(map) = instance {
                for (name, value) in map {
                    if known.contains(name) {
                        continue;
                    }
                    let property_path = path.push(name);
                    match extra {
                        None => out.push(Violation::new(
                            Location::from(&property_path),
                            schema.node(node).location.join("additionalProperties"),
                            ViolationKind::AdditionalProperty {
                                property: name.clone(),
                            },
                        )),
                        Some(child) => {
                            evaluate(schema, *child, value, &property_path, mode, ctx, out)?;
                        }
                    }
                    if mode == Mode::FailFast && !out.is_empty() {
                        return Ok(());
                    }
                }
            }
        }
        Constraint::AllOf(children) => {
            for child in children {
                evaluate(schema, *child, instance, path, mode, ctx, out)?;
                if mode == Mode::FailFast && !out.is_empty() {
                    return Ok(());
                }
            }
        }
        Constraint::AnyOf(children) => {
            let mut matched = false;
            let mut best: Option<Vec<Violation>> = None;
            for child in children {
                let mut branch = Vec::new();
                evaluate(schema, *child, instance, path, Mode::CollectAll, ctx, &mut branch)?;
                if branch.is_empty() {
                    matched = true;
                    break;
                }
                // Keep the branch that came closest to matching as the
                // diagnostic, instead of flooding with every alternative.
                if best.as_ref().is_none_or(|current| branch.len() < current.len()) {
                    best = Some(branch);
                }
            }
            if !matched {
                report(
                    out,
                    schema,
                    node,
                    "anyOf",
                    path,
                    ViolationKind::AnyOf {
                        violations: best.unwrap_or_default(),
                    },
                );
            }
        }
        Constraint::OneOf(children) => {
            let mut matched = Vec::new();
            for (index, child) in children.iter().enumerate() {
                if is_valid(schema, *child, instance, ctx)? {
                    matched.push(index);
                }
            }
            match matched.len() {
                1 => {}
                0 => report(out, schema, node, "oneOf", path, ViolationKind::OneOfNone),
                _ => report(
                    out,
                    schema,
                    node,
                    "oneOf",
                    path,
                    ViolationKind::OneOfMultiple { matched },
                ),
            }
        }
        Constraint::Not(child) => {
            if is_valid(schema, *child, instance, ctx)? {
                report(out, schema, node, "not", path, ViolationKind::Not);
            }
        }
        Constraint::Ref(target) => {
            if ctx.depth >= schema.max_ref_depth {
                return Err(
                    RecursionLimitError::new(schema.max_ref_depth, Location::from(path)).into(),
                );
            }
            let (document, target_node) = resolve(schema, node, target, ctx)?;
            ctx.depth += 1;
            let result = evaluate(document, target_node, instance, path, mode, ctx, out);
            ctx.depth -= 1;
            result?;
        }
        Constraint::Never => {
            report(out, schema, node, "false", path, ViolationKind::Never);
        }
    }
    Ok(())
}

/// Resolve a symbolic reference through the anchor table or the registry.
fn resolve<'s>(
    schema: &'s CompiledSchema,
    node: NodeId,
    target: &RefTarget,
    ctx: &EvaluationContext<'s>,
) -> Result<(&'s CompiledSchema, NodeId), Error> {
    let document = match &target.uri {
        None => schema,
        Some(uri) if schema.base_uri.as_deref() == Some(uri.as_str()) => schema,
        Some(uri) => ctx
            .registry
            .and_then(|registry| registry.get(uri))
            .ok_or_else(|| {
                SchemaError::new(
                    "$ref",
                    schema.node(node).location.join("$ref"),
                    format!("unresolved external reference \"{}\"", target.source),
                )
            })?,
    };
    let target_node = document.resolve_anchor(&target.pointer).ok_or_else(|| {
        SchemaError::new(
            "$ref",
            schema.node(node).location.join("$ref"),
            format!("reference \"{}\" does not resolve to a schema", target.source),
        )
    })?;
    Ok((document, target_node))
}

fn items_default(schema: &CompiledSchema, node: NodeId) -> Option<Value> {
    schema.node(node).constraints.iter().find_map(|constraint| {
        if let Constraint::Items { schema: item_node, .. } = constraint {
            schema.node(*item_node).default.clone()
        } else {
            None
        }
    })
}

fn property_default(schema: &CompiledSchema, node: NodeId, name: &str) -> Option<Value> {
    schema.node(node).constraints.iter().find_map(|constraint| {
        if let Constraint::Properties(properties) = constraint {
            properties
                .iter()
                .find(|(property, _)| property == name)
                .and_then(|(_, child)| schema.node(*child).default.clone())
        } else {
            None
        }
    })
}

#[derive(Clone, Copy)]
enum Num {
    U(u64),
    I(i64),
    F(f64),
}

fn classify(n: &Number) -> Num {
    if let Some(value) = n.as_u64() {
        Num::U(value)
    } else if let Some(value) = n.as_i64() {
        Num::I(value)
    } else {
        Num::F(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Total comparison across the integer/float representations serde_json
/// distinguishes. JSON cannot encode NaN, so the fallback never fires.
fn compare(left: &Number, right: &Number) -> Ordering {
    let ordering = match (classify(left), classify(right)) {
        (Num::U(a), Num::U(b)) => a.num_cmp(b),
        (Num::U(a), Num::I(b)) => a.num_cmp(b),
        (Num::U(a), Num::F(b)) => a.num_cmp(b),
        (Num::I(a), Num::U(b)) => a.num_cmp(b),
        (Num::I(a), Num::I(b)) => a.num_cmp(b),
        (Num::I(a), Num::F(b)) => a.num_cmp(b),
        (Num::F(a), Num::U(b)) => a.num_cmp(b),
        (Num::F(a), Num::I(b)) => a.num_cmp(b),
        (Num::F(a), Num::F(b)) => a.num_cmp(b),
    };
    ordering.unwrap_or(Ordering::Equal)
}

/// Deep equality with numeric semantics: `1`, `1.0`, and `1u64` are the same
/// value regardless of how serde_json stored them.
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => compare(a, b) == Ordering::Equal,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use crate::{compile, options, Error, Mode, SchemaRegistry, ViolationKind};
    use serde_json::{json, Value};
    use test_case::test_case;

    fn violations(schema: &Value, instance: &Value, mode: Mode) -> Vec<crate::Violation> {
        compile(schema)
            .expect("schema should compile")
            .violations(instance, mode)
            .expect("no hard error expected")
    }

    #[test]
    fn object_with_required_id_accepts_conforming_document() {
        let schema = json!({
            "type": "object",
            "required": ["id"],
            "properties": {"id": {"type": "integer"}}
        });
        let compiled = compile(&schema).unwrap();
        assert!(compiled.validate(&json!({"id": 5}), Mode::CollectAll).is_ok());
    }

    #[test]
    fn missing_required_property_reports_single_violation_at_root() {
        let schema = json!({
            "type": "object",
            "required": ["id"],
            "properties": {"id": {"type": "integer"}}
        });
        let found = violations(&schema, &json!({"name": "x"}), Mode::CollectAll);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].instance_path().as_str(), "");
        assert_eq!(found[0].instance_path().to_string(), "/");
        assert_eq!(found[0].keyword(), "required");
        assert!(matches!(
            found[0].kind(),
            ViolationKind::Required { property, .. } if property == "id"
        ));
    }

    #[test]
    fn fail_fast_reports_at_most_one_violation() {
        let schema = json!({
            "type": "object",
            "required": ["a", "b"],
            "properties": {"c": {"type": "string"}}
        });
        let instance = json!({"c": 12});
        assert_eq!(violations(&schema, &instance, Mode::FailFast).len(), 1);
        assert_eq!(violations(&schema, &instance, Mode::CollectAll).len(), 3);
    }

    #[test]
    fn collect_all_orders_violations_by_traversal() {
        let schema = json!({
            "type": "object",
            "properties": {
                "first": {"type": "integer"},
                "second": {
                    "type": "array",
                    "items": {"type": "string"}
                }
            }
        });
        let instance = json!({"first": "no", "second": [1, "ok", 2]});
        let found = violations(&schema, &instance, Mode::CollectAll);
        let paths: Vec<_> = found
            .iter()
            .map(|violation| violation.instance_path().as_str().to_string())
            .collect();
        assert_eq!(paths, ["/first", "/second/0", "/second/2"]);
    }

    #[test_case(json!({"required": ["id"]}), json!(42); "required on non-object")]
    #[test_case(json!({"properties": {"a": {"type": "integer"}}}), json!("text"); "properties on non-object")]
    #[test_case(json!({"items": {"type": "integer"}}), json!({"a": 1}); "items on non-array")]
    #[test_case(json!({"minLength": 3}), json!(5); "minLength on non-string")]
    #[test_case(json!({"minimum": 3}), json!("low"); "minimum on non-number")]
    fn constraints_hold_vacuously_for_other_types(schema: Value, instance: Value) {
        assert!(violations(&schema, &instance, Mode::CollectAll).is_empty());
    }

    #[test_case(json!({"minimum": 2}), json!(3), true)]
    #[test_case(json!({"minimum": 2}), json!(2), true)]
    #[test_case(json!({"minimum": 2}), json!(1.5), false)]
    #[test_case(json!({"exclusiveMinimum": 2}), json!(2), false)]
    #[test_case(json!({"maximum": 2.5}), json!(2), true)]
    #[test_case(json!({"maximum": 2.5}), json!(3), false)]
    #[test_case(json!({"maximum": -1}), json!(0), false)]
    #[test_case(json!({"multipleOf": 0.5}), json!(2.5), true)]
    #[test_case(json!({"multipleOf": 3}), json!(10), false)]
    fn numeric_bounds(schema: Value, instance: Value, expected: bool) {
        assert_eq!(
            violations(&schema, &instance, Mode::CollectAll).is_empty(),
            expected
        );
    }

    #[test_case(json!({"pattern": "^ab+$"}), json!("abbb"), true)]
    #[test_case(json!({"pattern": "^ab+$"}), json!("ba"), false)]
    #[test_case(json!({"minLength": 2, "maxLength": 4}), json!("abc"), true)]
    #[test_case(json!({"maxLength": 2}), json!("abc"), false)]
    #[test_case(json!({"enum": [1, "two"]}), json!("two"), true)]
    #[test_case(json!({"enum": [1, "two"]}), json!(2), false)]
    #[test_case(json!({"const": {"a": 1}}), json!({"a": 1}), true)]
    #[test_case(json!({"const": {"a": 1}}), json!({"a": 2}), false)]
    #[test_case(json!({"const": 1}), json!(1.0), true; "const compares numerically")]
    #[test_case(json!({"const": {"a": [1]}}), json!({"a": [1.0]}), true; "const nests numeric equality")]
    #[test_case(json!({"enum": [1, "two"]}), json!(1.0), true; "enum compares numerically")]
    #[test_case(json!({"uniqueItems": true}), json!([1, 2, 3]), true)]
    #[test_case(json!({"uniqueItems": true}), json!([1, 2, 1]), false)]
    #[test_case(json!({"uniqueItems": true}), json!([1, 1.0]), false; "uniqueItems compares numerically")]
    fn leaf_checks(schema: Value, instance: Value, expected: bool) {
        assert_eq!(
            violations(&schema, &instance, Mode::CollectAll).is_empty(),
            expected
        );
    }

    #[test]
    fn collect_all_follows_document_key_order_not_schema_order() {
        let schema = json!({
            "properties": {
                "b": {"type": "integer"},
                "a": {"type": "integer"}
            }
        });
        let instance = json!({"a": "x", "b": "y"});
        let found = violations(&schema, &instance, Mode::CollectAll);
        let paths: Vec<_> = found
            .iter()
            .map(|violation| violation.instance_path().as_str().to_string())
            .collect();
        assert_eq!(paths, ["/a", "/b"]);
    }

    #[test]
    fn additional_properties_false_flags_extras() {
        let schema = json!({
            "properties": {"id": {"type": "integer"}},
            "additionalProperties": false
        });
        let found = violations(&schema, &json!({"id": 1, "extra": true}), Mode::CollectAll);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].instance_path().as_str(), "/extra");
        assert_eq!(found[0].keyword(), "additionalProperties");
    }

    #[test]
    fn additional_properties_schema_applies_to_unknown_keys() {
        let schema = json!({
            "properties": {"id": {"type": "integer"}},
            "additionalProperties": {"type": "string"}
        });
        let valid = json!({"id": 1, "note": "fine"});
        let invalid = json!({"id": 1, "note": 7});
        assert!(violations(&schema, &valid, Mode::CollectAll).is_empty());
        assert_eq!(violations(&schema, &invalid, Mode::CollectAll).len(), 1);
    }

    #[test]
    fn one_of_rejects_multiple_matching_alternatives() {
        let schema = json!({
            "oneOf": [
                {"type": "integer"},
                {"minimum": 0}
            ]
        });
        let found = violations(&schema, &json!(3), Mode::CollectAll);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].keyword(), "oneOf");
        assert!(found[0].to_string().contains("multiple alternatives matched"));
        assert!(matches!(
            found[0].kind(),
            ViolationKind::OneOfMultiple { matched } if matched == &[0, 1]
        ));
    }

    #[test]
    fn any_of_reports_best_diagnostic_branch() {
        let schema = json!({
            "anyOf": [
                {"type": "object", "required": ["a", "b", "c"]},
                {"type": "object", "required": ["z"]}
            ]
        });
        let found = violations(&schema, &json!({}), Mode::CollectAll);
        assert_eq!(found.len(), 1);
        let ViolationKind::AnyOf { violations: sub } = found[0].kind() else {
            panic!("expected an anyOf violation");
        };
        // The second branch is one missing property away, the first is three.
        assert_eq!(sub.len(), 1);
    }

    #[test]
    fn not_inverts_the_subschema() {
        let schema = json!({"not": {"type": "string"}});
        assert!(violations(&schema, &json!(1), Mode::CollectAll).is_empty());
        assert_eq!(violations(&schema, &json!("s"), Mode::CollectAll).len(), 1);
    }

    #[test]
    fn all_of_concatenates_branch_violations() {
        let schema = json!({
            "allOf": [
                {"minimum": 10},
                {"multipleOf": 3}
            ]
        });
        assert_eq!(violations(&schema, &json!(4), Mode::CollectAll).len(), 2);
        assert!(violations(&schema, &json!(12), Mode::CollectAll).is_empty());
    }

    #[test]
    fn recursive_ref_validates_finite_documents() {
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": {"type": "string"},
                "child": {"$ref": "#"}
            }
        });
        let compiled = compile(&schema).unwrap();
        let deep = json!({"name": "a", "child": {"name": "b", "child": {"name": "c"}}});
        assert!(compiled.validate(&deep, Mode::CollectAll).is_ok());

        let broken = json!({"name": "a", "child": {"child": {"name": "c"}}});
        let found = compiled.violations(&broken, Mode::CollectAll).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].instance_path().as_str(), "/child");
    }

    #[test]
    fn self_referential_schema_hits_recursion_limit() {
        let schema = json!({"$ref": "#"});
        let compiled = options().with_max_ref_depth(16).compile(&schema).unwrap();
        let result = compiled.validate(&json!(1), Mode::CollectAll);
        assert!(matches!(result, Err(Error::RecursionLimit(_))));
    }

    #[test]
    fn ref_into_definitions_resolves_lazily() {
        let schema = json!({
            "properties": {
                "user": {"$ref": "#/$defs/person"}
            },
            "$defs": {
                "person": {"type": "object", "required": ["name"]}
            }
        });
        let compiled = compile(&schema).unwrap();
        assert!(compiled.validate(&json!({"user": {"name": "x"}}), Mode::CollectAll).is_ok());
        let found = compiled
            .violations(&json!({"user": {}}), Mode::CollectAll)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].instance_path().as_str(), "/user");
    }

    #[test]
    fn external_ref_resolves_through_registry() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                "https://example.com/person.json",
                &json!({"type": "object", "required": ["name"]}),
            )
            .unwrap();
        let schema = json!({"$ref": "https://example.com/person.json#"});
        let compiled = compile(&schema).unwrap();
        assert!(compiled
            .validate_with(&registry, &json!({"name": "x"}), Mode::CollectAll)
            .is_ok());
        assert!(compiled
            .validate_with(&registry, &json!({}), Mode::CollectAll)
            .is_err());
    }

    #[test]
    fn external_ref_without_registry_is_a_schema_error() {
        let schema = json!({"$ref": "https://example.com/missing.json#"});
        let compiled = compile(&schema).unwrap();
        let result = compiled.validate(&json!({}), Mode::CollectAll);
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn tuple_items_check_positionally() {
        let schema = json!({
            "prefixItems": [{"type": "integer"}, {"type": "string"}],
            "items": {"type": "boolean"}
        });
        assert!(violations(&schema, &json!([1, "a", true, false]), Mode::CollectAll).is_empty());
        let found = violations(&schema, &json!([1, 2, "no"]), Mode::CollectAll);
        let paths: Vec<_> = found
            .iter()
            .map(|violation| violation.instance_path().as_str().to_string())
            .collect();
        assert_eq!(paths, ["/1", "/2"]);
    }

    #[test]
    fn false_schema_rejects_everything() {
        let compiled = compile(&json!(false)).unwrap();
        assert!(!compiled.is_valid(&json!(null)));
        let compiled = compile(&json!(true)).unwrap();
        assert!(compiled.is_valid(&json!({"anything": [1, 2, 3]})));
    }
}
