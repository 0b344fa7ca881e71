mod any;
mod array;
mod combinators;
mod numeric;
mod object;
mod string;

use ahash::AHashMap;
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use url::Url;

use crate::{
    error::{Error, SchemaError},
    paths::Location,
    schema::{CompiledSchema, Constraint, NodeId, RefTarget, SchemaNode},
};

pub(crate) const DEFAULT_MAX_REF_DEPTH: usize = 64;

/// Keywords recognized by the compiler; everything else is an annotation
/// that strict mode rejects.
const KNOWN_KEYWORDS: &[&str] = &[
    "$comment",
    "$defs",
    "$id",
    "$ref",
    "$schema",
    "additionalProperties",
    "allOf",
    "anyOf",
    "const",
    "default",
    "definitions",
    "description",
    "enum",
    "examples",
    "exclusiveMaximum",
    "exclusiveMinimum",
    "items",
    "maxItems",
    "maxLength",
    "maxProperties",
    "maximum",
    "minItems",
    "minLength",
    "minProperties",
    "minimum",
    "multipleOf",
    "not",
    "oneOf",
    "pattern",
    "prefixItems",
    "properties",
    "required",
    "title",
    "type",
    "uniqueItems",
];

/// Compilation configuration, following the builder idiom.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    base_uri: Option<Url>,
    strict: bool,
    max_ref_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> CompileOptions {
        CompileOptions {
            base_uri: None,
            strict: false,
            max_ref_depth: DEFAULT_MAX_REF_DEPTH,
        }
    }
}

impl CompileOptions {
    /// Base URI that relative `$ref` values are normalized against.
    pub fn with_base_uri(mut self, base_uri: &str) -> Result<CompileOptions, Error> {
        let url = Url::parse(base_uri).map_err(|error| {
            SchemaError::new(
                "$id",
                Location::new(),
                format!("invalid base URI \"{base_uri}\": {error}"),
            )
        })?;
        self.base_uri = Some(url);
        Ok(self)
    }

    /// Reject unrecognized keywords instead of ignoring them.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> CompileOptions {
        self.strict = strict;
        self
    }

    /// Maximum `$ref` resolution depth during a single validation.
    #[must_use]
    pub fn with_max_ref_depth(mut self, limit: usize) -> CompileOptions {
        self.max_ref_depth = limit;
        self
    }

    /// Compile a schema document into an immutable constraint arena.
    pub fn compile(&self, schema: &Value) -> Result<CompiledSchema, Error> {
        let mut compiler = Compiler {
            options: self,
            nodes: Vec::new(),
            anchors: AHashMap::new(),
        };
        let root = compiler.compile_node(schema, &Location::new())?;
        Ok(CompiledSchema {
            nodes: compiler.nodes,
            root,
            anchors: compiler.anchors,
            base_uri: self.base_uri.as_ref().map(|url| {
                let mut url = url.clone();
                url.set_fragment(None);
                url.to_string()
            }),
            max_ref_depth: self.max_ref_depth,
        })
    }
}

pub(crate) struct Compiler<'a> {
    options: &'a CompileOptions,
    nodes: Vec<SchemaNode>,
    anchors: AHashMap<String, NodeId>,
}

impl Compiler<'_> {
    pub(crate) fn compile_node(
        &mut self,
        schema: &Value,
        location: &Location,
    ) -> Result<NodeId, Error> {
        // Reserve the slot and register the anchor before compiling children
        // so self-referential layouts see the node.
        let id = self.reserve(location);
        match schema {
            Value::Bool(true) => Ok(id),
            Value::Bool(false) => {
                self.nodes[id.get()].constraints.push(Constraint::Never);
                Ok(id)
            }
            Value::Object(object) => {
                self.compile_object(id, object, location)?;
                Ok(id)
            }
            _ => Err(SchemaError::new(
                "schema",
                location.clone(),
                "a schema must be an object or a boolean",
            )
            .into()),
        }
    }

    fn reserve(&mut self, location: &Location) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(SchemaNode {
            constraints: Vec::new(),
            location: location.clone(),
            default: None,
        });
        self.anchors.insert(location.as_str().to_string(), id);
        id
    }

    fn compile_object(
        &mut self,
        id: NodeId,
        object: &Map<String, Value>,
        location: &Location,
    ) -> Result<(), Error> {
        if self.options.strict {
            for keyword in object.keys() {
                if !KNOWN_KEYWORDS.contains(&keyword.as_str()) {
                    return Err(SchemaError::new(
                        "unknown",
                        location.join(keyword),
                        format!("unrecognized keyword \"{keyword}\""),
                    )
                    .into());
                }
            }
        }

        let mut constraints = Vec::new();
        any::compile(object, location, &mut constraints)?;
        numeric::compile(object, location, &mut constraints)?;
        string::compile(object, location, &mut constraints)?;
        array::compile(self, object, location, &mut constraints)?;
        object::compile(self, object, location, &mut constraints)?;
        combinators::compile(self, object, location, &mut constraints)?;
        if let Some(reference) = object.get("$ref") {
            let target = self.compile_ref(reference, location)?;
            constraints.push(Constraint::Ref(target));
        }

        // `$defs` / `definitions` children carry no constraints of their own
        // but must be compiled so local references into them resolve.
        for keyword in ["$defs", "definitions"] {
            if let Some(Value::Object(definitions)) = object.get(keyword) {
                let base = location.join(keyword);
                for (name, subschema) in definitions {
                    self.compile_node(subschema, &base.join(name))?;
                }
            }
        }

        let node = &mut self.nodes[id.get()];
        node.constraints = constraints;
        node.default = object.get("default").cloned();
        Ok(())
    }

    fn compile_ref(&mut self, value: &Value, location: &Location) -> Result<RefTarget, Error> {
        let ref_location = || location.join("$ref");
        let Value::String(reference) = value else {
            return Err(SchemaError::new("$ref", ref_location(), "$ref must be a string").into());
        };
        let (uri_part, fragment) = match reference.split_once('#') {
            Some((uri, fragment)) => (uri, fragment),
            None => (reference.as_str(), ""),
        };
        let pointer = percent_decode_str(fragment)
            .decode_utf8()
            .map_err(|error| {
                SchemaError::new(
                    "$ref",
                    ref_location(),
                    format!("invalid percent-encoding in \"{reference}\": {error}"),
                )
            })?
            .into_owned();
        if !pointer.is_empty() && !pointer.starts_with('/') {
            return Err(SchemaError::new(
                "$ref",
                ref_location(),
                format!("unsupported anchor reference \"{reference}\""),
            )
            .into());
        }
        let uri = if uri_part.is_empty() {
            None
        } else if let Some(base) = &self.options.base_uri {
            let mut joined = base.join(uri_part).map_err(|error| {
                SchemaError::new(
                    "$ref",
                    ref_location(),
                    format!("cannot resolve \"{reference}\" against the base URI: {error}"),
                )
            })?;
            joined.set_fragment(None);
            Some(joined.to_string())
        } else {
            let mut url = Url::parse(uri_part).map_err(|_| {
                SchemaError::new(
                    "$ref",
                    ref_location(),
                    format!("relative reference \"{reference}\" requires a base_uri"),
                )
            })?;
            url.set_fragment(None);
            Some(url.to_string())
        };
        Ok(RefTarget {
            uri,
            pointer,
            source: reference.clone(),
        })
    }
}

pub(super) fn expect_u64(
    keyword: &'static str,
    value: &Value,
    location: &Location,
) -> Result<u64, Error> {
    if let Value::Number(n) = value {
        if let Some(limit) = n.as_u64() {
            return Ok(limit);
        }
        if let Some(float) = n.as_f64() {
            if float.fract() == 0.0 && float >= 0.0 {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                return Ok(float as u64);
            }
        }
    }
    Err(SchemaError::new(
        keyword,
        location.join(keyword),
        format!("{keyword} must be a non-negative integer"),
    )
    .into())
}
