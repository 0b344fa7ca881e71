use ahash::{AHashMap, AHashSet};
use serde_json::{Number, Value};

use crate::{
    error::{Error, ValidationFailure, Violation},
    paths::Location,
    patch::{self, Patch},
    registry::SchemaRegistry,
    types::JsonTypeSet,
    validator::{self, Mode},
};

/// Index of a schema node within its [`CompiledSchema`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> NodeId {
        debug_assert!(index <= u32::MAX as usize);
        #[allow(clippy::cast_possible_truncation)]
        NodeId(index as u32)
    }

    pub(crate) fn get(self) -> usize {
        self.0 as usize
    }
}

/// One subschema: the constraints compiled from its keywords plus the
/// annotations patch generation cares about.
#[derive(Debug)]
pub(crate) struct SchemaNode {
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) location: Location,
    pub(crate) default: Option<Value>,
}

#[derive(Debug)]
pub(crate) struct CompiledPattern {
    pub(crate) regex: fancy_regex::Regex,
    pub(crate) source: String,
}

/// Symbolic `$ref` target. `uri == None` means the containing document.
///
/// Held as a logical key instead of an owning pointer so self- and mutually
/// recursive schemas compile without cyclic ownership; resolution happens at
/// validation time.
#[derive(Debug, Clone)]
pub(crate) struct RefTarget {
    pub(crate) uri: Option<String>,
    pub(crate) pointer: String,
    pub(crate) source: String,
}

/// One compiled keyword check. The keyword set is closed by the targeted
/// schema dialect, so dispatch is a plain `match` over this enum.
#[derive(Debug)]
pub(crate) enum Constraint {
    Type(JsonTypeSet),
    Enum(Vec<Value>),
    Const(Value),
    Minimum(Number),
    Maximum(Number),
    ExclusiveMinimum(Number),
    ExclusiveMaximum(Number),
    MultipleOf(f64),
    MinLength(u64),
    MaxLength(u64),
    Pattern(CompiledPattern),
    MinItems(u64),
    MaxItems(u64),
    UniqueItems,
    Items {
        schema: NodeId,
        /// Number of leading elements covered by `prefixItems` instead.
        skip: usize,
    },
    PrefixItems(Vec<NodeId>),
    MinProperties(u64),
    MaxProperties(u64),
    Required(Vec<String>),
    Properties(Vec<(String, NodeId)>),
    AdditionalProperties {
        known: AHashSet<String>,
        /// `None` forbids unknown properties (`additionalProperties: false`);
        /// otherwise unknown properties must match this subschema.
        schema: Option<NodeId>,
    },
    AllOf(Vec<NodeId>),
    AnyOf(Vec<NodeId>),
    OneOf(Vec<NodeId>),
    Not(NodeId),
    Ref(RefTarget),
    Never,
}

/// An immutable compiled schema.
///
/// All subschemas live in one arena and are addressed by `NodeId`; the
/// anchor table maps schema-document JSON Pointers to nodes for lazy `$ref`
/// resolution. Once built the value is never mutated, so it can be shared
/// across threads and validated against many documents concurrently.
#[derive(Debug)]
pub struct CompiledSchema {
    pub(crate) nodes: Vec<SchemaNode>,
    pub(crate) root: NodeId,
    pub(crate) anchors: AHashMap<String, NodeId>,
    pub(crate) base_uri: Option<String>,
    pub(crate) max_ref_depth: usize,
}

impl CompiledSchema {
    pub(crate) fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.get()]
    }

    pub(crate) fn resolve_anchor(&self, pointer: &str) -> Option<NodeId> {
        self.anchors.get(pointer).copied()
    }

    /// Validate a document, failing with [`Error::Validation`] on mismatch.
    pub fn validate(&self, instance: &Value, mode: Mode) -> Result<(), Error> {
        self.validate_inner(None, instance, mode)
    }

    /// Validate with external `$ref` targets resolved through a registry.
    pub fn validate_with(
        &self,
        registry: &SchemaRegistry,
        instance: &Value,
        mode: Mode,
    ) -> Result<(), Error> {
        self.validate_inner(Some(registry), instance, mode)
    }

    fn validate_inner(
        &self,
        registry: Option<&SchemaRegistry>,
        instance: &Value,
        mode: Mode,
    ) -> Result<(), Error> {
        let violations = validator::evaluate_root(self, registry, instance, mode)?;
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::new(violations).into())
        }
    }

    /// The ordered violation list, empty when the document conforms.
    ///
    /// Unlike [`validate`](Self::validate) this treats mismatches as an
    /// ordinary inspectable outcome; only hard errors (unresolved references,
    /// recursion limit) fail.
    pub fn violations(&self, instance: &Value, mode: Mode) -> Result<Vec<Violation>, Error> {
        validator::evaluate_root(self, None, instance, mode)
    }

    pub fn violations_with(
        &self,
        registry: &SchemaRegistry,
        instance: &Value,
        mode: Mode,
    ) -> Result<Vec<Violation>, Error> {
        validator::evaluate_root(self, Some(registry), instance, mode)
    }

    /// Whether the document conforms. Hard errors report as `false`.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.violations(instance, Mode::FailFast)
            .is_ok_and(|violations| violations.is_empty())
    }

    /// Compute the patch that brings `instance` into compliance.
    pub fn generate_patch(&self, instance: &Value) -> Result<Patch, Error> {
        patch::generate(self, None, instance)
    }

    pub fn generate_patch_with(
        &self,
        registry: &SchemaRegistry,
        instance: &Value,
    ) -> Result<Patch, Error> {
        patch::generate(self, Some(registry), instance)
    }

    /// Generate and apply the corrective patch, returning the new document.
    pub fn update(&self, instance: &Value) -> Result<Value, Error> {
        let operations = self.generate_patch(instance)?;
        patch::apply(instance, &operations)
    }

    pub fn update_with(
        &self,
        registry: &SchemaRegistry,
        instance: &Value,
    ) -> Result<Value, Error> {
        let operations = self.generate_patch_with(registry, instance)?;
        patch::apply(instance, &operations)
    }
}
