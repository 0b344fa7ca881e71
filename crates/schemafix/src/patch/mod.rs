//! JSON Patch (RFC 6902) representation, application, and generation.

mod apply;
mod generate;

pub use apply::apply;
pub(crate) use generate::generate;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single RFC 6902 operation.
///
/// Serializes to the standard wire form, e.g.
/// `{"op": "add", "path": "/id", "value": 0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

impl PatchOperation {
    /// The target path of the operation.
    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Move { path, .. }
            | PatchOperation::Copy { path, .. }
            | PatchOperation::Test { path, .. } => path,
        }
    }
}

/// An ordered sequence of operations. Meaningful only when applied in order;
/// intermediate states are not validated.
pub type Patch = Vec<PatchOperation>;

#[cfg(test)]
mod tests {
    use super::PatchOperation;
    use serde_json::json;

    #[test]
    fn operations_use_rfc6902_wire_form() {
        let operations = vec![
            PatchOperation::Add {
                path: "/id".to_string(),
                value: json!(0),
            },
            PatchOperation::Move {
                from: "/old".to_string(),
                path: "/new".to_string(),
            },
        ];
        let serialized = serde_json::to_value(&operations).unwrap();
        assert_eq!(
            serialized,
            json!([
                {"op": "add", "path": "/id", "value": 0},
                {"op": "move", "from": "/old", "path": "/new"}
            ])
        );
        let roundtrip: Vec<PatchOperation> = serde_json::from_value(serialized).unwrap();
        assert_eq!(roundtrip, operations);
    }
}
