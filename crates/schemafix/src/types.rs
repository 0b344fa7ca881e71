use std::fmt;

use serde_json::Value;

/// The primitive JSON Schema types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    /// Map a `type` keyword value to a type, if it names one.
    pub(crate) fn from_keyword(keyword: &str) -> Option<JsonType> {
        match keyword {
            "null" => Some(JsonType::Null),
            "boolean" => Some(JsonType::Boolean),
            "integer" => Some(JsonType::Integer),
            "number" => Some(JsonType::Number),
            "string" => Some(JsonType::String),
            "array" => Some(JsonType::Array),
            "object" => Some(JsonType::Object),
            _ => None,
        }
    }

    /// The type of a JSON value. Integral numbers report as `Integer`.
    pub fn of(value: &Value) -> JsonType {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(n) => {
                if is_integral(n) {
                    JsonType::Integer
                } else {
                    JsonType::Number
                }
            }
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            JsonType::Null => 1,
            JsonType::Boolean => 1 << 1,
            JsonType::Integer => 1 << 2,
            JsonType::Number => 1 << 3,
            JsonType::String => 1 << 4,
            JsonType::Array => 1 << 5,
            JsonType::Object => 1 << 6,
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn is_integral(n: &serde_json::Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
}

/// A set of JSON types, as produced by the `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonTypeSet(u8);

const ALL_TYPES: [JsonType; 7] = [
    JsonType::Null,
    JsonType::Boolean,
    JsonType::Integer,
    JsonType::Number,
    JsonType::String,
    JsonType::Array,
    JsonType::Object,
];

impl JsonTypeSet {
    pub(crate) const fn empty() -> JsonTypeSet {
        JsonTypeSet(0)
    }

    #[must_use]
    pub(crate) const fn insert(self, ty: JsonType) -> JsonTypeSet {
        JsonTypeSet(self.0 | ty.bit())
    }

    pub fn contains(self, ty: JsonType) -> bool {
        self.0 & ty.bit() != 0
    }

    /// Whether a value's type is allowed by this set.
    ///
    /// `integer` accepts any number without a fractional part, including
    /// floats like `2.0`, matching JSON Schema semantics.
    pub fn matches(self, value: &Value) -> bool {
        match value {
            Value::Null => self.contains(JsonType::Null),
            Value::Bool(_) => self.contains(JsonType::Boolean),
            Value::Number(n) => {
                self.contains(JsonType::Number)
                    || (self.contains(JsonType::Integer) && is_integral(n))
            }
            Value::String(_) => self.contains(JsonType::String),
            Value::Array(_) => self.contains(JsonType::Array),
            Value::Object(_) => self.contains(JsonType::Object),
        }
    }

    fn iter(self) -> impl Iterator<Item = JsonType> {
        ALL_TYPES.into_iter().filter(move |ty| self.contains(*ty))
    }
}

impl fmt::Display for JsonTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types = self.iter();
        match (types.next(), types.next()) {
            (None, _) => f.write_str("nothing"),
            (Some(single), None) => single.fmt(f),
            (Some(first), Some(second)) => {
                write!(f, "[{first}, {second}")?;
                for ty in types {
                    write!(f, ", {ty}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonType, JsonTypeSet};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(json!(null), JsonType::Null)]
    #[test_case(json!(true), JsonType::Boolean)]
    #[test_case(json!(1), JsonType::Integer)]
    #[test_case(json!(2.0), JsonType::Integer)]
    #[test_case(json!(2.5), JsonType::Number)]
    #[test_case(json!("x"), JsonType::String)]
    #[test_case(json!([]), JsonType::Array)]
    #[test_case(json!({}), JsonType::Object)]
    fn type_of(value: Value, expected: JsonType) {
        assert_eq!(JsonType::of(&value), expected);
    }

    #[test_case(JsonType::Integer, json!(5), true)]
    #[test_case(JsonType::Integer, json!(5.0), true)]
    #[test_case(JsonType::Integer, json!(5.5), false)]
    #[test_case(JsonType::Number, json!(5), true)]
    #[test_case(JsonType::String, json!(5), false)]
    fn set_matches(ty: JsonType, value: Value, expected: bool) {
        let set = JsonTypeSet::empty().insert(ty);
        assert_eq!(set.matches(&value), expected);
    }

    #[test]
    fn display() {
        let set = JsonTypeSet::empty()
            .insert(JsonType::String)
            .insert(JsonType::Integer);
        assert_eq!(set.to_string(), "[integer, string]");
        assert_eq!(
            JsonTypeSet::empty().insert(JsonType::Null).to_string(),
            "null"
        );
    }
}
