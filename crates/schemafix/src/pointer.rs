//! JSON Pointer (RFC 6901) parsing and lookup.

use serde_json::Value;

/// Split a pointer into unescaped reference tokens.
///
/// The empty pointer addresses the whole document and yields no tokens.
pub(crate) fn parse(pointer: &str) -> Result<Vec<String>, String> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(format!("pointer \"{pointer}\" does not start with '/'"));
    };
    rest.split('/').map(unescape).collect()
}

fn unescape(token: &str) -> Result<String, String> {
    if !token.contains('~') {
        return Ok(token.to_string());
    }
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(ch) = chars.next() {
        if ch == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return Err(format!("invalid escape sequence in token \"{token}\"")),
            }
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

pub(crate) fn array_index(token: &str, len: usize) -> Option<usize> {
    // Leading zeros are not valid array indices per RFC 6901.
    if token == "0" {
        return (len > 0).then_some(0);
    }
    if token.starts_with('0') || token.is_empty() {
        return None;
    }
    token.parse::<usize>().ok().filter(|index| *index < len)
}

/// Resolve a token path against a document.
pub(crate) fn lookup<'a>(document: &'a Value, tokens: &[String]) -> Option<&'a Value> {
    let mut current = document;
    for token in tokens {
        current = match current {
            Value::Object(map) => map.get(token)?,
            Value::Array(items) => &items[array_index(token, items.len())?],
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::{lookup, parse};
    use serde_json::json;
    use test_case::test_case;

    #[test_case("", &[]; "root")]
    #[test_case("/a/b", &["a", "b"]; "plain")]
    #[test_case("/a~1b/c~0d", &["a/b", "c~d"]; "escaped")]
    #[test_case("/", &[""]; "empty token")]
    fn parse_tokens(pointer: &str, expected: &[&str]) {
        assert_eq!(parse(pointer).unwrap(), expected);
    }

    #[test]
    fn parse_rejects_missing_slash() {
        assert!(parse("a/b").is_err());
        assert!(parse("/a~2").is_err());
    }

    #[test]
    fn lookup_navigates_arrays_and_objects() {
        let doc = json!({"items": [{"name": "first"}, {"name": "second"}]});
        let tokens = parse("/items/1/name").unwrap();
        assert_eq!(lookup(&doc, &tokens), Some(&json!("second")));
        assert_eq!(lookup(&doc, &parse("/items/2").unwrap()), None);
        assert_eq!(lookup(&doc, &parse("/items/01").unwrap()), None);
    }
}
