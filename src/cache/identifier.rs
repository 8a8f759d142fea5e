//! Cache Identifier Module
//!
//! Derives the map key of an entry from its cache key. String keys are used
//! verbatim; structured keys are written as a canonical query string:
//!
//! - object keys in sorted order, nested paths as `a[b][c]`
//! - arrays of scalars comma-joined (`ids=1,2,3`), a single element as `ids[]=1`
//! - arrays holding objects or arrays indexed (`rows[0][id]=1`)
//! - `null` as a bare key with no `=`
//!
//! Some distinct keys share an identifier and therefore an entry: `null` and
//! `""` inside a comma-joined array both write as an empty item
//! (`tags=,x`), and a one-element array matches an object keyed by the empty
//! string (`a[]=1`). Keep such shapes out of keys that must stay apart.
//!
//! Keys and values are form-urlencoded, so literal `[`, `]`, `,`, `&` and `=`
//! are always structural.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::form_urlencoded;

/// Identifier used when no cache key is given.
pub const UNKNOWN_CACHE_KEY: &str = "unknown-cacheKey";

// == Cache Key ==
/// Key a caller derives an entry from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheKey {
    /// Used as the identifier unchanged
    Plain(String),
    /// Canonically serialized into the identifier
    Structured(Value),
}

impl CacheKey {
    /// Returns false for a null structured key, which identifies nothing.
    pub fn is_usable(&self) -> bool {
        !matches!(self, CacheKey::Structured(Value::Null))
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        CacheKey::Plain(s.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        CacheKey::Plain(s)
    }
}

impl From<Value> for CacheKey {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => CacheKey::Plain(s),
            other => CacheKey::Structured(other),
        }
    }
}

// == Build ==
/// Builds the identifier for a cache key.
pub fn build_identifier(key: Option<&CacheKey>) -> String {
    match key {
        None | Some(CacheKey::Structured(Value::Null)) => UNKNOWN_CACHE_KEY.to_string(),
        Some(CacheKey::Plain(s)) => s.clone(),
        Some(CacheKey::Structured(value)) => stringify(value),
    }
}

/// Serializes a structured value into its canonical query string.
pub fn stringify(value: &Value) -> String {
    let mut pairs = Vec::new();
    match value {
        Value::Object(map) => {
            for (key, child) in sorted(map) {
                flatten(&encode(key), child, &mut pairs);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(&index.to_string(), child, &mut pairs);
            }
        }
        Value::Null => {}
        scalar => pairs.push(encode(&scalar_text(scalar))),
    }
    pairs.join("&")
}

fn flatten(prefix: &str, value: &Value, pairs: &mut Vec<String>) {
    match value {
        Value::Null => pairs.push(prefix.to_string()),
        Value::Object(map) => {
            for (key, child) in sorted(map) {
                flatten(&format!("{}[{}]", prefix, encode(key)), child, pairs);
            }
        }
        Value::Array(items) if items.iter().all(is_scalar) => match items.as_slice() {
            [] => {}
            [only] => pairs.push(format!("{}[]={}", prefix, encode(&scalar_text(only)))),
            _ => {
                let joined: Vec<String> = items.iter().map(|v| encode(&scalar_text(v))).collect();
                pairs.push(format!("{}={}", prefix, joined.join(",")));
            }
        },
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(&format!("{}[{}]", prefix, index), child, pairs);
            }
        }
        scalar => pairs.push(format!("{}={}", prefix, encode(&scalar_text(scalar)))),
    }
}

fn sorted(map: &Map<String, Value>) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn encode(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

fn decode(text: &str) -> String {
    // a single component holds no literal `&` or `=`, so it parses as one key
    form_urlencoded::parse(text.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_default()
}

// == Parse ==
/// Rebuilds the structure an identifier was serialized from.
///
/// Scalar leaves come back as strings. Objects whose keys are exactly
/// `0..n` come back as arrays.
pub fn parse_identifier(identifier: &str) -> Value {
    let mut root = Map::new();
    for pair in identifier.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = match pair.split_once('=') {
            Some((k, v)) => (k, Some(v)),
            None => (pair, None),
        };
        let (mut path, single) = split_path(raw_key);
        let leaf = match raw_value {
            None => Value::Null,
            Some(v) if single => Value::Array(vec![Value::String(decode(v))]),
            Some(v) if v.contains(',') => {
                Value::Array(v.split(',').map(|s| Value::String(decode(s))).collect())
            }
            Some(v) => Value::String(decode(v)),
        };
        let first = path.remove(0);
        insert(&mut root, first, &path, leaf);
    }
    arrays_from_indices(Value::Object(root))
}

/// Splits `a[b][c]` into `["a", "b", "c"]`; a trailing `[]` is reported separately.
fn split_path(raw_key: &str) -> (Vec<String>, bool) {
    let (head, rest) = match raw_key.find('[') {
        Some(pos) => raw_key.split_at(pos),
        None => (raw_key, ""),
    };
    let mut segments = vec![decode(head)];
    let mut single = false;
    for part in rest.split('[').skip(1) {
        let segment = part.strip_suffix(']').unwrap_or(part);
        if segment.is_empty() {
            single = true;
        } else {
            segments.push(decode(segment));
        }
    }
    (segments, single)
}

fn insert(map: &mut Map<String, Value>, key: String, rest: &[String], leaf: Value) {
    match rest.split_first() {
        None => {
            map.insert(key, leaf);
        }
        Some((next, tail)) => {
            let child = map
                .entry(key)
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(inner) = child {
                insert(inner, next.clone(), tail, leaf);
            }
        }
    }
}

fn arrays_from_indices(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let is_sequence = !map.is_empty()
                && (0..map.len()).all(|i| map.contains_key(&i.to_string()));
            if is_sequence {
                let mut map = map;
                let items = (0..map.len())
                    .filter_map(|i| map.remove(&i.to_string()))
                    .map(arrays_from_indices)
                    .collect();
                Value::Array(items)
            } else {
                Value::Object(
                    map.into_iter()
                        .map(|(k, v)| (k, arrays_from_indices(v)))
                        .collect(),
                )
            }
        }
        other => other,
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn structured(value: Value) -> String {
        build_identifier(Some(&CacheKey::Structured(value)))
    }

    #[test]
    fn test_plain_key_is_identity() {
        assert_eq!(build_identifier(Some(&"user.id=1".into())), "user.id=1");
        assert_eq!(build_identifier(Some(&"".into())), "");
    }

    #[test]
    fn test_missing_key_uses_sentinel() {
        assert_eq!(build_identifier(None), UNKNOWN_CACHE_KEY);
        assert_eq!(structured(Value::Null), UNKNOWN_CACHE_KEY);
    }

    #[test]
    fn test_key_order_irrelevant() {
        let a: Value = serde_json::from_str(r#"{"b":2,"a":{"y":1,"x":[1,2]}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a":{"x":[1,2],"y":1},"b":2}"#).unwrap();
        assert_eq!(structured(a), structured(b));
    }

    #[test]
    fn test_nested_layout() {
        let id = structured(json!({
            "url": "/user",
            "method": "GET",
            "page": { "offset": 0, "limit": 10 },
            "ids": [1, 2, 3],
            "tag": ["solo"],
            "filter": { "account": { "op": "neq", "value": "admin" } },
            "cursor": null
        }));
        assert_eq!(
            id,
            "cursor&filter[account][op]=neq&filter[account][value]=admin\
             &ids=1,2,3&method=GET&page[limit]=10&page[offset]=0&tag[]=solo&url=%2Fuser"
        );
    }

    #[test]
    fn test_values_with_separators_are_escaped() {
        let id = structured(json!({ "q": "a,b&c=d", "list": ["x,y", "z"] }));
        assert_eq!(id, "list=x%2Cy,z&q=a%2Cb%26c%3Dd");
        assert_eq!(
            parse_identifier(&id),
            json!({ "list": ["x,y", "z"], "q": "a,b&c=d" })
        );
    }

    #[test]
    fn test_arrays_of_objects_are_indexed() {
        let id = structured(json!({ "rows": [{ "id": 1 }, { "id": 2 }] }));
        assert_eq!(id, "rows[0][id]=1&rows[1][id]=2");
        assert_eq!(
            parse_identifier(&id),
            json!({ "rows": [{ "id": "1" }, { "id": "2" }] })
        );
    }

    #[test]
    fn test_parse_restores_shape() {
        let key = json!({
            "page": { "offset": 0, "limit": 10 },
            "ids": [1, 2],
            "tag": ["solo"],
            "cursor": null
        });
        assert_eq!(
            parse_identifier(&structured(key)),
            json!({
                "page": { "offset": "0", "limit": "10" },
                "ids": ["1", "2"],
                "tag": ["solo"],
                "cursor": null
            })
        );
    }

    #[test]
    fn test_top_level_array_and_scalar() {
        assert_eq!(structured(json!([1, 2])), "0=1&1=2");
        assert_eq!(parse_identifier("0=1&1=2"), json!(["1", "2"]));
        assert_eq!(structured(json!(42)), "42");
        assert_eq!(structured(json!(true)), "true");
    }

    #[test]
    fn test_string_value_becomes_plain_key() {
        assert_eq!(CacheKey::from(json!("abc")), CacheKey::Plain("abc".into()));
        assert!(!CacheKey::Structured(Value::Null).is_usable());
        assert!(CacheKey::from("").is_usable());
    }

    #[test]
    fn test_shapes_sharing_an_identifier() {
        assert_eq!(structured(json!({ "tags": [null, "x"] })), "tags=,x");
        assert_eq!(structured(json!({ "tags": ["", "x"] })), "tags=,x");
        assert_eq!(structured(json!({ "a": [1] })), "a[]=1");
        assert_eq!(structured(json!({ "a": { "": 1 } })), "a[]=1");
    }
}
