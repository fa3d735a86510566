//! Loader key derivation
//!
//! A [`LoaderKey`] identifies one logical fetch. Two invocations producing
//! equal keys inside the same caching scope share a single upstream call.

use std::fmt;

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::api::{AccessToken, HttpMethod};

/// Call parameters, merged into the query string or request body
pub type Params = Map<String, Value>;

/// Build [`Params`] from a JSON object; any other value yields no params
pub fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

/// Merge per-call params over creation-time params
///
/// Per-call values win on key conflicts.
pub fn merge_params(base: &Params, overrides: Params) -> Params {
    let mut merged = base.clone();
    merged.extend(overrides);
    merged
}

/// Encode params as an `application/x-www-form-urlencoded` query string
///
/// Arrays become repeated `key[]=value` pairs, `null` an empty value and
/// nested objects their compact JSON text. Keys are emitted in sorted order
/// whatever the map's iteration order is.
pub fn encode_query(params: &Params) -> String {
    let mut entries: Vec<(&String, &Value)> = params.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in entries {
        match value {
            Value::Array(items) => {
                let array_name = format!("{}[]", name);
                for item in items {
                    serializer.append_pair(&array_name, &scalar_text(item));
                }
            }
            other => {
                serializer.append_pair(name, &scalar_text(other));
            }
        }
    }
    serializer.finish()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Append an encoded query string to a path
pub fn path_with_query(path: &str, params: &Params) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    format!("{}?{}", path, encode_query(params))
}

/// Deterministic identity of one logical fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoaderKey(String);

impl LoaderKey {
    /// Derive the key for a call
    ///
    /// GET keys keep the `backend:path?query` form so they double as shared
    /// cache keys; other methods are prefixed with the method name. An
    /// authenticated principal is appended as a token fingerprint.
    pub fn new(
        backend: &str,
        method: HttpMethod,
        path: &str,
        params: &Params,
        principal: Option<&AccessToken>,
    ) -> Self {
        let mut key = String::with_capacity(backend.len() + path.len() + 80);
        key.push_str(backend);
        key.push(':');
        if method != HttpMethod::Get {
            key.push_str(method.as_str());
            key.push(' ');
        }
        key.push_str(&path_with_query(path, params));
        if let Some(token) = principal {
            key.push_str("#principal=");
            key.push_str(&token.fingerprint());
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoaderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
