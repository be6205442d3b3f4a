use std::borrow::Borrow;

use serde_json::{Map, Value};
use url::form_urlencoded;

/// How a staged payload is written into the request.
///
/// On GET requests the payload always merges into the URL's query string and
/// the format is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    /// URL-encoded form data. No explicit Content-Type is set, the
    /// transport's default applies.
    Form,
    /// A JSON object body with explicit Content-Type and Content-Length
    /// header lines.
    Json,
}

impl Default for BodyFormat {
    fn default() -> BodyFormat {
        BodyFormat::Form
    }
}

/// The staged request payload: ordered key/value pairs plus the format they
/// are encoded with at dispatch. The same key may appear multiple times.
#[derive(Debug, Clone, Default)]
pub(crate) struct Payload {
    pairs: Vec<(String, String)>,
    format: BodyFormat,
}

impl Payload {
    pub fn new<P, K, V>(pairs: P, format: BodyFormat) -> Payload
    where
        P: IntoIterator,
        P::Item: Borrow<(K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        Payload {
            pairs: collect_pairs(pairs),
            format,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn format(&self) -> BodyFormat {
        self.format
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Serialize the pairs as `k=v&k2=v2` with percent-encoding. Repeated
    /// keys produce repeated `k=v` pairs.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    /// Serialize the pairs as a JSON object, preserving insertion order.
    /// Repeated keys fold into a single array value.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut map = Map::new();
        for (key, value) in &self.pairs {
            match map.get_mut(key.as_str()) {
                None => {
                    map.insert(key.clone(), Value::String(value.clone()));
                }
                Some(Value::Array(items)) => items.push(Value::String(value.clone())),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, Value::String(value.clone())]);
                }
            }
        }
        serde_json::to_string(&map)
    }
}

pub(crate) fn collect_pairs<P, K, V>(pairs: P) -> Vec<(String, String)>
where
    P: IntoIterator,
    P::Item: Borrow<(K, V)>,
    K: AsRef<str>,
    V: ToString,
{
    pairs
        .into_iter()
        .map(|pair| {
            let (key, value) = pair.borrow();
            (key.as_ref().to_owned(), value.to_string())
        })
        .collect()
}

/// Build a `k=v; k2=v2` cookie string with percent-encoded keys and values.
pub(crate) fn cookie_string(pairs: &[(String, String)]) -> String {
    let mut out = String::new();
    for (key, value) in pairs {
        if !out.is_empty() {
            out.push_str("; ");
        }
        out.extend(form_urlencoded::byte_serialize(key.as_bytes()));
        out.push('=');
        out.extend(form_urlencoded::byte_serialize(value.as_bytes()));
    }
    out
}
