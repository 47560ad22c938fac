//! Header artifact encoding.
//!
//! The `.json` artifact is a single JSON object mapping each header name to
//! an array of its values, in first-seen order:
//!
//! ```json
//! {"Content-Type":["text/html"],"X-Tag":["a","b"]}
//! ```
//!
//! Names are grouped case-insensitively under the casing they first
//! appeared with. Decoding joins each array back into one comma-separated
//! value per name, so `["a","b"]` replays as the single header `X-Tag: a,b`.
//! A value that contained a literal comma is indistinguishable from two
//! values after a round trip; the flattening is deliberate and documented
//! on [`FsCacheMiddleware`](super::FsCacheMiddleware).

use serde_json::{Map, Value};

use crate::http::Headers;

/// Serializes response headers into the `.json` artifact bytes.
pub(crate) fn encode_headers(headers: &Headers) -> serde_json::Result<Vec<u8>> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (name, value) in headers.iter() {
        match grouped
            .iter_mut()
            .find(|(seen, _)| seen.eq_ignore_ascii_case(name))
        {
            Some((_, values)) => values.push(value.to_owned()),
            None => grouped.push((name.to_owned(), vec![value.to_owned()])),
        }
    }

    let mut object = Map::new();
    for (name, values) in grouped {
        let array = values.into_iter().map(Value::String).collect();
        object.insert(name, Value::Array(array));
    }
    serde_json::to_vec(&Value::Object(object))
}

/// Parses the `.json` artifact back into `(name, joined-value)` pairs.
///
/// Fails if the artifact is not a JSON object of string arrays; a damaged
/// artifact is a storage fault, not a cache miss.
pub(crate) fn decode_headers(bytes: &[u8]) -> serde_json::Result<Vec<(String, String)>> {
    let object: Map<String, Value> = serde_json::from_slice(bytes)?;
    let mut headers = Vec::with_capacity(object.len());
    for (name, value) in object {
        let values: Vec<String> = serde_json::from_value(value)?;
        headers.push((name, values.join(",")));
    }
    Ok(headers)
}
