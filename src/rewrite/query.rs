//! Query string codec.
//!
//! Works on bytes so an opaque credential survives untouched.
//!
//! - Parsing drops segments containing `;` and pairs with a malformed `%` escape.
//! - `+` decodes to a space and encodes back from one.
//! - Only `A-Z a-z 0-9 - _ . ~` stay bare; every other byte is `%XX`.

use percent_encoding::{percent_decode, percent_encode, AsciiSet, NON_ALPHANUMERIC};

const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A decoded `key=value` pair.
pub type Pair = (Vec<u8>, Vec<u8>);

/// Split and decode a raw query string.
pub fn parse(query: &str) -> Vec<Pair> {
    query
        .split('&')
        .filter(|segment| !segment.is_empty() && !segment.contains(';'))
        .filter_map(|segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            Some((unescape(key)?, unescape(value)?))
        })
        .collect()
}

/// Encode pairs in the order given.
pub fn encode(pairs: &[Pair]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", escape(key), escape(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse `query`, append `key=value`, and re-encode with keys sorted.
///
/// The sort is stable, so repeated keys keep their relative order and the
/// appended value is last under its key.
pub fn append_pair(query: Option<&str>, key: &str, value: &[u8]) -> String {
    let mut pairs = parse(query.unwrap_or_default());
    pairs.push((key.as_bytes().to_vec(), value.to_vec()));
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    encode(&pairs)
}

pub fn escape(bytes: &[u8]) -> String {
    bytes
        .split(|&b| b == b' ')
        .map(|part| percent_encode(part, QUERY_COMPONENT).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Decode one component. `None` when a `%` is not followed by two hex digits.
pub fn unescape(component: &str) -> Option<Vec<u8>> {
    let bytes = component.as_bytes();
    let malformed = bytes
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'%')
        .any(|(i, _)| {
            !bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
        });
    if malformed {
        return None;
    }

    let spaced = component.replace('+', " ");
    Some(percent_decode(spaced.as_bytes()).collect())
}
