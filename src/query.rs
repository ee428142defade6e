//! The query and fragment codec.
//!
//! Every function here is a pure function of the current raw string and its
//! arguments. The entry list of a query is re-derived with [`EStr::pairs`]
//! each time and never stored.

use crate::{
    error::Error,
    pct_enc::{self, table::QUERY_DATA, EStr},
    space::SpaceEncoding,
};
use std::collections::HashMap;

/// Escapes a query value, writing spaces the `space` way.
///
/// The generic escaper writes a space as `'+'` and encodes a literal `'+'`,
/// so every `'+'` it produces can be rewritten safely.
pub(crate) fn encode_value(value: &str, space: SpaceEncoding) -> String {
    encode_value_bytes(value.as_bytes(), space)
}

fn encode_value_bytes(value: &[u8], space: SpaceEncoding) -> String {
    let escaped = pct_enc::encode_bytes(value, QUERY_DATA, SpaceEncoding::Plus);
    if space == SpaceEncoding::Plus {
        escaped
    } else {
        SpaceEncoding::Plus.transcode(&escaped, space).into_owned()
    }
}

/// Escapes a fragment, writing spaces the `space` way.
pub(crate) fn encode_fragment(fragment: &str, space: SpaceEncoding) -> String {
    let escaped = pct_enc::encode_fragment(fragment);
    SpaceEncoding::PercentTwenty
        .transcode(&escaped, space)
        .into_owned()
}

/// Trims a query key and checks that it is usable.
pub(crate) fn validate_key(key: &str) -> Result<&str, Error> {
    let key = key.trim();
    if key.is_empty() {
        Err(Error::KeyEmpty)
    } else if key.contains(' ') {
        Err(Error::KeyContainsSpace)
    } else {
        Ok(key)
    }
}

/// Appends an entry to a raw query.
///
/// The key must have passed [`validate_key`].
pub(crate) fn append(query: &mut String, key: &str, value: &str, space: SpaceEncoding) {
    if !query.is_empty() {
        query.push('&');
    }
    query.push_str(&pct_enc::encode_query(key));
    query.push('=');
    query.push_str(&encode_value(value, space));
}

/// Decodes and re-escapes every value of a raw query.
///
/// Keys are kept as found. A value that fails to decode is kept as found too.
/// Returns `None` if the query has no entries.
pub(crate) fn reescape(query: &str, space: SpaceEncoding) -> Option<String> {
    let mut buf = String::with_capacity(query.len());

    for (key, value) in EStr::new(query).pairs() {
        if !buf.is_empty() {
            buf.push('&');
        }
        buf.push_str(key.as_str());
        buf.push('=');

        match value.decode_query() {
            Ok(decoded) => buf.push_str(&encode_value_bytes(&decoded, space)),
            Err(e) => {
                tracing::trace!(
                    value = value.as_str(),
                    index = e.index(),
                    "keeping malformed query value as found"
                );
                buf.push_str(value.as_str());
            }
        }
    }

    (!buf.is_empty()).then_some(buf)
}

/// Checks whether a stored query key matches the requested one.
///
/// The stored key is compared decoded, or as found when it fails to decode.
fn key_matches(stored: &EStr, key: &str) -> bool {
    match stored.decode_query() {
        Ok(decoded) => *decoded == *key.as_bytes(),
        Err(_) => stored.as_str() == key,
    }
}

/// Removes every entry whose key matches `key`, keeping the others verbatim
/// and in order.
///
/// An empty `key` matches nothing. The query is returned untouched when
/// nothing matches.
pub(crate) fn remove_key(query: &str, key: &str) -> String {
    if key.is_empty() {
        return query.to_owned();
    }

    let mut buf = String::with_capacity(query.len());
    let mut removed = false;
    for segment in query.split('&').filter(|s| !s.is_empty()) {
        let stored = segment.split_once('=').map_or(segment, |(k, _)| k);
        if key_matches(EStr::new(stored), key) {
            removed = true;
            continue;
        }
        if !buf.is_empty() {
            buf.push('&');
        }
        buf.push_str(segment);
    }

    if removed {
        buf
    } else {
        query.to_owned()
    }
}

/// Decodes an entry into owned strings.
///
/// Returns `None` if either side fails to decode.
fn decode_pair(key: &EStr, value: &EStr) -> Option<(String, String)> {
    let key = key.decode_query().ok()?;
    let value = value.decode_query().ok()?;
    Some((
        pct_enc::into_string_lossy(key),
        pct_enc::into_string_lossy(value),
    ))
}

/// Returns the first decoded value for `key`.
pub(crate) fn value(query: &str, key: &str) -> Option<String> {
    EStr::new(query)
        .pairs()
        .filter_map(|(k, v)| decode_pair(k, v))
        .find_map(|(k, v)| (k == key).then_some(v))
}

/// Collects every decoded entry, values grouped by key in order.
pub(crate) fn values(query: &str) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for (k, v) in EStr::new(query)
        .pairs()
        .filter_map(|(k, v)| decode_pair(k, v))
    {
        map.entry(k).or_default().push(v);
    }
    map
}
