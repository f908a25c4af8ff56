//! `application/x-www-form-urlencoded` decoding and request path decoding

use percent_encoding::{percent_decode, percent_decode_str};

use crate::error::WikiError;

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Whether a `Content-Type` value names a urlencoded form. A request
/// without a content type is read as one.
pub fn is_urlencoded(content_type: Option<&str>) -> bool {
    content_type.map_or(true, |ct| {
        ct.split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .eq_ignore_ascii_case(FORM_URLENCODED)
    })
}

/// Decode one form component to raw bytes: `+` is a space, `%XX` is a byte.
/// Bytes need not be valid UTF-8.
pub fn decode_component(raw: &[u8]) -> Result<Vec<u8>, WikiError> {
    check_escapes(raw)?;
    let spaced: Vec<u8> = raw
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    Ok(percent_decode(&spaced).collect())
}

/// Value of the first `name` field in a urlencoded form or query string
pub fn field(encoded: &[u8], name: &str) -> Result<Option<Vec<u8>>, WikiError> {
    for pair in encoded.split(|&b| b == b'&').filter(|p| !p.is_empty()) {
        let (key, value) = match pair.iter().position(|&b| b == b'=') {
            Some(at) => (&pair[..at], &pair[at + 1..]),
            None => (pair, &pair[pair.len()..]),
        };
        if decode_component(key)? == name.as_bytes() {
            return decode_component(value).map(Some);
        }
    }
    Ok(None)
}

/// Percent-decode a request path. `None` when the result is not UTF-8.
pub fn decode_path(path: &str) -> Option<String> {
    percent_decode_str(path)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}

/// Every `%` must start a two-digit hex escape
fn check_escapes(raw: &[u8]) -> Result<(), WikiError> {
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'%' {
            let escape = raw.get(i + 1..i + 3);
            if !escape.is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit)) {
                return Err(WikiError::Form(format!(
                    "invalid percent escape at byte {i}"
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}
