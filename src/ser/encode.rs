use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

/// The characters left alone by URI component encoding: ASCII
/// alphanumerics and `- _ . ! ~ * ' ( )`.
///
/// Everything querystring-specific (`&`, `=`, `[`, `]`, `;`, `+`, `%`) is
/// outside this list, so both keys and values can be written into any
/// position of a querystring without being mistaken for structure.
const URI_COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Encodes bytes for use as a querystring key segment or value.
///
/// `reserved` holds extra bytes that must be escaped even though URI
/// component encoding would keep them: a custom delimiter such as `.` or
/// `~` would otherwise split a value in two when decoded.
///
/// The function returns an iterator to avoid allocations when no encoding is needed.
pub fn encode<'a>(b: &'a [u8], reserved: &'a [u8]) -> impl Iterator<Item = Cow<'a, [u8]>> + 'a {
    percent_encoding::percent_encode(b, URI_COMPONENT_SET).map(move |s| {
        // escaped chunks are exactly `%XX`; only raw runs can hold reserved bytes
        if s.starts_with('%') || !s.bytes().any(|c| reserved.contains(&c)) {
            return Cow::Borrowed(s.as_bytes());
        }
        let mut escaped = Vec::with_capacity(s.len() + 4);
        for c in s.bytes() {
            if reserved.contains(&c) {
                escaped.extend_from_slice(&[b'%', HEX[(c >> 4) as usize], HEX[(c & 0xF) as usize]]);
            } else {
                escaped.push(c);
            }
        }
        Cow::Owned(escaped)
    })
}
