use std::borrow::Cow;
use std::str::Utf8Error;

#[inline(always)]
fn char_to_digit(c: u8) -> Option<u8> {
    char::from(c).to_digit(16).map(|d| d as u8)
}

/// Why a literal could not be percent-decoded.
#[derive(Debug, thiserror::Error)]
pub enum PercentError {
    #[error("malformed escape sequence at offset {0}: expected `%` followed by two hex digits")]
    InvalidEscape(usize),
    #[error("decoded bytes are not valid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),
}

impl PercentError {
    /// Offset of the failure relative to the start of the literal.
    pub fn offset(&self) -> usize {
        match self {
            PercentError::InvalidEscape(offset) => *offset,
            PercentError::InvalidUtf8(e) => e.valid_up_to(),
        }
    }
}

/// Percent-decodes a literal, the way URI component decoding does:
/// - `%XX` sequences are replaced by the byte they encode
/// - `+` is left untouched
/// - the result must be valid UTF-8
///
/// Unlike lenient form decoding, a `%` that is not followed by two hex
/// digits is an error rather than being passed through.
pub fn decode(input: &str) -> Result<Cow<'_, str>, PercentError> {
    let bytes = input.as_bytes();
    if !bytes.contains(&b'%') {
        return Ok(Cow::Borrowed(input));
    }

    let mut decoded = Vec::with_capacity(bytes.len());
    let mut last_segment = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] != b'%' {
            idx += 1;
            continue;
        }
        let h = bytes.get(idx + 1).copied().and_then(char_to_digit);
        let l = bytes.get(idx + 2).copied().and_then(char_to_digit);
        let (Some(h), Some(l)) = (h, l) else {
            return Err(PercentError::InvalidEscape(idx));
        };

        decoded.extend_from_slice(&bytes[last_segment..idx]);
        decoded.push(h * 0x10 + l);
        idx += 3;
        last_segment = idx;
    }

    decoded.extend_from_slice(&bytes[last_segment..]);
    match String::from_utf8(decoded) {
        Ok(s) => Ok(Cow::Owned(s)),
        Err(e) => Err(PercentError::InvalidUtf8(e.utf8_error())),
    }
}

#[cfg(test)]
mod test {
    use std::borrow::Cow;

    use super::{PercentError, decode};

    #[test]
    fn passes_through_plain_input() {
        assert!(matches!(decode("hello+world"), Ok(Cow::Borrowed("hello+world"))));
    }

    #[test]
    fn decodes_escapes() {
        assert_eq!(decode("a%20b%2Bc").unwrap(), "a b+c");
        assert_eq!(decode("%E2%9C%93").unwrap(), "\u{2713}");
        assert_eq!(decode("%5bx%5d").unwrap(), "[x]");
    }

    #[test]
    fn rejects_truncated_escape() {
        let err = decode("abc%2").unwrap_err();
        assert!(matches!(err, PercentError::InvalidEscape(3)), "got: {err}");
        assert_eq!(err.offset(), 3);
    }

    #[test]
    fn rejects_non_hex_escape() {
        assert!(matches!(decode("%zz"), Err(PercentError::InvalidEscape(0))));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = decode("ok%FF").unwrap_err();
        assert!(matches!(err, PercentError::InvalidUtf8(_)), "got: {err}");
        assert_eq!(err.offset(), 2);
    }
}
