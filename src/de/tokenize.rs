//! Splits a raw querystring into a flat stream of tokens.

use std::borrow::Cow;
use std::fmt;

use tracing::trace;

use super::decode::decode;
use crate::error::{Error, Result};

/// A single lexical unit of a querystring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// `=`
    Assign,
    /// `[`
    ArrayOpen,
    /// `]`
    ArrayClose,
    /// End of a delimiter-separated segment.
    Delimiter,
    /// Any run of characters that is not all digits, percent-decoded.
    StringLiteral(Cow<'a, str>),
    /// A run of ASCII digits.
    NumberLiteral(u64),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Assign => f.write_str("`=`"),
            Token::ArrayOpen => f.write_str("`[`"),
            Token::ArrayClose => f.write_str("`]`"),
            Token::Delimiter => f.write_str("delimiter"),
            Token::StringLiteral(s) => write!(f, "string \"{s}\""),
            Token::NumberLiteral(n) => write!(f, "number {n}"),
        }
    }
}

/// A token together with the byte offset where it starts in the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub token: Token<'a>,
    pub offset: usize,
}

/// Tokenizes `input`, splitting segments on `delimiter`.
///
/// Every segment is followed by a [`Token::Delimiter`], including an empty
/// trailing one, so `"a=1&"` ends with two delimiters.
pub fn tokenize<'a>(input: &'a str, delimiter: &str) -> Result<Vec<Lexeme<'a>>> {
    if delimiter.is_empty() {
        return Err(Error::InvalidConfig("delimiter must not be empty".into()));
    }

    let mut lexemes = Vec::with_capacity(input.len() / 2 + 1);
    let mut base = 0;
    for segment in input.split(delimiter) {
        tokenize_segment(segment, base, &mut lexemes)?;
        base += segment.len();
        lexemes.push(Lexeme {
            token: Token::Delimiter,
            offset: base,
        });
        base += delimiter.len();
    }

    trace!(tokens = lexemes.len(), "tokenized querystring");
    Ok(lexemes)
}

fn tokenize_segment<'a>(segment: &'a str, base: usize, out: &mut Vec<Lexeme<'a>>) -> Result<()> {
    let mut literal_start = None;

    for (idx, byte) in segment.bytes().enumerate() {
        let token = match byte {
            b'=' => Token::Assign,
            b'[' => Token::ArrayOpen,
            b']' => Token::ArrayClose,
            _ => {
                literal_start.get_or_insert(idx);
                continue;
            }
        };
        if let Some(start) = literal_start.take() {
            out.push(literal(&segment[start..idx], base + start)?);
        }
        out.push(Lexeme {
            token,
            offset: base + idx,
        });
    }

    if let Some(start) = literal_start {
        out.push(literal(&segment[start..], base + start)?);
    }
    Ok(())
}

fn literal(text: &str, offset: usize) -> Result<Lexeme<'_>> {
    if text.bytes().all(|b| b.is_ascii_digit()) {
        // runs that overflow a u64 fall through to the string case
        if let Ok(n) = text.parse::<u64>() {
            return Ok(Lexeme {
                token: Token::NumberLiteral(n),
                offset,
            });
        }
    }

    let decoded = decode(text).map_err(|e| {
        let position = offset + e.offset();
        Error::decode_err(e, position)
    })?;
    Ok(Lexeme {
        token: Token::StringLiteral(decoded),
        offset,
    })
}

#[cfg(test)]
mod test {
    use std::borrow::Cow;

    use super::{Token, tokenize};
    use crate::error::Error;

    use pretty_assertions::assert_eq;

    fn tokens(input: &str, delimiter: &str) -> Vec<Token<'static>> {
        tokenize(input, delimiter)
            .unwrap()
            .into_iter()
            .map(|l| match l.token {
                Token::StringLiteral(s) => Token::StringLiteral(Cow::Owned(s.into_owned())),
                Token::Assign => Token::Assign,
                Token::ArrayOpen => Token::ArrayOpen,
                Token::ArrayClose => Token::ArrayClose,
                Token::Delimiter => Token::Delimiter,
                Token::NumberLiteral(n) => Token::NumberLiteral(n),
            })
            .collect()
    }

    fn s(text: &str) -> Token<'static> {
        Token::StringLiteral(Cow::Owned(text.to_string()))
    }

    #[test]
    fn tokenize_pairs() {
        assert_eq!(
            tokens("a=1&b=x", "&"),
            vec![
                s("a"),
                Token::Assign,
                Token::NumberLiteral(1),
                Token::Delimiter,
                s("b"),
                Token::Assign,
                s("x"),
                Token::Delimiter,
            ]
        );
    }

    #[test]
    fn tokenize_trailing_delimiter() {
        assert_eq!(
            tokens("a=1&", "&"),
            vec![
                s("a"),
                Token::Assign,
                Token::NumberLiteral(1),
                Token::Delimiter,
                Token::Delimiter,
            ]
        );
        assert_eq!(tokens("", "&"), vec![Token::Delimiter]);
    }

    #[test]
    fn tokenize_brackets() {
        assert_eq!(
            tokens("a[0][b]=c%20d", "&"),
            vec![
                s("a"),
                Token::ArrayOpen,
                Token::NumberLiteral(0),
                Token::ArrayClose,
                Token::ArrayOpen,
                s("b"),
                Token::ArrayClose,
                Token::Assign,
                s("c d"),
                Token::Delimiter,
            ]
        );
    }

    #[test]
    fn tokenize_custom_delimiter() {
        assert_eq!(
            tokens("a;b&c", ";"),
            vec![s("a"), Token::Delimiter, s("b&c"), Token::Delimiter]
        );
        assert_eq!(
            tokens("a||b", "||"),
            vec![s("a"), Token::Delimiter, s("b"), Token::Delimiter]
        );
    }

    #[test]
    fn oversized_digit_runs_stay_strings() {
        assert_eq!(
            tokens("99999999999999999999999", "&"),
            vec![s("99999999999999999999999"), Token::Delimiter]
        );
    }

    #[test]
    fn offsets_track_the_input() {
        let lexemes = tokenize("ab=1;c[d]", ";").unwrap();
        let offsets: Vec<usize> = lexemes.iter().map(|l| l.offset).collect();
        assert_eq!(offsets, vec![0, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn malformed_escape_is_a_decode_error() {
        let err = tokenize("a=1&b=%G1", "&").unwrap_err();
        assert!(
            matches!(err, Error::Decode { position: 6, .. }),
            "got: {err}"
        );
    }

    #[test]
    fn empty_delimiter_is_rejected() {
        assert!(matches!(tokenize("a", ""), Err(Error::InvalidConfig(_))));
    }
}
