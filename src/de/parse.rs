use std::fmt;
use std::ops::BitOr;

use tracing::{debug, trace};

use super::tokenize::{Lexeme, Token, tokenize};
use crate::Config;
use crate::error::{Error, Result};
use crate::value::{Map, Number, Value};

/// Decodes `query` into a map, splitting segments on the configured
/// delimiter.
pub fn parse(query: &str, config: &Config) -> Result<Map> {
    config.validate()?;
    let lexemes = tokenize(query, &config.delimiter)?;
    debug!(
        len = query.len(),
        delimiter = %config.delimiter,
        tokens = lexemes.len(),
        "decoding querystring"
    );

    let mut parser = Parser::new(&lexemes, query.len(), config);
    let mut output = Map::new();
    parser.parse(&mut output)?;

    Ok(output)
}

/// A set of token kinds acceptable at some point in the grammar.
#[derive(Clone, Copy, PartialEq, Eq)]
struct TokenMask(u8);

impl TokenMask {
    const ARRAY_OPEN: Self = Self(1);
    const ASSIGN: Self = Self(1 << 1);
    const DELIMITER: Self = Self(1 << 2);
    const ARRAY_CLOSE: Self = Self(1 << 3);
    const NUMBER: Self = Self(1 << 4);
    const STRING: Self = Self(1 << 5);

    /// What may follow a key or an access expression.
    const CONTINUATION: Self = Self(Self::ARRAY_OPEN.0 | Self::ASSIGN.0 | Self::DELIMITER.0);
    /// What may follow `[`.
    const ACCESS: Self = Self(Self::ARRAY_CLOSE.0 | Self::NUMBER.0 | Self::STRING.0);
    /// What may follow `=`.
    const VALUE: Self = Self(Self::DELIMITER.0 | Self::NUMBER.0 | Self::STRING.0);

    fn of(token: &Token<'_>) -> Self {
        match token {
            Token::ArrayOpen => Self::ARRAY_OPEN,
            Token::Assign => Self::ASSIGN,
            Token::Delimiter => Self::DELIMITER,
            Token::ArrayClose => Self::ARRAY_CLOSE,
            Token::NumberLiteral(_) => Self::NUMBER,
            Token::StringLiteral(_) => Self::STRING,
        }
    }

    fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TokenMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for TokenMask {
    /// Lists the members, e.g. "`[`, `=` or delimiter".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(TokenMask, &str); 6] = [
            (TokenMask::ARRAY_OPEN, "`[`"),
            (TokenMask::ASSIGN, "`=`"),
            (TokenMask::DELIMITER, "delimiter"),
            (TokenMask::ARRAY_CLOSE, "`]`"),
            (TokenMask::NUMBER, "a number"),
            (TokenMask::STRING, "a string"),
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(mask, _)| self.contains(*mask))
            .map(|(_, name)| *name)
            .collect();
        match names.split_last() {
            None => Ok(()),
            Some((last, [])) => f.write_str(last),
            Some((last, rest)) => write!(f, "{} or {last}", rest.join(", ")),
        }
    }
}

/// Recursive-descent parser over a tokenized querystring.
///
/// Tokens are consumed by advancing `cursor`; the token slice itself is
/// never modified. Decisions about container kinds are made with at most
/// two tokens of lookahead.
struct Parser<'t, 'a> {
    lexemes: &'t [Lexeme<'a>],
    cursor: usize,
    /// Position reported for errors at the end of input.
    end: usize,
    max_depth: usize,
    array_limit: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(lexemes: &'t [Lexeme<'a>], end: usize, config: &Config) -> Self {
        Parser {
            lexemes,
            cursor: 0,
            end,
            max_depth: config.max_depth,
            array_limit: config.array_limit,
        }
    }

    fn peek_nth(&self, n: usize) -> Option<&'t Lexeme<'a>> {
        let lexemes: &'t [Lexeme<'a>] = self.lexemes;
        lexemes.get(self.cursor + n)
    }

    fn peek(&self) -> Option<&'t Lexeme<'a>> {
        self.peek_nth(0)
    }

    fn position(&self, lexeme: Option<&Lexeme<'_>>) -> usize {
        lexeme.map_or(self.end, |l| l.offset)
    }

    fn unexpected(&self, found: Option<&Lexeme<'_>>, expected: impl fmt::Display) -> Error {
        let position = self.position(found);
        match found {
            Some(lexeme) => Error::parse_err(
                format!("unexpected token {}, expected {expected}", lexeme.token),
                position,
            ),
            None => Error::parse_err(
                format!("unexpected end of input, expected {expected}"),
                position,
            ),
        }
    }

    /// Consumes the next token if its kind is in `mask`.
    fn expect(&mut self, mask: TokenMask) -> Result<&'t Lexeme<'a>> {
        match self.peek() {
            Some(lexeme) if mask.contains(TokenMask::of(&lexeme.token)) => {
                self.cursor += 1;
                Ok(lexeme)
            }
            other => Err(self.unexpected(other, mask)),
        }
    }

    /// Main parsing loop: one top-level key per segment.
    fn parse(&mut self, root: &mut Map) -> Result<()> {
        while let Some(lexeme) = self.peek() {
            let key = match &lexeme.token {
                // empty segment, e.g. `a=1&&b=2` or a trailing `&`
                Token::Delimiter => {
                    self.cursor += 1;
                    continue;
                }
                Token::StringLiteral(s) => s.to_string(),
                // the top level is always a map, so numeric keys are just names
                Token::NumberLiteral(n) => n.to_string(),
                _ => return Err(self.unexpected(Some(lexeme), "a string key")),
            };
            self.cursor += 1;

            trace!(%key, "collecting top-level key");
            let slot = root.entry(key).or_insert(Value::Null);
            self.collect(slot, 0)?;
        }
        debug!(keys = root.len(), "decoded querystring");
        Ok(())
    }

    /// Picks the container for a fresh slot by looking past the next `[`.
    ///
    /// `[]` and `[n]` start a sequence, `[name]` starts a map. Anything that
    /// is not an access expression leaves the slot as a scalar placeholder.
    fn init(&self) -> Result<Value> {
        let Some(Lexeme {
            token: Token::ArrayOpen,
            ..
        }) = self.peek()
        else {
            return Ok(Value::Null);
        };

        let next = self.peek_nth(1);
        match next.map(|l| &l.token) {
            Some(Token::ArrayClose | Token::NumberLiteral(_)) => Ok(Value::Array(Vec::new())),
            Some(Token::StringLiteral(_)) => Ok(Value::Object(Map::new())),
            _ => Err(self.unexpected(next, TokenMask::ACCESS)),
        }
    }

    /// Fills `slot` from whatever follows a key or access expression.
    fn collect(&mut self, slot: &mut Value, depth: usize) -> Result<()> {
        if slot.is_null() {
            *slot = self.init()?;
        }

        let next = self.peek();
        match next.map(|l| &l.token) {
            Some(Token::ArrayOpen) => self.access(slot, depth + 1),
            Some(Token::Assign) => {
                self.cursor += 1;
                let value = self.value()?;
                self.expect(TokenMask::DELIMITER)?;
                self.store(slot, value, next)
            }
            Some(Token::Delimiter) => {
                self.cursor += 1;
                self.store(slot, Value::Bool(true), next)
            }
            _ => Err(self.unexpected(next, TokenMask::CONTINUATION)),
        }
    }

    /// Reads the literal after `=`.
    fn value(&mut self) -> Result<Value> {
        if let Some(Lexeme {
            token: Token::Delimiter,
            ..
        }) = self.peek()
        {
            // `key=` with nothing after it
            return Ok(Value::String(String::new()));
        }

        let lexeme = self.expect(TokenMask::VALUE)?;
        Ok(match &lexeme.token {
            Token::NumberLiteral(n) => Value::Number(Number::UInt(*n)),
            Token::StringLiteral(s) => Value::String(s.to_string()),
            _ => Value::Null,
        })
    }

    /// Writes a scalar into `slot`. Scalars replace scalars, but never a
    /// container that earlier access expressions created.
    fn store(&self, slot: &mut Value, value: Value, at: Option<&Lexeme<'_>>) -> Result<()> {
        match slot {
            Value::Array(_) | Value::Object(_) => Err(Error::parse_err(
                format!(
                    "invalid input: the same key is used for both a {} and a value",
                    slot.kind()
                ),
                self.position(at),
            )),
            _ => {
                *slot = value;
                Ok(())
            }
        }
    }

    /// Handles one bracketed access level: `[]`, `[n]` or `[name]`.
    fn access(&mut self, container: &mut Value, depth: usize) -> Result<()> {
        let open = self.expect(TokenMask::ARRAY_OPEN)?;
        if depth > self.max_depth {
            return Err(Error::parse_err(
                format!("key nesting exceeds the maximum depth of {}", self.max_depth),
                open.offset,
            ));
        }

        let next = self.peek();
        match next.map(|l| &l.token) {
            Some(Token::ArrayClose) => {
                self.cursor += 1;
                let seq = expect_sequence(container, open.offset)?;
                seq.push(Value::Null);
                let last = seq.len() - 1;
                trace!(index = last, "appending to sequence");
                self.collect(&mut seq[last], depth)
            }
            Some(Token::NumberLiteral(n)) => {
                self.cursor += 1;
                self.expect(TokenMask::ARRAY_CLOSE)?;
                let index = usize::try_from(*n)
                    .ok()
                    .filter(|index| *index <= self.array_limit)
                    .ok_or_else(|| {
                        Error::parse_err(
                            format!(
                                "array index {n} exceeds the limit of {}",
                                self.array_limit
                            ),
                            self.position(next),
                        )
                    })?;
                let at = self.position(next);
                let seq = expect_sequence(container, open.offset)?;
                if index >= seq.len() {
                    let len = index.checked_add(1).ok_or_else(|| {
                        Error::parse_err(format!("array index {n} is too large"), at)
                    })?;
                    seq.try_reserve(len - seq.len()).map_err(|e| {
                        Error::parse_err(format!("array index {n} cannot be stored: {e}"), at)
                    })?;
                    // pad holes so the element lands at its own index
                    seq.resize(len, Value::Null);
                }
                trace!(index, "writing sequence element");
                self.collect(&mut seq[index], depth)
            }
            Some(Token::StringLiteral(name)) => {
                self.cursor += 1;
                self.expect(TokenMask::ARRAY_CLOSE)?;
                let map = expect_map(container, open.offset)?;
                trace!(key = %name, "writing map entry");
                let slot = map.entry(name.to_string()).or_insert(Value::Null);
                self.collect(slot, depth)
            }
            _ => Err(self.unexpected(next, TokenMask::ACCESS)),
        }
    }
}

fn expect_sequence(node: &mut Value, position: usize) -> Result<&mut Vec<Value>> {
    match node {
        Value::Array(seq) => Ok(seq),
        other => Err(Error::parse_err(
            format!(
                "invalid input: the same key is used for both a {} and a sequence",
                other.kind()
            ),
            position,
        )),
    }
}

fn expect_map(node: &mut Value, position: usize) -> Result<&mut Map> {
    match node {
        Value::Object(map) => Ok(map),
        other => Err(Error::parse_err(
            format!(
                "invalid input: the same key is used for both a {} and a nested map",
                other.kind()
            ),
            position,
        )),
    }
}
