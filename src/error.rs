use std::fmt::{self, Display};
use std::io;

use serde::{de, ser};

/// Errors produced while decoding or encoding querystrings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A literal contained a malformed percent-encoded sequence.
    #[error("failed to decode input at position {position}: {reason}")]
    Decode { position: usize, reason: String },

    /// The token stream did not match the querystring grammar.
    #[error("parsing failed with error: '{message}' at position: {position}")]
    Parse { message: String, position: usize },

    /// A value has no querystring representation.
    #[error("cannot serialize value for key `{key}`: {reason}")]
    Serialization { key: KeyPath, reason: String },

    /// The supplied `Config` cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The input handed to a URL helper is not a valid URL reference.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Custom(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The chain of key segments leading to a value, displayed as
/// `outer[inner][...]`.
///
/// Segments are kept verbatim, so keys that themselves contain brackets
/// still render under the right parent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyPath {
    // innermost segment first
    reversed: Vec<String>,
}

impl KeyPath {
    /// Iterates the segments from the outermost key inwards.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.reversed.iter().rev().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.reversed.is_empty()
    }

    fn push_outer(&mut self, segment: &str) {
        self.reversed.push(segment.to_string());
    }
}

impl Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments().enumerate() {
            if i == 0 {
                f.write_str(segment)?;
            } else {
                write!(f, "[{segment}]")?;
            }
        }
        Ok(())
    }
}

impl PartialEq<str> for KeyPath {
    fn eq(&self, other: &str) -> bool {
        self.to_string() == other
    }
}

impl PartialEq<&str> for KeyPath {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Error {
    /// Generate a decoding error at byte `position` of the input.
    pub fn decode_err<T>(reason: T, position: usize) -> Self
    where
        T: Display,
    {
        Error::Decode {
            position,
            reason: reason.to_string(),
        }
    }

    /// Generate a parsing error message with position.
    pub fn parse_err<T>(msg: T, position: usize) -> Self
    where
        T: Display,
    {
        Error::Parse {
            message: msg.to_string(),
            position,
        }
    }

    /// Generate a serialization error for the value stored under `key`.
    pub fn unsupported<K, T>(key: K, reason: T) -> Self
    where
        K: Into<String>,
        T: Display,
    {
        let key = key.into();
        let mut path = KeyPath::default();
        if !key.is_empty() {
            path.push_outer(&key);
        }
        Error::Serialization {
            key: path,
            reason: reason.to_string(),
        }
    }

    /// Prefixes the key path of a serialization error with an outer key
    /// segment, so nested failures report the full `outer[inner]` label.
    pub(crate) fn under_key(self, segment: &str) -> Self {
        match self {
            Error::Serialization { mut key, reason } => {
                key.push_outer(segment);
                Error::Serialization { key, reason }
            }
            other => other,
        }
    }
}

impl de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Custom(msg.to_string())
    }
}

impl ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Custom(msg.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::Error;

    #[test]
    fn nested_key_paths() {
        let err = Error::unsupported("", "NaN").under_key("y").under_key("x");
        match err {
            Error::Serialization { key, .. } => assert_eq!(key, "x[y]"),
            other => panic!("unexpected error: {other}"),
        }

        let err = Error::unsupported("c", "NaN")
            .under_key("1")
            .under_key("b")
            .under_key("a");
        match err {
            Error::Serialization { key, .. } => assert_eq!(key, "a[b][1][c]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bracketed_segments_stay_under_their_parent() {
        let err = Error::unsupported("", "NaN").under_key("[x]").under_key("a");
        match err {
            Error::Serialization { key, .. } => {
                assert_eq!(key, "a[[x]]");
                assert_eq!(key.segments().collect::<Vec<_>>(), ["a", "[x]"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = Error::unsupported("c]d", "NaN").under_key("b[0]").under_key("a");
        match err {
            Error::Serialization { key, .. } => assert_eq!(key, "a[b[0]][c]d]"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
