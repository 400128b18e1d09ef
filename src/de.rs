//! Decoding support for querystrings.
//!
//! ### An overview of the design
//!
//! Querystrings are not ordered: `struct { a: Vec<u8>, b: String }` might
//! arrive as `a[0]=1&a[1]=2&b=Hello` or as `a[1]=2&b=Hello&a[0]=1`. So rather
//! than deserializing directly from the input, the input is first decoded
//! into a [`Map`] of [`Value`]s, and only then handed to serde.
//!
//! Decoding happens in two passes:
//!
//! 1. `tokenize` splits the input on the delimiter and turns each segment
//!    into `=`, `[`, `]`, number and string tokens, percent-decoding the
//!    literals as it goes. Each token remembers its byte offset so errors
//!    can point back at the input.
//! 2. `parse` walks the tokens with a recursive-descent parser and builds
//!    the nested structure, creating arrays and maps the first time a key
//!    is accessed.
//!
//! The resulting [`Value`] implements `Deserializer`, coercing string
//! scalars into numbers and booleans on demand.

mod decode;
pub(crate) mod parse;
pub(crate) mod tokenize;
mod value;

pub use tokenize::{Lexeme, Token, tokenize};

use serde::de::DeserializeOwned;

use crate::Config;
use crate::error::Result;
use crate::value::{Map, Value};

/// Decodes a querystring into a [`Map`], splitting segments on `&`.
///
/// ```
/// use nested_qs::Value;
///
/// let map = nested_qs::decode("a[b]=1&a[c][]=x&a[c][]=y").unwrap();
/// assert_eq!(map["a"]["b"], Value::from(1));
/// assert_eq!(map["a"]["c"][1], "y");
/// ```
pub fn decode(query: &str) -> Result<Map> {
    Config::new().decode(query)
}

/// Decodes a querystring into a [`Map`], splitting segments on `delimiter`.
pub fn decode_with_delimiter(query: &str, delimiter: &str) -> Result<Map> {
    Config::new().delimiter(delimiter.to_owned()).decode(query)
}

/// Deserializes a querystring from a `&str`.
///
/// ```
/// # use serde::Deserialize;
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Query {
///     name: String,
///     age: u8,
///     occupation: String,
/// }
///
/// let q = Query {
///     name: "Alice".to_owned(),
///     age: 24,
///     occupation: "Student".to_owned(),
/// };
///
/// assert_eq!(
///     nested_qs::from_str::<Query>("name=Alice&age=24&occupation=Student").unwrap(),
///     q);
/// ```
pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    Config::new().deserialize_str(input)
}

/// Interprets a [`Value`] as an instance of type `T`.
///
/// Strings are coerced where the target asks for a number or a boolean,
/// so decoded querystrings deserialize into typed structs directly.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(value)
}
