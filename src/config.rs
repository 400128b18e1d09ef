use std::borrow::Cow;
use std::io::Write;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::value::{Map, Value};

/// Configuration for decoding and encoding behavior.
///
/// The `Config` struct allows you to customize how `nested_qs` splits
/// querystrings into segments, and how much nesting it will accept from
/// untrusted input.
///
/// ## Delimiter
///
/// The delimiter separates `key=value` segments. It is used both to split
/// on decode and to join on encode, so a round trip must use the same
/// delimiter on both sides. It may be longer than one character but must
/// not be empty.
///
/// Default value: `delimiter = "&"`
///
/// ## Limits
///
/// `max_depth` bounds how many bracket levels a single key may have, and
/// `array_limit` bounds the largest explicit index accepted in `a[n]`
/// access. Both protect against crafted inputs: a large index forces the
/// decoder to allocate every slot below it.
///
/// Default values: `max_depth = 16`, `array_limit = 1000`
///
/// ```
/// use nested_qs::Config;
///
/// let config = Config::new().delimiter(";");
/// let map = config.decode("a=1;b[c]=2").unwrap();
/// assert_eq!(config.encode(&map).unwrap(), "a=1;b[c]=2");
///
/// let config = Config::new().max_depth(1);
/// assert!(config.decode("a[b][c]=1").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub(crate) delimiter: Cow<'static, str>,
    pub(crate) max_depth: usize,
    pub(crate) array_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            delimiter: Cow::Borrowed("&"),
            max_depth: 16,
            array_limit: 1000,
        }
    }

    /// Sets the segment delimiter. Default is `&`.
    pub fn delimiter(mut self, delimiter: impl Into<Cow<'static, str>>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Specifies the maximum number of bracket levels `nested_qs` will
    /// accept in a single key. Default is 16.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Specifies the largest explicit array index accepted while decoding.
    /// Default is 1000.
    pub fn array_limit(mut self, array_limit: usize) -> Self {
        self.array_limit = array_limit;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(Error::InvalidConfig("delimiter must not be empty".into()));
        }
        Ok(())
    }

    /// Decodes a querystring into a [`Map`] using this `Config`.
    pub fn decode(&self, query: &str) -> Result<Map> {
        crate::de::parse::parse(query, self)
    }

    /// Encodes a [`Map`] into a querystring using this `Config`.
    pub fn encode(&self, map: &Map) -> Result<String> {
        // initialize the buffer with 128 bytes
        // this is a guess based on what `serde_json` does
        let mut buffer = Vec::with_capacity(128);
        self.encode_to_writer(map, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| Error::Custom(e.to_string()))
    }

    /// Encodes a [`Map`] into a generic writer using this `Config`.
    pub fn encode_to_writer<W: Write>(&self, map: &Map, writer: &mut W) -> Result<()> {
        self.validate()?;
        crate::ser::Encoder::new(writer, self).encode(map)
    }

    /// Deserializes a querystring from a `&str` using this `Config`.
    pub fn deserialize_str<T: DeserializeOwned>(&self, input: &str) -> Result<T> {
        let map = self.decode(input)?;
        crate::de::from_value(Value::Object(map))
    }

    /// Serializes an object to a querystring using this `Config`.
    ///
    /// The input must serialize to a struct or map, since every value in a
    /// querystring needs a key.
    pub fn serialize_string<T: Serialize + ?Sized>(&self, input: &T) -> Result<String> {
        self.encode(&top_level_map(input)?)
    }

    /// Serializes an object into a generic writer using this `Config`.
    pub fn serialize_to_writer<T: Serialize + ?Sized, W: Write>(
        &self,
        input: &T,
        writer: &mut W,
    ) -> Result<()> {
        self.encode_to_writer(&top_level_map(input)?, writer)
    }
}

fn top_level_map<T: Serialize + ?Sized>(input: &T) -> Result<Map> {
    match crate::ser::to_value(input)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::unsupported(
            "",
            format!(
                "cannot serialize a {} at the top level, try serializing a struct or map",
                other.kind()
            ),
        )),
    }
}
