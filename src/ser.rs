//! Encoding support for querystrings.

mod encode;
mod value;

use std::io::Write;

use tracing::debug;

use encode::encode as percent_encode;
pub use value::{ValueSerializer, to_value};

use crate::Config;
use crate::error::{Error, Result};
use crate::value::{Map, Number, Value};

/// Encodes a map into a querystring, joining pairs with `&`.
///
/// Keys are written in insertion order. `Null` values (and containers that
/// hold nothing but `Null`) are left out entirely.
///
/// ```
/// use nested_qs::{Map, Value};
///
/// let mut map = Map::new();
/// map.insert("a".into(), Value::from(1));
/// map.insert("b".into(), Value::Null);
/// map.insert("c".into(), Value::from(vec!["x y", "z"]));
/// assert_eq!(nested_qs::encode(&map).unwrap(), "a=1&c[0]=x%20y&c[1]=z");
/// ```
pub fn encode(map: &Map) -> Result<String> {
    Config::new().encode(map)
}

/// Encodes a map into a querystring, joining pairs with `delimiter`.
pub fn encode_with_delimiter(map: &Map, delimiter: &str) -> Result<String> {
    Config::new().delimiter(delimiter.to_owned()).encode(map)
}

/// Serializes a value into a querystring.
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Query {
///     name: String,
///     age: u8,
///     tags: Vec<&'static str>,
/// }
///
/// let q = Query {
///     name: "Alice".to_owned(),
///     age: 24,
///     tags: vec!["a", "b"],
/// };
///
/// assert_eq!(
///     nested_qs::to_string(&q).unwrap(),
///     "name=Alice&age=24&tags[0]=a&tags[1]=b");
/// ```
pub fn to_string<T: serde::Serialize + ?Sized>(input: &T) -> Result<String> {
    Config::new().serialize_string(input)
}

/// Serializes a value into a generic writer object.
pub fn to_writer<T: serde::Serialize + ?Sized, W: Write>(input: &T, writer: &mut W) -> Result<()> {
    Config::new().serialize_to_writer(input, writer)
}

/// Writes a [`Value`] tree out as `key[sub]=value` pairs.
///
/// The encoder keeps the percent-encoded label of the value currently
/// being written in `key`. Each nesting level appends `[segment]` and
/// truncates it again on the way out, so a pair is written with a single
/// pass over the label.
pub(crate) struct Encoder<'c, W: Write> {
    writer: W,
    first_kv: bool,
    key: Vec<u8>,
    delimiter: &'c str,
}

impl<'c, W: Write> Encoder<'c, W> {
    pub fn new(writer: W, config: &'c Config) -> Self {
        Self {
            writer,
            first_kv: true,
            key: Vec::with_capacity(32),
            delimiter: &config.delimiter,
        }
    }

    pub fn encode(mut self, map: &Map) -> Result<()> {
        debug!(keys = map.len(), delimiter = self.delimiter, "encoding querystring");
        for (key, value) in map {
            self.key.clear();
            self.push_segment(key.as_bytes());
            self.serialize(value).map_err(|e| e.under_key(key))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn push_segment(&mut self, segment: &[u8]) {
        for encoded in percent_encode(segment, self.delimiter.as_bytes()) {
            self.key.extend_from_slice(&encoded);
        }
    }

    /// Dispatches on the kind of value. Dates are matched before the other
    /// scalars so they are written as timestamps rather than as text.
    fn serialize(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Date(date) => {
                let mut buffer = itoa::Buffer::new();
                self.write_pair(buffer.format(date.timestamp_millis()).as_bytes())
            }
            Value::Null => Ok(()),
            Value::String(s) => self.write_value(s.as_bytes()),
            Value::Number(n) => self.write_number(n),
            Value::Bool(b) => self.write_pair(if *b { b"1" } else { b"0" }),
            Value::Array(items) => {
                let mut index = itoa::Buffer::new();
                for (idx, item) in items.iter().enumerate() {
                    let len = self.key.len();
                    self.key.push(b'[');
                    self.key.extend_from_slice(index.format(idx).as_bytes());
                    self.key.push(b']');
                    self.serialize(item)
                        .map_err(|e| e.under_key(&idx.to_string()))?;
                    self.key.truncate(len);
                }
                Ok(())
            }
            Value::Object(map) => {
                for (key, item) in map {
                    let len = self.key.len();
                    self.key.push(b'[');
                    self.push_segment(key.as_bytes());
                    self.key.push(b']');
                    self.serialize(item).map_err(|e| e.under_key(key))?;
                    self.key.truncate(len);
                }
                Ok(())
            }
        }
    }

    fn write_number(&mut self, n: &Number) -> Result<()> {
        match *n {
            Number::UInt(n) => self.write_pair(itoa::Buffer::new().format(n).as_bytes()),
            Number::Int(n) => self.write_pair(itoa::Buffer::new().format(n).as_bytes()),
            Number::Float(f) if f.is_finite() => {
                self.write_pair(ryu::Buffer::new().format_finite(f).as_bytes())
            }
            Number::Float(f) => Err(Error::unsupported(
                "",
                format!("{f} has no querystring representation"),
            )),
        }
    }

    /// Writes `key=value` with the value percent-encoded.
    fn write_value(&mut self, value: &[u8]) -> Result<()> {
        self.write_key()?;
        for encoded in percent_encode(value, self.delimiter.as_bytes()) {
            self.writer.write_all(&encoded)?;
        }
        Ok(())
    }

    /// Writes `key=value` with a value that never needs encoding.
    fn write_pair(&mut self, value: &[u8]) -> Result<()> {
        self.write_key()?;
        self.writer.write_all(value)?;
        Ok(())
    }

    fn write_key(&mut self) -> Result<()> {
        if self.first_kv {
            self.first_kv = false;
        } else {
            self.writer.write_all(self.delimiter.as_bytes())?;
        }
        self.writer.write_all(&self.key)?;
        self.writer.write_all(b"=")?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use chrono::DateTime;

    use crate::error::Error;
    use crate::value::{Map, Value};
    use crate::{Config, encode, encode_with_delimiter};

    use pretty_assertions::assert_eq;

    fn map<const N: usize>(entries: [(&str, Value); N]) -> Map {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn encode_scalars() {
        let m = map([
            ("s", "hello world".into()),
            ("n", 5u64.into()),
            ("neg", (-3i64).into()),
            ("f", 1.5f64.into()),
            ("t", true.into()),
            ("f0", false.into()),
        ]);
        assert_eq!(
            encode(&m).unwrap(),
            "s=hello%20world&n=5&neg=-3&f=1.5&t=1&f0=0"
        );
    }

    #[test]
    fn omits_nulls() {
        let m = map([("a", 1u64.into()), ("b", Value::Null), ("c", Value::Null)]);
        assert_eq!(encode(&m).unwrap(), "a=1");
    }

    #[test]
    fn encode_nested() {
        let m = map([
            (
                "user",
                Value::Object(map([("name", "Bob".into()), ("age", 5u64.into())])),
            ),
            ("ids", Value::from(vec![1u64, 2u64])),
        ]);
        assert_eq!(
            encode(&m).unwrap(),
            "user[name]=Bob&user[age]=5&ids[0]=1&ids[1]=2"
        );
    }

    #[test]
    fn sparse_arrays_keep_indices() {
        let m = map([("a", Value::Array(vec![Value::Null, Value::Null, "x".into()]))]);
        assert_eq!(encode(&m).unwrap(), "a[2]=x");
    }

    #[test]
    fn empty_containers_are_omitted() {
        let m = map([
            ("a", Value::Array(vec![])),
            ("b", Value::Object(Map::new())),
            ("c", "".into()),
        ]);
        assert_eq!(encode(&m).unwrap(), "c=");
    }

    #[test]
    fn encode_dates_as_epoch_millis() {
        let date = DateTime::from_timestamp_millis(1_417_171_559_324).unwrap();
        let m = map([("at", Value::Date(date))]);
        assert_eq!(encode(&m).unwrap(), "at=1417171559324");
    }

    #[test]
    fn escapes_keys() {
        let m = map([("a=b", Value::Object(map([("[x]", 1u64.into())])))]);
        assert_eq!(encode(&m).unwrap(), "a%3Db[%5Bx%5D]=1");
    }

    #[test]
    fn custom_delimiter() {
        let m = map([("a", 1u64.into()), ("b", 2u64.into())]);
        assert_eq!(encode_with_delimiter(&m, ";").unwrap(), "a=1;b=2");
    }

    #[test]
    fn rejects_empty_delimiter() {
        let m = map([("a", 1u64.into())]);
        assert!(matches!(
            encode_with_delimiter(&m, ""),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn non_finite_numbers_name_their_key() {
        let m = map([(
            "a",
            Value::Object(map([("b", Value::from(vec![1.0, f64::NAN]))])),
        )]);
        match encode(&m) {
            Err(Error::Serialization { key, .. }) => assert_eq!(key, "a[b][1]"),
            other => panic!("expected a serialization error, got: {other:?}"),
        }
    }

    #[test]
    fn streams_to_writer() {
        let m = map([("a", "x".into())]);
        let mut out = Vec::new();
        Config::new().encode_to_writer(&m, &mut out).unwrap();
        assert_eq!(out, b"a=x");
    }
}
