//! Nested querystrings, both ways.
//!
//! Querystrings are not formally defined and loosely take the form of
//! _nested_ urlencoded queries. This crate reads and writes the bracket
//! syntax popularised by [qs](https://github.com/ljharb/qs):
//!
//! - `a[]=1&a[]=2` appends to an array,
//! - `a[3]=x` writes an explicit index, padding the gap with nulls,
//! - `user[name]=Bob` writes a named field,
//! - a bare `flag` with no `=` means `true`.
//!
//! Digit-only literals become numbers, everything else stays a string.
//! Percent-escapes are decoded in both keys and values. `+` is left as it
//! is.
//!
//! ## Dynamic values
//!
//! [`decode`] produces a [`Map`] of [`Value`]s and [`encode`] writes one
//! back out. Encoding then decoding gives back the same structure, except
//! that strings made only of digits come back as numbers and `null` leaves
//! are dropped.
//!
//! ```
//! use nested_qs::{Map, Value};
//!
//! let map = nested_qs::decode("a[]=1&a[]=2&user[name]=Bob&debug").unwrap();
//! assert_eq!(map["a"], Value::from(vec![1, 2]));
//! assert_eq!(map["user"]["name"], "Bob");
//! assert_eq!(map["debug"], Value::Bool(true));
//!
//! let mut out = Map::new();
//! out.insert("q".into(), Value::from("rust & serde"));
//! out.insert("page".into(), Value::from(2));
//! assert_eq!(nested_qs::encode(&out).unwrap(), "q=rust%20%26%20serde&page=2");
//! ```
//!
//! ## Serde
//!
//! [`from_str`] and [`to_string`] go through the same [`Value`] tree, so
//! any type implementing `Deserialize` or `Serialize` can be used directly.
//! At the **top level** only structs and maps are supported, since every
//! querystring value needs a key.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Deserialize, Serialize)]
//! struct Address {
//!     city: String,
//!     postcode: String,
//! }
//!
//! #[derive(Debug, PartialEq, Deserialize, Serialize)]
//! struct QueryParams {
//!     id: u8,
//!     name: String,
//!     address: Address,
//!     user_ids: Vec<u8>,
//! }
//!
//! let params = QueryParams {
//!     id: 42,
//!     name: "Acme".to_string(),
//!     address: Address {
//!         city: "Carrot City".to_string(),
//!         postcode: "12345".to_string(),
//!     },
//!     user_ids: vec![1, 2, 3, 4],
//! };
//! let rec_params: QueryParams = nested_qs::from_str("\
//!     name=Acme&id=42&address[postcode]=12345&\
//!     address[city]=Carrot%20City&user_ids[0]=1&user_ids[1]=2&\
//!     user_ids[2]=3&user_ids[3]=4")
//!     .unwrap();
//! assert_eq!(rec_params, params);
//!
//! let encoded = nested_qs::to_string(&params).unwrap();
//! assert_eq!(nested_qs::from_str::<QueryParams>(&encoded).unwrap(), params);
//! ```
//!
//! ## Configuration
//!
//! The segment delimiter, the maximum key depth and the largest explicit
//! array index are set through [`Config`].
//!
//! ## Feature flags
//!
//! - `axum`: a [`QsQuery`](axum::QsQuery) extractor.
//! - `benchmarks`: enables the criterion benchmarks.

#[cfg(feature = "axum")]
pub mod axum;
mod config;
mod de;
mod error;
mod ser;
mod utils;
pub mod value;

#[doc(inline)]
pub use config::Config;
#[doc(inline)]
pub use de::{Lexeme, Token, decode, decode_with_delimiter, from_str, from_value, tokenize};
pub use error::{Error, KeyPath, Result};
#[doc(inline)]
pub use ser::{
    ValueSerializer, encode, encode_with_delimiter, to_string, to_value, to_writer,
};
pub use utils::{decode_url_query, query_of};
#[doc(inline)]
pub use value::{Map, Number, Value};
