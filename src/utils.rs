use url::Url;

use crate::Config;
use crate::error::Result;
use crate::value::Map;

/// Stands in for the scheme and host of relative references such as
/// `/path?a=1`, which only need resolving far enough to split off the query.
const RELATIVE_BASE: &str = "http://localhost/";

/// Returns the query component of `url`, which may be absolute or relative
/// to the site root. A `?` inside the fragment is not a query, and input
/// without one yields an empty query.
///
/// ```
/// assert_eq!(nested_qs::query_of("/p?a=1#top").unwrap(), "a=1");
/// assert_eq!(nested_qs::query_of("/p#top?a=1").unwrap(), "");
/// ```
pub fn query_of(url: &str) -> Result<String> {
    let resolved = Url::parse(RELATIVE_BASE)?.join(url)?;
    Ok(resolved.query().unwrap_or_default().to_string())
}

/// Guesses the segment delimiter of a query: whichever of `&` and `;`
/// appears first, falling back to `&`.
fn sniff_delimiter(query: &str) -> &'static str {
    match query.bytes().find(|&b| b == b'&' || b == b';') {
        Some(b';') => ";",
        _ => "&",
    }
}

/// Decodes the querystring embedded in a full URL.
///
/// ```
/// let map = nested_qs::decode_url_query("https://example.com/p?a[]=1;a[]=2#top").unwrap();
/// assert_eq!(map["a"][1].as_u64(), Some(2));
/// ```
pub fn decode_url_query(url: &str) -> Result<Map> {
    let query = query_of(url)?;
    Config::new().delimiter(sniff_delimiter(&query)).decode(&query)
}

#[cfg(test)]
mod test {
    use super::{decode_url_query, query_of, sniff_delimiter};
    use crate::Error;

    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_query() {
        assert_eq!(query_of("/path?a=1&b=2").unwrap(), "a=1&b=2");
        assert_eq!(query_of("/path?a=1#frag").unwrap(), "a=1");
        assert_eq!(query_of("/path?a=1?b=2").unwrap(), "a=1?b=2");
        assert_eq!(query_of("/path#frag").unwrap(), "");
        assert_eq!(query_of("?").unwrap(), "");
        assert_eq!(query_of("https://h.example/p?x[]=1").unwrap(), "x[]=1");
    }

    #[test]
    fn question_mark_in_fragment_is_not_a_query() {
        assert_eq!(query_of("/p#frag?x=1").unwrap(), "");
        assert_eq!(query_of("https://h/p#frag?admin").unwrap(), "");
        assert!(decode_url_query("https://h/p#frag?admin").unwrap().is_empty());

        let map = decode_url_query("https://h/p?role=user#frag?role=admin").unwrap();
        assert_eq!(map["role"], "user");
    }

    #[test]
    fn malformed_urls_are_rejected() {
        match query_of("http://[::1/?a=1") {
            Err(Error::Url(_)) => {}
            other => panic!("expected a URL error, got: {other:?}"),
        }
    }

    #[test]
    fn sniffs_delimiter() {
        assert_eq!(sniff_delimiter("a=1;b=2&c"), ";");
        assert_eq!(sniff_delimiter("a=1&b=2;c"), "&");
        assert_eq!(sniff_delimiter("a=1"), "&");
    }

    #[test]
    fn url_without_query_is_empty() {
        assert!(decode_url_query("https://example.com/").unwrap().is_empty());
    }

    #[test]
    fn decodes_semicolon_queries() {
        let map = decode_url_query("http://h/?x=1;y[z]=two").unwrap();
        assert_eq!(map["x"].as_u64(), Some(1));
        assert_eq!(map["y"]["z"], "two");
    }
}
