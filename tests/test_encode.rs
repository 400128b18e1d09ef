use chrono::{DateTime, Utc};
use nested_qs::{Config, Error, Map, Value, encode, encode_with_delimiter};
use pretty_assertions::assert_eq;

fn map<const N: usize>(entries: [(&str, Value); N]) -> Map {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[test]
fn nulls_are_omitted() {
    let m = map([("a", 1u64.into()), ("b", Value::Null)]);
    assert_eq!(encode(&m).unwrap(), "a=1");
}

#[test]
fn sequences_use_indices() {
    let m = map([("a", Value::from(vec!["x", "y"]))]);
    assert_eq!(encode(&m).unwrap(), "a[0]=x&a[1]=y");
}

#[test]
fn nested_maps_use_names() {
    let user: Value = [("name", Value::from("Bob")), ("age", Value::from(5))]
        .into_iter()
        .collect();
    let m = map([("user", user)]);
    assert_eq!(encode(&m).unwrap(), "user[name]=Bob&user[age]=5");
}

#[test]
fn uri_component_escaping() {
    let m = map([("q", "a&b=c [d] 100% +!~*'()".into())]);
    assert_eq!(
        encode(&m).unwrap(),
        "q=a%26b%3Dc%20%5Bd%5D%20100%25%20%2B!~*'()"
    );
}

#[test]
fn unicode_is_utf8_escaped() {
    let m = map([("name", "Jürgen".into())]);
    assert_eq!(encode(&m).unwrap(), "name=J%C3%BCrgen");
}

#[test]
fn custom_delimiter_is_escaped_in_literals() {
    let m = map([("a", "x;y".into()), ("b", 2u64.into())]);
    assert_eq!(encode_with_delimiter(&m, ";").unwrap(), "a=x%3By;b=2");

    let m = map([("a", "x|y".into()), ("b", 2u64.into())]);
    assert_eq!(encode_with_delimiter(&m, "|").unwrap(), "a=x%7Cy|b=2");
}

#[test]
fn scalars() {
    let m = map([
        ("t", true.into()),
        ("f", false.into()),
        ("neg", (-12i64).into()),
        ("float", 0.25f64.into()),
        ("empty", "".into()),
    ]);
    assert_eq!(encode(&m).unwrap(), "t=1&f=0&neg=-12&float=0.25&empty=");
}

#[test]
fn dates_are_epoch_milliseconds() {
    let date: DateTime<Utc> = "2014-11-28T12:45:59.324Z".parse().unwrap();
    let m = map([("at", Value::Date(date))]);
    assert_eq!(encode(&m).unwrap(), "at=1417178759324");
}

#[test]
fn infinite_floats_are_rejected() {
    let m = map([("a", Value::from(vec![f64::INFINITY]))]);
    match encode(&m) {
        Err(Error::Serialization { key, reason }) => {
            assert_eq!(key, "a[0]");
            assert_eq!(reason, "inf has no querystring representation");
        }
        other => panic!("expected a serialization error, got: {other:?}"),
    }
}

#[test]
fn bracketed_keys_report_their_parent() {
    let inner: Value = [("[x]", Value::from(f64::NAN))].into_iter().collect();
    let m = map([("a", inner)]);
    match encode(&m) {
        Err(Error::Serialization { key, .. }) => {
            assert_eq!(key, "a[[x]]");
            assert_eq!(key.segments().collect::<Vec<_>>(), ["a", "[x]"]);
        }
        other => panic!("expected a serialization error, got: {other:?}"),
    }
}

#[test]
fn writer_output_matches_string_output() {
    let m = map([("a", Value::from(vec![1u64, 2])), ("b", "c d".into())]);
    let config = Config::new().delimiter(";");
    let mut buf = Vec::new();
    config.encode_to_writer(&m, &mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), config.encode(&m).unwrap());
}

#[test]
fn empty_map() {
    assert_eq!(encode(&Map::new()).unwrap(), "");
}
