#![cfg(feature = "axum")]

extern crate axum_framework as axum;

use axum::{extract::FromRequestParts, http::StatusCode, response::IntoResponse};
use nested_qs::Config;
use nested_qs::axum::{QsQuery, QsQueryConfig, QsQueryRejection};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, PartialEq)]
struct Query {
    foo: u64,
    bars: Vec<u64>,
    #[serde(flatten)]
    common: CommonParams,
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
struct CommonParams {
    limit: u64,
    offset: u64,
    sort: String,
}

fn request_parts(uri: &str, config: Option<QsQueryConfig>) -> axum::http::request::Parts {
    let mut builder = axum::http::Request::builder().uri(uri);
    if let Some(config) = config {
        builder = builder.extension(config);
    }
    let (parts, _) = builder.body(()).unwrap().into_parts();
    parts
}

#[test]
fn test_default_error_handler() {
    futures::executor::block_on(async {
        let mut req_parts = request_parts("/test", None);

        let e = QsQuery::<Query>::from_request_parts(&mut req_parts, &())
            .await
            .unwrap_err();

        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.into_response().status(), StatusCode::BAD_REQUEST);
    })
}

#[test]
fn test_custom_error_handler() {
    futures::executor::block_on(async {
        let config = QsQueryConfig::default()
            .error_handler(|err| QsQueryRejection::new(err, StatusCode::UNPROCESSABLE_ENTITY));
        let mut req_parts = request_parts("/test?foo=1&bars[=3", Some(config));
        let query = QsQuery::<Query>::from_request_parts(&mut req_parts, &()).await;

        assert!(query.is_err());
        assert_eq!(
            query.unwrap_err().into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    })
}

#[test]
fn test_composite_querystring_extractor() {
    futures::executor::block_on(async {
        let mut req_parts = request_parts(
            "/test?foo=1&bars[]=0&bars[]=1&limit=100&offset=50&sort=name",
            None,
        );
        let s = QsQuery::<Query>::from_request_parts(&mut req_parts, &())
            .await
            .unwrap();
        assert_eq!(s.foo, 1);
        assert_eq!(s.bars, vec![0, 1]);
        assert_eq!(s.common.limit, 100);
        assert_eq!(s.common.offset, 50);
        assert_eq!(s.common.sort, "name");
    })
}

#[test]
fn test_escaped_brackets_are_not_structure() {
    futures::executor::block_on(async {
        // `bars%5B%5D` is a key literally named `bars[]`
        let mut req_parts = request_parts(
            "/test?foo=1&bars%5B%5D=3&limit=100&offset=50&sort=name",
            None,
        );
        let e = QsQuery::<Query>::from_request_parts(&mut req_parts, &())
            .await
            .unwrap_err();

        assert_eq!(e.into_response().status(), StatusCode::BAD_REQUEST);
    })
}

#[test]
fn test_custom_qs_config() {
    futures::executor::block_on(async {
        let config = QsQueryConfig::new(Config::new().delimiter(";"));
        let mut req_parts = request_parts(
            "/test?foo=1;bars[]=3;limit=100;offset=50;sort=name",
            Some(config),
        );
        let s = QsQuery::<Query>::from_request_parts(&mut req_parts, &())
            .await
            .unwrap();
        assert_eq!(s.bars, vec![3]);
        assert_eq!(s.common.sort, "name");
    })
}

#[test]
fn test_limits_from_config() {
    futures::executor::block_on(async {
        let config = QsQueryConfig::new(Config::new().array_limit(2));
        let mut req_parts = request_parts(
            "/test?foo=1&bars[5]=3&limit=100&offset=50&sort=name",
            Some(config),
        );
        let e = QsQuery::<Query>::from_request_parts(&mut req_parts, &())
            .await
            .unwrap_err();
        assert!(
            e.to_string().contains("array index 5 exceeds the limit of 2"),
            "got: {e}"
        );
    })
}
