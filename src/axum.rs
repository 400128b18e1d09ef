//! Functionality for using `nested_qs` with `axum`.
//!
//! Enable with the `axum` feature.

use std::sync::Arc;

use axum_framework as axum;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::Config;
use crate::error::Error as QsError;

/// Extract typed information from the request's query.
///
/// ## Example
///
/// ```rust
/// # extern crate axum_framework as axum;
/// use nested_qs::axum::QsQuery;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// pub struct UsersFilter {
///    id: Vec<u64>,
/// }
///
/// // Use `QsQuery` extractor for query information.
/// // The correct request for this handler would be `/users?id[]=1124&id[]=88`.
/// async fn filter_users(QsQuery(info): QsQuery<UsersFilter>) -> String {
///     info.id
///         .iter()
///         .map(|i| i.to_string())
///         .collect::<Vec<String>>()
///         .join(", ")
/// }
///
/// fn main() {
///     let app = axum::Router::<()>::new()
///         .route("/users", axum::routing::get(filter_users));
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct QsQuery<T>(pub T);

impl<T> std::ops::Deref for QsQuery<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::DerefMut for QsQuery<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T, S> FromRequestParts<S> for QsQuery<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = QsQueryRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let qs_config = parts
            .extensions
            .get::<QsQueryConfig>()
            .cloned()
            .unwrap_or_default();
        let query = parts.uri.query().unwrap_or_default();
        match qs_config.config.deserialize_str::<T>(query) {
            Ok(value) => Ok(QsQuery(value)),
            Err(err) => {
                debug!(%err, "rejecting request query");
                match qs_config.error_handler {
                    Some(handler) => Err(handler(err)),
                    None => Err(QsQueryRejection::new(err, StatusCode::BAD_REQUEST)),
                }
            }
        }
    }
}

/// Rejection returned when the query cannot be decoded into `T`.
#[derive(Debug)]
pub struct QsQueryRejection {
    error: QsError,
    status: StatusCode,
}

impl std::fmt::Display for QsQueryRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to deserialize query string: {}", self.error)
    }
}

impl std::error::Error for QsQueryRejection {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl QsQueryRejection {
    pub fn new(error: QsError, status: StatusCode) -> Self {
        QsQueryRejection { error, status }
    }

    pub fn error(&self) -> &QsError {
        &self.error
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for QsQueryRejection {
    fn into_response(self) -> Response {
        (self.status, self.to_string()).into_response()
    }
}

type ErrorHandler = Arc<dyn Fn(QsError) -> QsQueryRejection + Send + Sync>;

/// Query extractor configuration.
///
/// Insert it as a request extension (for example through a
/// `tower_http::add_extension` layer) to change the delimiter, the decoding
/// limits, or how failures are turned into responses.
///
/// ```rust
/// # extern crate axum_framework as axum;
/// use axum::http::StatusCode;
/// use nested_qs::Config;
/// use nested_qs::axum::{QsQueryConfig, QsQueryRejection};
///
/// let config = QsQueryConfig::new(Config::new().delimiter(";"))
///     .error_handler(|err| QsQueryRejection::new(err, StatusCode::UNPROCESSABLE_ENTITY));
/// ```
#[derive(Clone, Default)]
pub struct QsQueryConfig {
    config: Config,
    error_handler: Option<ErrorHandler>,
}

impl QsQueryConfig {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            error_handler: None,
        }
    }

    /// Sets a custom error handler.
    pub fn error_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(QsError) -> QsQueryRejection + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(f));
        self
    }
}
