use std::fmt::Debug;

use axum::{
    body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EncapsulatedResponse<T> {
    #[serde(rename = "_status", with = "http_serde::status_code")]
    status_code: StatusCode,

    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T> From<(StatusCode, T)> for EncapsulatedResponse<T> {
    #[inline]
    fn from((status_code, data): (StatusCode, T)) -> Self { Self { status_code, data: Some(data) } }
}

impl<T> EncapsulatedResponse<T> {
    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn ok(data: T) -> Self { Self { status_code: StatusCode::OK, data: Some(data) } }

    #[inline]
    #[must_use]
    pub const fn empty() -> Self { Self { status_code: StatusCode::OK, data: None } }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.data.is_none() }

    #[inline]
    #[must_use]
    pub const fn status_code(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EncapsulatedResponseError<E> {
    #[serde(rename = "_status", with = "http_serde::status_code")]
    status_code: StatusCode,

    error: E,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EncapsulatedJson<T>(pub EncapsulatedResponse<T>);

impl<T> EncapsulatedJson<T> {
    #[inline]
    #[must_use]
    pub fn ok(data: T) -> Self { Self(EncapsulatedResponse::ok(data)) }

    #[inline]
    #[must_use]
    pub const fn empty() -> Self { Self(EncapsulatedResponse::empty()) }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.0.is_empty() }

    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn data(self) -> Option<T> { self.0.data }

    #[inline]
    #[must_use]
    pub const fn status_code(mut self, status_code: StatusCode) -> Self {
        self.0.status_code = status_code;
        self
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EncapsulatedJsonError<E>(pub EncapsulatedResponseError<E>);

impl<E> EncapsulatedJsonError<E> {
    /// Wraps an error body; the status defaults to `500` until overridden.
    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn err(error: E) -> Self {
        Self(EncapsulatedResponseError { status_code: StatusCode::INTERNAL_SERVER_ERROR, error })
    }

    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn error(self) -> E { self.0.error }

    #[inline]
    #[must_use]
    pub const fn status_code(mut self, status_code: StatusCode) -> Self {
        self.0.status_code = status_code;
        self
    }
}

impl<T> IntoResponse for EncapsulatedJson<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let body = body::Body::from(serde_json::to_vec(&self.0).expect("self.0 is serializable"));

        Response::builder()
            .status(self.0.status_code)
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(body)
            .expect("Build `Axum` response successfully; qed")
    }
}

impl<E> IntoResponse for EncapsulatedJsonError<E>
where
    E: Debug + Serialize,
{
    fn into_response(self) -> Response {
        let body = body::Body::from(serde_json::to_vec(&self.0).expect("self.0 is serializable"));

        Response::builder()
            .status(self.0.status_code)
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(body)
            .expect("Build `Axum` response successfully; qed")
    }
}

/// Error body returned by every failing notify endpoint.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Error {
    #[serde(rename = "type")]
    pub type_: ErrorType,

    pub errors: Vec<String>,
}

impl Error {
    #[inline]
    #[must_use]
    pub fn new(type_: ErrorType, message: impl Into<String>) -> Self {
        Self { type_, errors: vec![message.into()] }
    }
}

#[macro_export]
macro_rules! json_response {
    (status: $status:expr,data: $data:expr) => {
        EncapsulatedJson::<_>::ok($data).status_code($status).into_response()
    };

    (status: $status:expr,error: $error:expr) => {
        EncapsulatedJsonError::<_>::err($error).status_code($status).into_response()
    };

    (reason: $reason:expr,status: $status:expr,error: $error:expr) => {{
        if $status.is_server_error() {
            tracing::error!(status_code = $status.as_u16(), "Server Error: {:?}", $reason);
        } else {
            tracing::warn!(status_code = $status.as_u16(), "Response Error: {:?}", $reason);
        }

        json_response! { status: $status, error: $error }
    }};
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    Internal,
    Validation,
    NotFound,
    Unauthorized,
    Forbidden,
    BadGateway,
}
