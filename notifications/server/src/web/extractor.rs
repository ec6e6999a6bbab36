use std::{convert::Infallible, result::Result};

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use chrono::Utc;
use notifications_core::model::VcapRequest;
use serde::de::DeserializeOwned;

use crate::web::{
    controller::Error,
    middleware::{AuthClient, AuthError},
};

/// Correlation data of the request.
///
/// The ID is taken from the `X-Vcap-Request-Id` header set by the platform
/// router, or generated when the header is absent. The receipt time is taken
/// when the extractor runs.
#[derive(Debug, Clone)]
pub struct RequestMetadata(pub VcapRequest);

#[async_trait]
impl<S> FromRequestParts<S> for RequestMetadata
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let receipt_time = Utc::now();
        let id = notifications_axum::get_vcap_request_id(&parts.headers).unwrap_or_else(|| {
            let id = uuid::Uuid::new_v4().to_string();
            tracing::debug!("No request ID found in request headers, generated {id}");
            id
        });

        Ok(Self(VcapRequest { id, receipt_time }))
    }
}

/// The UAA client inserted by the JWT middleware.
#[derive(Debug, Clone)]
pub struct CallingClient(pub AuthClient);

#[async_trait]
impl<S> FromRequestParts<S> for CallingClient
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let client = parts.extensions.get::<AuthClient>().ok_or(AuthError::MissingToken)?.clone();

        Ok(Self(client))
    }
}

/// JSON body extractor that turns axum's rejection into a 422 response.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(request, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| Error::ParseParams { message: rejection.body_text() })
    }
}
