use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use notifications_axum::{json_response, response, response::EncapsulatedJsonError};
use snafu::Snafu;

use crate::{cloud_controller, uaa_client};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Fail to begin transaction, error: {source}"))]
    BeginTransaction { source: sqlx::Error },

    #[snafu(display("Fail to commit transaction, error: {source}"))]
    CommitTransaction { source: sqlx::Error },

    #[snafu(display("Fail to roll back transaction, error: {source}"))]
    RollBackTransaction { source: sqlx::Error },

    #[snafu(display("Fail to acquire database connection, error: {source}"))]
    AcquireConnection { source: sqlx::Error },

    #[snafu(display("Fail to insert message status `{message_id}`, error: {source}"))]
    InsertMessageStatus { message_id: String, source: sqlx::Error },

    #[snafu(display("Fail to insert job into queue `{queue_name}`, error: {source}"))]
    InsertJob { queue_name: String, source: sqlx::Error },

    #[snafu(display("Fail to register client `{client_id}`, error: {source}"))]
    UpsertClient { client_id: String, source: sqlx::Error },

    #[snafu(display("Fail to register kind `{kind_id}` of client `{client_id}`, error: {source}"))]
    UpsertKind { client_id: String, kind_id: String, source: sqlx::Error },

    #[snafu(display("Fail to trim kinds of client `{client_id}`, error: {source}"))]
    TrimKinds { client_id: String, source: sqlx::Error },

    #[snafu(display("Fail to load client `{client_id}`, error: {source}"))]
    FindClient { client_id: String, source: sqlx::Error },

    #[snafu(display("Fail to load kind `{kind_id}` of client `{client_id}`, error: {source}"))]
    FindKind { client_id: String, kind_id: String, source: sqlx::Error },

    #[snafu(display("Fail to serialize delivery `{message_id}`, error: {source}"))]
    SerializeDelivery { message_id: String, source: serde_json::Error },

    #[snafu(display("Rejecting default scope `{scope}`"))]
    DefaultScope { scope: String },

    #[snafu(display("Invalid scope `{scope}`"))]
    InvalidScope { scope: String },

    #[snafu(display("Invalid email address `{email}`"))]
    InvalidEmail { email: String },

    #[snafu(display("Missing {audience} to notify"))]
    MissingTarget { audience: &'static str },

    #[snafu(display("Cloud Controller is unavailable, error: {source}"))]
    CloudControllerDown { source: cloud_controller::Error },

    #[snafu(display("CloudController Error: {resource} {guid} could not be found"))]
    CloudControllerNotFound { resource: &'static str, guid: String },

    #[snafu(display("UAA is unavailable, error: {source}"))]
    UaaDown { source: uaa_client::Error },

    #[snafu(display("UAA Unknown Error: {source}"))]
    UaaGeneric { source: uaa_client::Error },
}

impl IntoResponse for Error {
    // SAFETY: allow: high cognitive complexity caused by `tracing` macro
    #[allow(clippy::cognitive_complexity)]
    fn into_response(self) -> Response {
        match self {
            Self::CloudControllerDown { .. } => json_response! {
                reason: self,
                status: StatusCode::BAD_GATEWAY,
                error: response::Error::new(
                    response::ErrorType::BadGateway,
                    "Cloud Controller is unavailable",
                )
            },
            Self::CloudControllerNotFound { .. } => json_response! {
                reason: self,
                status: StatusCode::NOT_FOUND,
                error: response::Error::new(response::ErrorType::NotFound, self.to_string())
            },
            Self::UaaDown { .. } => json_response! {
                reason: self,
                status: StatusCode::BAD_GATEWAY,
                error: response::Error::new(response::ErrorType::BadGateway, "UAA is unavailable")
            },
            Self::UaaGeneric { .. } => json_response! {
                reason: self,
                status: StatusCode::BAD_GATEWAY,
                error: response::Error::new(response::ErrorType::BadGateway, self.to_string())
            },
            Self::DefaultScope { .. }
            | Self::InvalidScope { .. }
            | Self::InvalidEmail { .. }
            | Self::MissingTarget { .. } => {
                json_response! {
                    reason: self,
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    error: response::Error::new(response::ErrorType::Validation, self.to_string())
                }
            }
            _ => json_response! {
                reason: self,
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: response::Error::new(response::ErrorType::Internal, "Internal server error")
            },
        }
    }
}
