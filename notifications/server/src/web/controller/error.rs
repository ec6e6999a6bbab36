use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use notifications_axum::{json_response, response, response::EncapsulatedJsonError};
use snafu::Snafu;

use crate::service::error::Error as ServiceError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Service { source: ServiceError },

    #[snafu(display("Request body could not be parsed: {message}"))]
    ParseParams { message: String },

    #[snafu(display("{}", errors.join(", ")))]
    Validation { errors: Vec<String> },

    #[snafu(display("Client `{client_id}` lacks scope `{scope}`"))]
    MissingScope { client_id: String, scope: &'static str },

    #[snafu(display("No strategy serves audience `{audience}`"))]
    UnknownAudience { audience: &'static str },
}

impl From<ServiceError> for Error {
    fn from(source: ServiceError) -> Self { Self::Service { source } }
}

impl IntoResponse for Error {
    // SAFETY: allow: high cognitive complexity caused by `tracing` macro
    #[allow(clippy::cognitive_complexity)]
    fn into_response(self) -> Response {
        match self {
            Self::Service { source } => source.into_response(),
            Self::ParseParams { .. } => json_response! {
                reason: self,
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: response::Error::new(response::ErrorType::Validation, self.to_string())
            },
            Self::Validation { ref errors } => {
                let error =
                    response::Error { type_: response::ErrorType::Validation, errors: errors.clone() };
                json_response! {
                    reason: self,
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    error: error
                }
            }
            Self::MissingScope { .. } => json_response! {
                reason: self,
                status: StatusCode::FORBIDDEN,
                error: response::Error::new(
                    response::ErrorType::Forbidden,
                    "You are not authorized to perform the requested action",
                )
            },
            Self::UnknownAudience { .. } => json_response! {
                reason: self,
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: response::Error::new(response::ErrorType::Internal, "Internal server error")
            },
        }
    }
}
