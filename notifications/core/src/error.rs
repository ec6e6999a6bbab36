use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use notifications_axum::{json_response, response, response::EncapsulatedJsonError};
use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid message status: {value}"))]
    InvalidMessageStatus { value: String },

    #[snafu(display(
        "\"{role}\" is not a valid organization role, expected one of OrgManager, \
         BillingManager, OrgAuditor"
    ))]
    InvalidOrganizationRole { role: String },
}

impl IntoResponse for Error {
    // SAFETY: allow: high cognitive complexity caused by `tracing` macro
    #[allow(clippy::cognitive_complexity)]
    fn into_response(self) -> Response {
        match self {
            Self::InvalidMessageStatus { .. } | Self::InvalidOrganizationRole { .. } => json_response! {
                reason: self,
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: response::Error::new(response::ErrorType::Validation, self.to_string())
            },
        }
    }
}
