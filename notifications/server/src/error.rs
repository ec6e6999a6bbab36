use std::borrow::Cow;

use snafu::Snafu;

use crate::{cloud_controller, uaa_client, web};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display(
        "Can not initialize Postgres pool with endpoint \
         `postgres://{username}@{host}:{port}/{database}`, error: {source}"
    ))]
    InitializePostgresPool {
        host: Cow<'static, str>,
        port: u16,
        username: Cow<'static, str>,
        database: Cow<'static, str>,
        source: sqlx::error::Error,
    },

    #[snafu(display("Fail to migrate postgres schema, error: {source}",))]
    MigrateSchema { source: sqlx::migrate::MigrateError },

    #[snafu(display("{source}"))]
    Web { source: web::Error },

    #[snafu(display("Failed to initialize UAA client, error: {source}"))]
    InitializeUaaClient { source: uaa_client::Error },

    #[snafu(display("Failed to initialize Cloud Controller client, error: {source}"))]
    InitializeCloudControllerClient { source: cloud_controller::Error },

    #[snafu(display("Failed to initialize JWKS client: {message}"))]
    InitializeJwksClient { message: String },
}

impl From<web::Error> for Error {
    fn from(source: web::Error) -> Self { Self::Web { source } }
}
