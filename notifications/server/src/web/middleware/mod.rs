pub mod auth;
pub mod jwks;

pub use auth::{
    jwt_auth_middleware, AuthClient, AuthError, CRITICAL_NOTIFICATIONS_WRITE_SCOPE,
    EMAILS_WRITE_SCOPE, NOTIFICATIONS_WRITE_SCOPE,
};
pub use jwks::JwksClient;
