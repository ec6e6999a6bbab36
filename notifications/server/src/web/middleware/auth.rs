use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use notifications_axum::{json_response, response, response::EncapsulatedJsonError};
use serde::{Deserialize, Serialize};

use super::jwks::JwksClient;

pub const NOTIFICATIONS_WRITE_SCOPE: &str = "notifications.write";
pub const EMAILS_WRITE_SCOPE: &str = "emails.write";
pub const CRITICAL_NOTIFICATIONS_WRITE_SCOPE: &str = "critical_notifications.write";

/// Claims of a UAA client-credentials token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub client_id: String,
    #[serde(default)]
    pub scope: Vec<String>,
    pub iss: String,
    pub exp: i64,
}

/// The authenticated UAA client calling a notify endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthClient {
    pub client_id: String,
    pub scopes: Vec<String>,
    /// Scheme and authority of the issuing UAA zone.
    pub uaa_host: String,
}

impl AuthClient {
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool { self.scopes.iter().any(|held| held == scope) }
}

impl TryFrom<Claims> for AuthClient {
    type Error = AuthError;

    fn try_from(Claims { client_id, scope, iss, .. }: Claims) -> Result<Self, Self::Error> {
        Ok(Self { client_id, scopes: scope, uaa_host: issuer_host(&iss)? })
    }
}

fn issuer_host(issuer: &str) -> Result<String, AuthError> {
    let uri = issuer
        .parse::<Uri>()
        .map_err(|err| AuthError::InvalidToken(format!("Invalid issuer `{issuer}`: {err}")))?;

    match (uri.scheme_str(), uri.authority()) {
        (Some(scheme), Some(authority)) => Ok(format!("{scheme}://{authority}")),
        _ => Err(AuthError::InvalidToken(format!("Invalid issuer `{issuer}`"))),
    }
}

/// Validates the bearer token against the UAA token keys and stores the
/// calling client in the request extensions.
pub async fn jwt_auth_middleware(
    State(jwks_client): State<JwksClient>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_token_from_headers(&headers)?;

    let claims = validate_token(token, &jwks_client).await?;
    let auth_client = AuthClient::try_from(claims)?;
    tracing::info!("Token valid for client: {}", auth_client.client_id);

    drop(request.extensions_mut().insert(auth_client));

    Ok(next.run(request).await)
}

fn extract_token_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid header encoding".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .ok_or_else(|| AuthError::InvalidToken("Missing Bearer prefix".to_string()))
}

async fn validate_token(token: &str, jwks_client: &JwksClient) -> Result<Claims, AuthError> {
    let header = decode_header(token)
        .map_err(|e| AuthError::InvalidToken(format!("Failed to decode header: {e}")))?;

    let kid = header
        .kid
        .ok_or_else(|| AuthError::InvalidToken("Token missing 'kid' in header".to_string()))?;

    let jwk = jwks_client.get_jwk(&kid).await.map_err(|e| AuthError::JwksError(e.to_string()))?;
    let decoding_key = DecodingKey::from_jwk(&jwk)
        .map_err(|e| AuthError::InvalidToken(format!("Failed to parse JWK: {e}")))?;

    let mut validation = Validation::new(header.alg);
    validation.validate_exp = true;
    // UAA lists the resource servers as audiences; scopes are checked per route
    validation.validate_aud = false;

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(format!("Token validation failed: {e}")))?;

    Ok(token_data.claims)
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
    JwksError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, type_, message) = match self {
            Self::MissingToken => (
                StatusCode::UNAUTHORIZED,
                response::ErrorType::Unauthorized,
                "Authorization header is invalid: missing".to_string(),
            ),
            Self::InvalidToken(msg) => (
                StatusCode::UNAUTHORIZED,
                response::ErrorType::Unauthorized,
                format!("Authorization header is invalid: {msg}"),
            ),
            Self::JwksError(msg) => (
                StatusCode::BAD_GATEWAY,
                response::ErrorType::BadGateway,
                format!("UAA token keys are unavailable: {msg}"),
            ),
        };

        json_response! {
            status: status,
            error: response::Error::new(type_, message)
        }
    }
}
