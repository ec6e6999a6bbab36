// FIXME: remove this after this utoipa issue is fixed: https://github.com/juhaku/utoipa/pull/1423
#![allow(clippy::needless_for_each)]
mod error;
mod notify;
mod params;
mod registration;

use axum::{middleware, routing, Extension, Router};
use notifications_axum::response::EncapsulatedJson;
use notifications_core::{model::Response, ServerInfo};
use utoipa::OpenApi;

pub use self::{
    error::{Error, Result},
    params::{KindParams, NotifyParams, RegistrationParams},
};
use crate::{web::middleware::jwt_auth_middleware, ServiceState};

/// Notify routes behind UAA token authentication.
pub fn api_router(service_state: &ServiceState) -> Router {
    notify_router(service_state).layer(middleware::from_fn_with_state(
        service_state.jwks_client.clone(),
        jwt_auth_middleware,
    ))
}

/// Notify and registration routes; expects the calling client in the
/// request extensions.
pub fn notify_router(service_state: &ServiceState) -> Router {
    Router::new()
        .route("/users/:user_id", routing::post(notify::notify_user))
        .route("/spaces/:space_id", routing::post(notify::notify_space))
        .route("/organizations/:org_id", routing::post(notify::notify_organization))
        .route("/everyone", routing::post(notify::notify_everyone))
        .route("/uaa_scopes/:scope", routing::post(notify::notify_uaa_scope))
        .route("/emails", routing::post(notify::notify_email))
        .route("/registration", routing::put(registration::register))
        .with_state(service_state.clone())
}

/// Get server info
#[utoipa::path(
    get,
    operation_id = "get_server_info",
    path = "/info",
    responses(
        (status = 200, body = ServerInfo)
    )
)]
pub async fn server_info(
    Extension(server_info): Extension<ServerInfo>,
) -> Result<EncapsulatedJson<ServerInfo>> {
    Ok(EncapsulatedJson::ok(server_info))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        server_info,
        notify::notify_user,
        notify::notify_space,
        notify::notify_organization,
        notify::notify_everyone,
        notify::notify_uaa_scope,
        notify::notify_email,
        registration::register,
    ),
    components(schemas(
        ServerInfo,
        NotifyParams,
        RegistrationParams,
        KindParams,
        Response,
        notifications_core::model::MessageStatus,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Notify", description = "Notification dispatch endpoints"),
        (name = "Registration", description = "Client and kind registration")
    )
)]
pub struct ApiDoc;

/// Security scheme for UAA bearer tokens
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
