pub mod controller;
pub mod error;
pub mod extractor;
pub mod middleware;

use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{
    extract::Request, http, response::IntoResponse, routing, Extension, Json, Router, ServiceExt,
};
use notifications_axum::{json_response, response::EncapsulatedJsonError};
use notifications_core::ServerInfo;
use snafu::ResultExt;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::{Layer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer, normalize_path::NormalizePathLayer, trace::TraceLayer,
};
use utoipa::OpenApi;

pub use self::{controller::ApiDoc, error::Error};
use crate::service::{ClientRegistry, StrategyRegistry};

pub async fn new_api_server<ShutdownSignal>(
    socket_address: SocketAddr,
    service_state: ServiceState,
    server_info: ServerInfo,
    shutdown_signal: ShutdownSignal,
) -> Result<(), Error>
where
    ShutdownSignal: Future<Output = ()> + Send + 'static,
{
    let middleware_stack =
        ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CompressionLayer::new());

    let router = {
        let router = Router::new()
            // load balancer health check
            .route("/", routing::get(controller::server_info))
            .route("/info", routing::get(controller::server_info))
            .route("/openapi.json", routing::get(openapi_json))
            .merge(controller::api_router(&service_state))
            .layer(Extension(server_info))
            .layer(middleware_stack)
            .fallback(fallback);
        let router = NormalizePathLayer::trim_trailing_slash().layer(router);
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(router)
    };

    let listener = TcpListener::bind(&socket_address).await.context(error::BindTcpServerSnafu)?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|err| Error::ServeHttpServer { message: err.to_string() })
}

// SAFETY: `axum` handler must be async
#[allow(clippy::unused_async)]
async fn fallback(uri: http::Uri) -> axum::response::Response {
    json_response! {
        status: http::StatusCode::NOT_FOUND,
        error: notifications_axum::response::Error::new(
            notifications_axum::response::ErrorType::NotFound,
            format!("No route for {uri}"),
        )
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> { Json(ApiDoc::openapi()) }

#[derive(Clone)]
pub struct ServiceState {
    pub database: PgPool,
    pub strategies: StrategyRegistry<PgPool>,
    pub registry: Arc<dyn ClientRegistry>,
    pub jwks_client: middleware::JwksClient,
}

impl ServiceState {
    #[must_use]
    pub fn new(
        database: PgPool,
        strategies: StrategyRegistry<PgPool>,
        registry: Arc<dyn ClientRegistry>,
        jwks_client: middleware::JwksClient,
    ) -> Self {
        Self { database, strategies, registry, jwks_client }
    }
}
