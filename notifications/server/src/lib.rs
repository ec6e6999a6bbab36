pub mod cloud_controller;
pub mod directory;
mod error;
pub mod service;
pub mod uaa_client;
mod web;

use std::{net::SocketAddr, sync::Arc};

use futures::{future::BoxFuture, FutureExt};
use notifications_core::{
    config::{CloudControllerConfig, Config, PostgresConfig, UaaConfig},
    ServerInfo,
};
use sigfinn::{ExitStatus, LifecycleManager, Shutdown};
use snafu::ResultExt;
use sqlx::{
    migrate::Migrator,
    postgres::{PgConnectOptions, PgPoolOptions},
    Executor, PgPool,
};
use tracing::Instrument;

use self::{
    cloud_controller::CloudControllerClient,
    directory::PlatformDirectory,
    service::{
        DeliveryJobEnqueuer, PgTransaction, PostgresClientRegistry, PostgresMessageStatusStore,
        PostgresQueue,
        StrategyDependencies, StrategyRegistry, UuidGenerator, DEFAULT_QUEUE_NAME,
    },
    uaa_client::UaaClient,
};
pub use self::{
    error::{Error, Result},
    web::{controller, middleware::JwksClient, ApiDoc, ServiceState},
};

const MIGRATOR: Migrator = Migrator { ignore_missing: true, ..sqlx::migrate!() };

/// # Errors
/// Returns errors when server fails to start
pub async fn serve_with_shutdown(config: Config, server_info: ServerInfo) -> Result<()> {
    let Config { web, postgres, uaa, cloud_controller, default_scopes } = config;

    let database = initialize_postgres_pool(&postgres).await?;

    let jwks_client = initialize_jwks_client(&uaa)?;

    let uaa_client = initialize_uaa_client(uaa)?;

    let cloud_controller_client = initialize_cloud_controller_client(cloud_controller)?;

    let strategies = initialize_strategies(
        database.clone(),
        uaa_client,
        cloud_controller_client,
        default_scopes,
    );

    let registry = Arc::new(PostgresClientRegistry::new(database.clone()));

    let service_state = ServiceState::new(database, strategies, registry, jwks_client);

    let lifecycle_manager = LifecycleManager::<Error>::new();

    let _handle = lifecycle_manager.spawn(
        "Http Server",
        create_web_http_server_future(web.listen_address, service_state, server_info),
    );

    if let Ok(Err(err)) = lifecycle_manager.serve().await {
        tracing::error!("{err}");
        Err(err)
    } else {
        Ok(())
    }
}

#[tracing::instrument(
    skip(password, database, ssl_mode, max_connections),
    fields(
        host = %host,
        port = port,
        username = %username
    )
)]
async fn initialize_postgres_pool(
    PostgresConfig {
        host,
        port,
        username,
        role,
        password,
        database,
        ssl_mode,
        max_connections,
        application_name,
    }: &PostgresConfig,
) -> Result<PgPool> {
    tracing::info!("Initializing database");

    let connect_opts = PgConnectOptions::new_without_pgpass()
        .host(host)
        .port(*port)
        .username(username)
        .password(password)
        .database(database)
        .ssl_mode(*ssl_mode);

    // append application name if provided
    let connect_opts = if let Some(app_name) = application_name {
        connect_opts.application_name(app_name)
    } else {
        connect_opts
    };

    let pool_opts = {
        let opts = PgPoolOptions::new().max_connections(*max_connections);

        if let Some(role) = role {
            let set_role = format!(r#"SET SESSION ROLE = "{role}";"#);
            opts.after_connect(move |conn, _meta| {
                let set_role = set_role.clone();
                async move {
                    let _ = conn.execute(set_role.as_str()).await?;
                    Ok(())
                }
                .boxed()
            })
        } else {
            opts
        }
    };
    let pool =
        pool_opts.connect_with(connect_opts).await.context(error::InitializePostgresPoolSnafu {
            host: host.to_string(),
            port: *port,
            username: username.to_string(),
            database: database.to_string(),
        })?;

    MIGRATOR
        .run(&pool)
        .instrument(tracing::info_span!("migrate"))
        .await
        .context(error::MigrateSchemaSnafu)?;

    Ok(pool)
}

#[tracing::instrument(skip_all, fields(host = %uaa.host))]
fn initialize_jwks_client(uaa: &UaaConfig) -> Result<JwksClient> {
    tracing::info!("Initializing JWKS client");

    let jwks_client = JwksClient::new(&uaa.host, uaa.verify_ssl).map_err(|err| {
        Error::InitializeJwksClient { message: format!("Failed to create JWKS client: {err}") }
    })?;
    tracing::info!("UAA token keys endpoint: {}", jwks_client.jwks_url());

    Ok(jwks_client)
}

#[tracing::instrument(skip_all, fields(host = %uaa.host, client_id = %uaa.client_id))]
fn initialize_uaa_client(uaa: UaaConfig) -> Result<UaaClient> {
    tracing::info!("Initializing UAA client");

    UaaClient::new(uaa).context(error::InitializeUaaClientSnafu)
}

#[tracing::instrument(skip_all, fields(url = %cloud_controller.url))]
fn initialize_cloud_controller_client(
    cloud_controller: CloudControllerConfig,
) -> Result<CloudControllerClient> {
    tracing::info!("Initializing Cloud Controller client");

    CloudControllerClient::new(cloud_controller).context(error::InitializeCloudControllerClientSnafu)
}

fn initialize_strategies(
    database: PgPool,
    uaa_client: UaaClient,
    cloud_controller_client: CloudControllerClient,
    default_scopes: Vec<String>,
) -> StrategyRegistry<PgPool> {
    tracing::info!("Registering notify strategies, default scopes: {default_scopes:?}");

    let enqueuer = DeliveryJobEnqueuer::<PgTransaction>::new(
        Arc::new(PostgresQueue::new(database, DEFAULT_QUEUE_NAME)),
        Arc::new(UuidGenerator),
        Arc::new(PostgresMessageStatusStore),
    );
    let directory =
        Arc::new(PlatformDirectory::new(cloud_controller_client.clone(), uaa_client.clone()));
    let uaa_client = Arc::new(uaa_client);
    let cloud_controller_client = Arc::new(cloud_controller_client);

    StrategyRegistry::new(StrategyDependencies {
        token_loader: uaa_client.clone(),
        zoned_token_loader: uaa_client.clone(),
        finds_user_guids: directory,
        all_user_guids: uaa_client,
        space_loader: cloud_controller_client.clone(),
        organization_loader: cloud_controller_client,
        enqueuer: Arc::new(enqueuer),
        default_scopes,
    })
}

fn create_web_http_server_future(
    listen_address: SocketAddr,
    service_state: ServiceState,
    server_info: ServerInfo,
) -> impl FnOnce(Shutdown) -> BoxFuture<'static, ExitStatus<Error>> {
    move |shutdown_signal| {
        async move {
            tracing::info!("Listen Web HTTP server endpoint on {listen_address}");

            let result =
                web::new_api_server(listen_address, service_state, server_info, shutdown_signal)
                    .await;

            match result {
                Ok(()) => {
                    tracing::info!("HTTP server is shut down gracefully");
                    ExitStatus::Success
                }
                Err(err) => ExitStatus::FatalError(Error::from(err)),
            }
        }
        .boxed()
    }
}
