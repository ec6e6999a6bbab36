use async_trait::async_trait;
use notifications_core::model::{Client, Kind};
use sqlx::PgPool;

use crate::service::{
    database::{Connection, Transaction},
    error::Result,
    sql_executor::RegistrationSqlExecutor,
};

/// Registered clients and the kinds of notification they send.
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// Upserts `client` and every kind of `kinds`. When `kinds` is given the
    /// client's kinds missing from it are removed.
    async fn register(&self, client: &Client, kinds: Option<&[Kind]>) -> Result<()>;

    /// Loads the client and kind a notification is sent as. Unknown ones are
    /// created without description, and an unknown kind is not critical.
    ///
    /// An empty `kind_id` yields an empty kind without touching the kinds.
    async fn find_or_create(&self, client_id: &str, kind_id: &str) -> Result<(Client, Kind)>;
}

#[derive(Clone, Debug)]
pub struct PostgresClientRegistry {
    database: PgPool,
}

impl PostgresClientRegistry {
    #[must_use]
    pub const fn new(database: PgPool) -> Self { Self { database } }
}

#[async_trait]
impl ClientRegistry for PostgresClientRegistry {
    #[tracing::instrument(skip_all, fields(client_id = %client.id))]
    async fn register(&self, client: &Client, kinds: Option<&[Kind]>) -> Result<()> {
        let mut transaction = Connection::begin(&self.database).await?;

        (&mut *transaction).upsert_client(client).await?;
        if let Some(kinds) = kinds {
            for kind in kinds {
                (&mut *transaction).upsert_kind(&client.id, kind).await?;
            }
            let kept = kinds.iter().map(|kind| kind.id.clone()).collect::<Vec<_>>();
            let trimmed = (&mut *transaction).trim_kinds(&client.id, &kept).await?;
            if trimmed > 0 {
                tracing::info!("Removed {trimmed} unregistered kinds");
            }
        }

        Transaction::commit(transaction).await
    }

    #[tracing::instrument(skip(self))]
    async fn find_or_create(&self, client_id: &str, kind_id: &str) -> Result<(Client, Kind)> {
        let mut transaction = Connection::begin(&self.database).await?;

        let client = (&mut *transaction).find_or_create_client(client_id).await?;
        let kind = if kind_id.is_empty() {
            Kind::default()
        } else {
            (&mut *transaction).find_or_create_kind(client_id, kind_id).await?
        };

        Transaction::commit(transaction).await?;
        Ok((client, kind))
    }
}
