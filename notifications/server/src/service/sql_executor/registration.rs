use async_trait::async_trait;
use notifications_core::model::{Client, Kind};
use snafu::ResultExt;
use sqlx::{Executor, Postgres};

use crate::service::error::{self, Result};

#[async_trait]
pub trait RegistrationSqlExecutor {
    async fn upsert_client(&mut self, client: &Client) -> Result<()>;

    async fn upsert_kind(&mut self, client_id: &str, kind: &Kind) -> Result<()>;

    /// Deletes the kinds of `client_id` whose id is not in `kept`.
    async fn trim_kinds(&mut self, client_id: &str, kept: &[String]) -> Result<u64>;

    async fn find_or_create_client(&mut self, client_id: &str) -> Result<Client>;

    async fn find_or_create_kind(&mut self, client_id: &str, kind_id: &str) -> Result<Kind>;
}

#[async_trait]
impl<E> RegistrationSqlExecutor for E
where
    E: Send,
    for<'c> &'c mut E: Executor<'c, Database = Postgres>,
{
    async fn upsert_client(&mut self, client: &Client) -> Result<()> {
        let _result = sqlx::query(include_str!("../../../sql/client/upsert_client.sql"))
            .bind(&client.id)
            .bind(&client.description)
            .execute(&mut *self)
            .await
            .context(error::UpsertClientSnafu { client_id: client.id.clone() })?;

        Ok(())
    }

    async fn upsert_kind(&mut self, client_id: &str, kind: &Kind) -> Result<()> {
        let _result = sqlx::query(include_str!("../../../sql/kind/upsert_kind.sql"))
            .bind(&kind.id)
            .bind(client_id)
            .bind(&kind.description)
            .bind(kind.critical)
            .execute(&mut *self)
            .await
            .context(error::UpsertKindSnafu { client_id, kind_id: kind.id.clone() })?;

        Ok(())
    }

    async fn trim_kinds(&mut self, client_id: &str, kept: &[String]) -> Result<u64> {
        let result = sqlx::query(include_str!("../../../sql/kind/trim_kinds.sql"))
            .bind(client_id)
            .bind(kept)
            .execute(&mut *self)
            .await
            .context(error::TrimKindsSnafu { client_id })?;

        Ok(result.rows_affected())
    }

    async fn find_or_create_client(&mut self, client_id: &str) -> Result<Client> {
        let (id, description) = sqlx::query_as::<_, (String, String)>(include_str!(
            "../../../sql/client/find_or_create_client.sql"
        ))
        .bind(client_id)
        .fetch_one(&mut *self)
        .await
        .context(error::FindClientSnafu { client_id })?;

        Ok(Client { id, description })
    }

    async fn find_or_create_kind(&mut self, client_id: &str, kind_id: &str) -> Result<Kind> {
        let (id, description, critical) = sqlx::query_as::<_, (String, String, bool)>(
            include_str!("../../../sql/kind/find_or_create_kind.sql"),
        )
        .bind(kind_id)
        .bind(client_id)
        .fetch_one(&mut *self)
        .await
        .context(error::FindKindSnafu { client_id, kind_id })?;

        Ok(Kind { id, description, critical })
    }
}
