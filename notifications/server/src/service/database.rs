use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::{PgPool, Postgres};

use crate::service::error::{self, Result};

pub type PgTransaction = sqlx::Transaction<'static, Postgres>;

/// Source of transactions for one notify call.
#[async_trait]
pub trait Connection: Send + Sync + 'static {
    type Transaction: Transaction;

    async fn begin(&self) -> Result<Self::Transaction>;
}

/// A unit of work that is rolled back when dropped without a commit.
#[async_trait]
pub trait Transaction: Send + Sized + 'static {
    async fn commit(self) -> Result<()>;

    async fn rollback(self) -> Result<()>;
}

#[async_trait]
impl Connection for PgPool {
    type Transaction = PgTransaction;

    async fn begin(&self) -> Result<Self::Transaction> {
        sqlx::Pool::begin(self).await.context(error::BeginTransactionSnafu)
    }
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn commit(self) -> Result<()> {
        sqlx::Transaction::commit(self).await.context(error::CommitTransactionSnafu)
    }

    async fn rollback(self) -> Result<()> {
        sqlx::Transaction::rollback(self).await.context(error::RollBackTransactionSnafu)
    }
}
