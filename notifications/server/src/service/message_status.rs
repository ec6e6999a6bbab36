use async_trait::async_trait;
use notifications_core::model::MessageStatusRecord;

use crate::service::{database::PgTransaction, error::Result, sql_executor::MessageSqlExecutor};

/// Tracking rows of queued jobs, written inside the caller's transaction.
#[async_trait]
pub trait MessageStatusStore<Tx>: Send + Sync {
    async fn insert(&self, transaction: &mut Tx, record: &MessageStatusRecord) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PostgresMessageStatusStore;

#[async_trait]
impl MessageStatusStore<PgTransaction> for PostgresMessageStatusStore {
    async fn insert(
        &self,
        transaction: &mut PgTransaction,
        record: &MessageStatusRecord,
    ) -> Result<()> {
        (&mut **transaction).insert_message(record).await
    }
}
