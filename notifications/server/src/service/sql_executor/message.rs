use async_trait::async_trait;
use notifications_core::model::MessageStatusRecord;
use snafu::ResultExt;
use sqlx::{Executor, Postgres};

use crate::service::error::{self, Result};

#[async_trait]
pub trait MessageSqlExecutor {
    async fn insert_message(&mut self, record: &MessageStatusRecord) -> Result<()>;
}

#[async_trait]
impl<E> MessageSqlExecutor for E
where
    E: Send,
    for<'c> &'c mut E: Executor<'c, Database = Postgres>,
{
    async fn insert_message(&mut self, record: &MessageStatusRecord) -> Result<()> {
        let _result = sqlx::query(include_str!("../../../sql/message/insert_message.sql"))
            .bind(&record.id)
            .bind(record.status.as_str())
            .bind(record.campaign_id.as_deref())
            .execute(&mut *self)
            .await
            .context(error::InsertMessageStatusSnafu { message_id: record.id.clone() })?;

        Ok(())
    }
}
