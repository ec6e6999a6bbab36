use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::{Executor, Postgres};

use crate::service::error::{self, Result};

#[async_trait]
pub trait JobSqlExecutor {
    /// Appends a job to `queue_name` and returns its row ID.
    async fn insert_job(&mut self, queue_name: &str, payload: &str) -> Result<i64>;
}

#[async_trait]
impl<E> JobSqlExecutor for E
where
    E: Send,
    for<'c> &'c mut E: Executor<'c, Database = Postgres>,
{
    async fn insert_job(&mut self, queue_name: &str, payload: &str) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(include_str!("../../../sql/job/insert_job.sql"))
            .bind(queue_name)
            .bind(payload)
            .fetch_one(&mut *self)
            .await
            .context(error::InsertJobSnafu { queue_name: queue_name.to_string() })?;

        Ok(id)
    }
}
