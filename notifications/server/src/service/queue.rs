use async_trait::async_trait;
use notifications_core::model::Delivery;
use snafu::ResultExt;
use sqlx::PgPool;

use crate::service::{
    error::{self, Result},
    sql_executor::JobSqlExecutor,
};

pub const DEFAULT_QUEUE_NAME: &str = "deliveries";

/// Serialized payload of one queued job.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Job {
    payload: String,
}

impl Job {
    /// # Errors
    /// Returns an error if the delivery can not be serialized
    pub fn from_delivery(delivery: &Delivery) -> Result<Self> {
        let payload = serde_json::to_string(delivery).context(error::SerializeDeliverySnafu {
            message_id: delivery.message_id.clone(),
        })?;
        Ok(Self { payload })
    }

    #[inline]
    #[must_use]
    pub fn payload(&self) -> &str { &self.payload }
}

#[cfg(test)]
impl Job {
    pub(crate) fn decode<T>(&self) -> serde_json::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_str(&self.payload)
    }
}

/// Durable queue drained by the delivery worker. Writes are not part of any
/// caller transaction.
#[async_trait]
pub trait Queue: Send + Sync {
    async fn enqueue(&self, job: Job) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct PostgresQueue {
    pool: PgPool,
    queue_name: String,
}

impl PostgresQueue {
    #[inline]
    #[must_use]
    pub fn new(pool: PgPool, queue_name: impl Into<String>) -> Self {
        Self { pool, queue_name: queue_name.into() }
    }
}

#[async_trait]
impl Queue for PostgresQueue {
    async fn enqueue(&self, job: Job) -> Result<()> {
        let mut conn = self.pool.acquire().await.context(error::AcquireConnectionSnafu)?;

        let id = conn.insert_job(&self.queue_name, job.payload()).await?;
        tracing::debug!(job_id = id, queue_name = %self.queue_name, "Job enqueued");

        Ok(())
    }
}
