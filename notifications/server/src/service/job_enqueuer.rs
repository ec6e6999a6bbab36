use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notifications_core::model::{
    Delivery, MessageStatus, MessageStatusRecord, Options, Organization, Recipient, Response, Space,
    DELIVERY_JOB_TYPE,
};

use crate::service::{
    database::{Connection, Transaction},
    error::Result,
    guid::GuidGenerator,
    message_status::MessageStatusStore,
    queue::{Job, Queue},
};

/// Context shared by every delivery of one dispatch.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EnqueueContext {
    pub space: Space,
    pub organization: Organization,
    pub client_id: String,
    pub uaa_host: String,
    pub scope: String,
    pub vcap_request_id: String,
    pub request_received: DateTime<Utc>,
    pub campaign_id: Option<String>,
}

#[async_trait]
pub trait JobEnqueuer<C>: Send + Sync
where
    C: Connection,
{
    /// Queues one delivery per recipient and records each as `queued`.
    ///
    /// Returns one response per recipient when every status row commits and
    /// an empty list otherwise. Jobs written before a failure stay in the
    /// queue, so the worker must accept jobs without a status row.
    ///
    /// # Errors
    /// Returns an error only if the transaction can not be started
    async fn enqueue(
        &self,
        connection: &C,
        recipients: Vec<Recipient>,
        options: Options,
        context: EnqueueContext,
    ) -> Result<Vec<Response>>;
}

pub struct DeliveryJobEnqueuer<Tx> {
    queue: Arc<dyn Queue>,
    guid_generator: Arc<dyn GuidGenerator>,
    message_status_store: Arc<dyn MessageStatusStore<Tx>>,
}

impl<Tx> DeliveryJobEnqueuer<Tx> {
    #[must_use]
    pub fn new(
        queue: Arc<dyn Queue>,
        guid_generator: Arc<dyn GuidGenerator>,
        message_status_store: Arc<dyn MessageStatusStore<Tx>>,
    ) -> Self {
        Self { queue, guid_generator, message_status_store }
    }
}

impl<Tx> DeliveryJobEnqueuer<Tx>
where
    Tx: Transaction,
{
    async fn roll_back(transaction: Tx) {
        if let Err(err) = transaction.rollback().await {
            tracing::warn!("{err}");
        }
    }
}

#[async_trait]
impl<C> JobEnqueuer<C> for DeliveryJobEnqueuer<C::Transaction>
where
    C: Connection,
{
    #[tracing::instrument(
        skip_all,
        fields(
            recipients = recipients.len(),
            vcap_request_id = %context.vcap_request_id,
        )
    )]
    async fn enqueue(
        &self,
        connection: &C,
        recipients: Vec<Recipient>,
        options: Options,
        context: EnqueueContext,
    ) -> Result<Vec<Response>> {
        let mut transaction = connection.begin().await?;
        let mut responses = Vec::with_capacity(recipients.len());

        for recipient in recipients {
            let message_id = self.guid_generator.generate();
            let delivery = Delivery {
                job_type: DELIVERY_JOB_TYPE.to_string(),
                options: options.clone(),
                recipient,
                space: context.space.clone(),
                organization: context.organization.clone(),
                client_id: context.client_id.clone(),
                message_id: message_id.clone(),
                uaa_host: context.uaa_host.clone(),
                scope: context.scope.clone(),
                vcap_request_id: context.vcap_request_id.clone(),
                request_received: context.request_received,
                campaign_id: context.campaign_id.clone(),
            };

            let queued = match Job::from_delivery(&delivery) {
                Ok(job) => self.queue.enqueue(job).await,
                Err(err) => Err(err),
            };
            if let Err(err) = queued {
                tracing::error!(message_id = %message_id, "{err}");
                Self::roll_back(transaction).await;
                return Ok(Vec::new());
            }

            let record = MessageStatusRecord::queued(message_id.as_str(), context.campaign_id.clone());
            if let Err(err) = self.message_status_store.insert(&mut transaction, &record).await {
                tracing::error!(message_id = %message_id, "{err}");
                Self::roll_back(transaction).await;
                return Ok(Vec::new());
            }

            responses.push(Response {
                status: MessageStatus::Queued,
                recipient: delivery.recipient.identity().to_string(),
                notification_id: message_id,
                vcap_request_id: context.vcap_request_id.clone(),
            });
        }

        if let Err(err) = transaction.commit().await {
            tracing::error!("{err}");
            return Ok(Vec::new());
        }

        tracing::info!("Enqueued {} deliveries", responses.len());
        Ok(responses)
    }
}
