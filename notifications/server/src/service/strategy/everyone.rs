use std::sync::Arc;

use async_trait::async_trait;
use notifications_core::model::{
    Audience, Dispatch, Options, Organization, Recipient, Response, Space,
};

use crate::service::{
    collaborator::{AllUserGuids, TokenLoader},
    database::Connection,
    error::Result,
    job_enqueuer::JobEnqueuer,
    strategy::{enqueue_context, Strategy},
};

pub const EVERYONE_ENDORSEMENT: &str = "This message was sent to everyone.";

/// Notifies every user known to UAA.
pub struct EveryoneStrategy<C>
where
    C: Connection,
{
    token_loader: Arc<dyn TokenLoader>,
    all_user_guids: Arc<dyn AllUserGuids>,
    enqueuer: Arc<dyn JobEnqueuer<C>>,
}

impl<C> EveryoneStrategy<C>
where
    C: Connection,
{
    #[must_use]
    pub fn new(
        token_loader: Arc<dyn TokenLoader>,
        all_user_guids: Arc<dyn AllUserGuids>,
        enqueuer: Arc<dyn JobEnqueuer<C>>,
    ) -> Self {
        Self { token_loader, all_user_guids, enqueuer }
    }
}

#[async_trait]
impl<C> Strategy<C> for EveryoneStrategy<C>
where
    C: Connection,
{
    fn audience(&self) -> Audience { Audience::Everyone }

    #[tracing::instrument(skip_all)]
    async fn dispatch(&self, connection: &C, dispatch: Dispatch) -> Result<Vec<Response>> {
        let token = self.token_loader.load().await?;
        let user_guids = self.all_user_guids.all_user_guids(&token).await?;
        tracing::info!("Notifying {} users", user_guids.len());

        let options = Options::new(&dispatch, EVERYONE_ENDORSEMENT);
        let context = enqueue_context(&dispatch, Space::default(), Organization::default(), "");

        self.enqueuer.enqueue(connection, Recipient::users(user_guids), options, context).await
    }
}
