use std::sync::Arc;

use async_trait::async_trait;
use notifications_core::model::{
    Audience, Dispatch, Options, Organization, Recipient, Response, Space,
};

use crate::service::{
    database::Connection,
    error::Result,
    job_enqueuer::JobEnqueuer,
    strategy::{ensure_target, enqueue_context, Strategy},
};

pub const USER_ENDORSEMENT: &str = "This message was sent directly to you.";

/// Notifies the single user named by the dispatch GUID.
pub struct UserStrategy<C>
where
    C: Connection,
{
    enqueuer: Arc<dyn JobEnqueuer<C>>,
}

impl<C> UserStrategy<C>
where
    C: Connection,
{
    #[must_use]
    pub fn new(enqueuer: Arc<dyn JobEnqueuer<C>>) -> Self { Self { enqueuer } }
}

#[async_trait]
impl<C> Strategy<C> for UserStrategy<C>
where
    C: Connection,
{
    fn audience(&self) -> Audience { Audience::User }

    #[tracing::instrument(skip_all, fields(user_guid = %dispatch.guid))]
    async fn dispatch(&self, connection: &C, dispatch: Dispatch) -> Result<Vec<Response>> {
        ensure_target(&dispatch, Audience::User)?;

        let options = Options::new(&dispatch, USER_ENDORSEMENT);
        let context = enqueue_context(&dispatch, Space::default(), Organization::default(), "");

        self.enqueuer
            .enqueue(connection, vec![Recipient::user(dispatch.guid.as_str())], options, context)
            .await
    }
}
