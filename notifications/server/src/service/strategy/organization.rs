use std::sync::Arc;

use async_trait::async_trait;
use notifications_core::model::{
    Audience, Dispatch, Options, OrganizationRole, Recipient, Response, Space,
};

use crate::service::{
    collaborator::{FindsUserGuids, OrganizationLoader, TokenLoader},
    database::Connection,
    error::Result,
    job_enqueuer::JobEnqueuer,
    strategy::{ensure_target, enqueue_context, Strategy},
};

fn organization_endorsement(organization: &str, role: Option<OrganizationRole>) -> String {
    match role {
        Some(role) => format!(
            "You received this message because you are an {role} in the {organization} \
             organization."
        ),
        None => format!(
            "You received this message because you belong to the {organization} organization."
        ),
    }
}

/// Notifies every member of an organization, or only the holders of one
/// organization role.
pub struct OrganizationStrategy<C>
where
    C: Connection,
{
    token_loader: Arc<dyn TokenLoader>,
    organization_loader: Arc<dyn OrganizationLoader>,
    finds_user_guids: Arc<dyn FindsUserGuids>,
    enqueuer: Arc<dyn JobEnqueuer<C>>,
}

impl<C> OrganizationStrategy<C>
where
    C: Connection,
{
    #[must_use]
    pub fn new(
        token_loader: Arc<dyn TokenLoader>,
        organization_loader: Arc<dyn OrganizationLoader>,
        finds_user_guids: Arc<dyn FindsUserGuids>,
        enqueuer: Arc<dyn JobEnqueuer<C>>,
    ) -> Self {
        Self { token_loader, organization_loader, finds_user_guids, enqueuer }
    }
}

#[async_trait]
impl<C> Strategy<C> for OrganizationStrategy<C>
where
    C: Connection,
{
    fn audience(&self) -> Audience { Audience::Organization }

    #[tracing::instrument(skip_all, fields(organization_guid = %dispatch.guid, role = ?dispatch.role))]
    async fn dispatch(&self, connection: &C, dispatch: Dispatch) -> Result<Vec<Response>> {
        ensure_target(&dispatch, Audience::Organization)?;

        let token = self.token_loader.load().await?;
        let organization =
            self.organization_loader.load_organization(&dispatch.guid, &token).await?;
        let user_guids = self
            .finds_user_guids
            .user_guids_belonging_to_organization(&dispatch.guid, dispatch.role, &token)
            .await?;
        tracing::info!("Notifying {} members of organization {}", user_guids.len(), organization.name);

        let options =
            Options::new(&dispatch, organization_endorsement(&organization.name, dispatch.role));
        let context = enqueue_context(&dispatch, Space::default(), organization, "");

        self.enqueuer.enqueue(connection, Recipient::users(user_guids), options, context).await
    }
}
