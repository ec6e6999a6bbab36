use std::sync::Arc;

use async_trait::async_trait;
use notifications_core::model::{Audience, Dispatch, Options, Recipient, Response};

use crate::service::{
    collaborator::{FindsUserGuids, OrganizationLoader, SpaceLoader, TokenLoader},
    database::Connection,
    error::Result,
    job_enqueuer::JobEnqueuer,
    strategy::{ensure_target, enqueue_context, Strategy},
};

fn space_endorsement(space: &str, organization: &str) -> String {
    format!(
        "You received this message because you belong to the {space} space in the {organization} \
         organization."
    )
}

/// Notifies every member of a space.
pub struct SpaceStrategy<C>
where
    C: Connection,
{
    token_loader: Arc<dyn TokenLoader>,
    space_loader: Arc<dyn SpaceLoader>,
    organization_loader: Arc<dyn OrganizationLoader>,
    finds_user_guids: Arc<dyn FindsUserGuids>,
    enqueuer: Arc<dyn JobEnqueuer<C>>,
}

impl<C> SpaceStrategy<C>
where
    C: Connection,
{
    #[must_use]
    pub fn new(
        token_loader: Arc<dyn TokenLoader>,
        space_loader: Arc<dyn SpaceLoader>,
        organization_loader: Arc<dyn OrganizationLoader>,
        finds_user_guids: Arc<dyn FindsUserGuids>,
        enqueuer: Arc<dyn JobEnqueuer<C>>,
    ) -> Self {
        Self { token_loader, space_loader, organization_loader, finds_user_guids, enqueuer }
    }
}

#[async_trait]
impl<C> Strategy<C> for SpaceStrategy<C>
where
    C: Connection,
{
    fn audience(&self) -> Audience { Audience::Space }

    #[tracing::instrument(skip_all, fields(space_guid = %dispatch.guid))]
    async fn dispatch(&self, connection: &C, dispatch: Dispatch) -> Result<Vec<Response>> {
        ensure_target(&dispatch, Audience::Space)?;

        let token = self.token_loader.load().await?;
        let space = self.space_loader.load_space(&dispatch.guid, &token).await?;
        let organization =
            self.organization_loader.load_organization(&space.organization_guid, &token).await?;
        let user_guids =
            self.finds_user_guids.user_guids_belonging_to_space(&dispatch.guid, &token).await?;
        tracing::info!("Notifying {} members of space {}", user_guids.len(), space.name);

        let options = Options::new(&dispatch, space_endorsement(&space.name, &organization.name));
        let context = enqueue_context(&dispatch, space, organization, "");

        self.enqueuer.enqueue(connection, Recipient::users(user_guids), options, context).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use notifications_core::model::{Client, Kind, Message, Organization, Space, VcapRequest};

    use super::*;
    use crate::service::{
        error::Error,
        job_enqueuer::DeliveryJobEnqueuer,
        testing::{
            boom, request_received, FakeConnection, FakeDirectory, FakeGuidGenerator,
            FakeJobEnqueuer, FakeMessageStatusStore, FakeQueue, FakeTokenLoader, FakeTransaction,
        },
    };

    struct Fixture {
        token_loader: Arc<FakeTokenLoader>,
        directory: Arc<FakeDirectory>,
        enqueuer: Arc<FakeJobEnqueuer>,
        strategy: SpaceStrategy<FakeConnection>,
    }

    fn space() -> Space {
        Space {
            guid: "space-001".to_string(),
            name: "production".to_string(),
            organization_guid: "org-001".to_string(),
        }
    }

    fn organization() -> Organization {
        Organization { guid: "org-001".to_string(), name: "the-org".to_string() }
    }

    fn fixture() -> Fixture {
        let token_loader = Arc::new(FakeTokenLoader::default());
        let directory = Arc::new(FakeDirectory {
            space_users: HashMap::from([(
                "space-001".to_string(),
                vec!["user-123".to_string(), "user-456".to_string(), "user-789".to_string()],
            )]),
            spaces: HashMap::from([("space-001".to_string(), space())]),
            organizations: HashMap::from([("org-001".to_string(), organization())]),
            ..FakeDirectory::default()
        });
        let enqueuer = Arc::new(FakeJobEnqueuer::default());
        let strategy = SpaceStrategy::<FakeConnection>::new(
            token_loader.clone(),
            directory.clone(),
            directory.clone(),
            directory.clone(),
            enqueuer.clone(),
        );
        Fixture { token_loader, directory, enqueuer, strategy }
    }

    fn dispatch(guid: &str) -> Dispatch {
        Dispatch {
            guid: guid.to_string(),
            kind: Kind {
                id: "welcome_user".to_string(),
                description: "Your Official Welcome".to_string(),
                critical: false,
            },
            client: Client { id: "mister-client".to_string(), description: "Welcome system".to_string() },
            message: Message {
                subject: "this is the subject".to_string(),
                text: "Welcome to the system, now get off my lawn.".to_string(),
                ..Message::default()
            },
            vcap_request: VcapRequest {
                id: "some-vcap-request-id".to_string(),
                receipt_time: request_received(),
            },
            campaign_id: Some("some-campaign".to_string()),
            ..Dispatch::default()
        }
    }

    #[tokio::test]
    async fn test_enqueues_every_space_member_with_space_context() {
        let Fixture { enqueuer, strategy, .. } = fixture();

        let responses =
            strategy.dispatch(&FakeConnection::default(), dispatch("space-001")).await.unwrap();

        assert_eq!(responses.len(), 3);

        let call = enqueuer.last_call();
        assert_eq!(call.recipients, Recipient::users(["user-123", "user-456", "user-789"]));
        assert_eq!(
            call.options.endorsement,
            "You received this message because you belong to the production space in the \
             the-org organization."
        );
        assert_eq!(call.context.space, space());
        assert_eq!(call.context.organization, organization());
        assert_eq!(call.context.client_id, "mister-client");
        assert_eq!(call.context.campaign_id.as_deref(), Some("some-campaign"));
        assert_eq!(call.context.request_received, request_received());
    }

    #[tokio::test]
    async fn test_delivered_jobs_carry_the_space_and_organization() {
        let Fixture { directory, .. } = fixture();
        let queue = Arc::new(FakeQueue::default());
        let store = Arc::new(FakeMessageStatusStore::default());
        let enqueuer = DeliveryJobEnqueuer::<FakeTransaction>::new(
            queue.clone(),
            Arc::new(FakeGuidGenerator::default()),
            store.clone(),
        );
        let strategy = SpaceStrategy::<FakeConnection>::new(
            Arc::new(FakeTokenLoader::default()),
            directory.clone(),
            directory.clone(),
            directory,
            Arc::new(enqueuer),
        );

        let responses =
            strategy.dispatch(&FakeConnection::default(), dispatch("space-001")).await.unwrap();

        let deliveries = queue.deliveries();
        assert_eq!(deliveries.len(), 3);
        assert_eq!(
            deliveries.iter().map(|delivery| delivery.recipient.identity()).collect::<Vec<_>>(),
            vec!["user-123", "user-456", "user-789"]
        );
        for delivery in &deliveries {
            assert_eq!(delivery.space, space());
            assert_eq!(delivery.organization, organization());
            assert_eq!(delivery.client_id, "mister-client");
            assert_eq!(delivery.campaign_id.as_deref(), Some("some-campaign"));
        }

        let message_ids =
            responses.iter().map(|response| response.notification_id.as_str()).collect::<Vec<_>>();
        assert_eq!(
            message_ids,
            deliveries.iter().map(|delivery| delivery.message_id.as_str()).collect::<Vec<_>>()
        );
        let records = store.records();
        assert_eq!(message_ids, records.iter().map(|record| record.id.as_str()).collect::<Vec<_>>());
        assert!(records
            .iter()
            .all(|record| record.campaign_id.as_deref() == Some("some-campaign")));
    }

    #[tokio::test]
    async fn test_unknown_space_is_not_found() {
        let Fixture { enqueuer, strategy, .. } = fixture();

        let err =
            strategy.dispatch(&FakeConnection::default(), dispatch("space-404")).await.unwrap_err();

        assert!(matches!(err, Error::CloudControllerNotFound { resource: "Space", .. }));
        assert!(enqueuer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_returns_the_token_loader_error() {
        let Fixture { token_loader, directory, enqueuer, strategy } = fixture();
        token_loader.fail();

        let err =
            strategy.dispatch(&FakeConnection::default(), dispatch("space-001")).await.unwrap_err();

        assert_eq!(err.to_string(), boom().to_string());
        assert_eq!(directory.call_count(), 0);
        assert!(enqueuer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_returns_the_resolver_error() {
        let Fixture { directory, enqueuer, strategy, .. } = fixture();
        directory.fail();

        let err =
            strategy.dispatch(&FakeConnection::default(), dispatch("space-001")).await.unwrap_err();

        assert_eq!(err.to_string(), boom().to_string());
        assert!(enqueuer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_a_missing_space_guid() {
        let Fixture { token_loader, enqueuer, strategy, .. } = fixture();

        let err = strategy.dispatch(&FakeConnection::default(), dispatch("")).await.unwrap_err();

        assert!(matches!(err, Error::MissingTarget { audience: "space" }));
        assert_eq!(token_loader.load_count(), 0);
        assert!(enqueuer.calls().is_empty());
    }
}
