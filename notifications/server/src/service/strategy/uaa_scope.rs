use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexSet;
use notifications_core::model::{
    Audience, Dispatch, Options, Organization, Recipient, Response, Space,
};

use crate::service::{
    collaborator::{FindsUserGuids, ZonedTokenLoader},
    database::Connection,
    error::{Error, Result},
    job_enqueuer::JobEnqueuer,
    strategy::{ensure_target, enqueue_context, Strategy},
};

fn scope_endorsement(scope: &str) -> String {
    format!("You received this message because you have the {scope} scope.")
}

// UAA scope names: `zones.<id>.admin`, `cloud_controller.read`, `uaa.resource:x`
fn is_valid_scope(scope: &str) -> bool {
    scope
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ':' | '/'))
}

/// Notifies every holder of a UAA scope. Scopes granted to all users are
/// refused.
pub struct UaaScopeStrategy<C>
where
    C: Connection,
{
    token_loader: Arc<dyn ZonedTokenLoader>,
    finds_user_guids: Arc<dyn FindsUserGuids>,
    enqueuer: Arc<dyn JobEnqueuer<C>>,
    default_scopes: IndexSet<String>,
}

impl<C> UaaScopeStrategy<C>
where
    C: Connection,
{
    #[must_use]
    pub fn new<I>(
        token_loader: Arc<dyn ZonedTokenLoader>,
        finds_user_guids: Arc<dyn FindsUserGuids>,
        enqueuer: Arc<dyn JobEnqueuer<C>>,
        default_scopes: I,
    ) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            token_loader,
            finds_user_guids,
            enqueuer,
            default_scopes: default_scopes.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl<C> Strategy<C> for UaaScopeStrategy<C>
where
    C: Connection,
{
    fn audience(&self) -> Audience { Audience::UaaScope }

    #[tracing::instrument(skip_all, fields(scope = %dispatch.guid, uaa_host = %dispatch.uaa_host))]
    async fn dispatch(&self, connection: &C, dispatch: Dispatch) -> Result<Vec<Response>> {
        ensure_target(&dispatch, Audience::UaaScope)?;

        let scope = dispatch.guid.as_str();
        if !is_valid_scope(scope) {
            return Err(Error::InvalidScope { scope: scope.to_string() });
        }
        if self.default_scopes.contains(scope) {
            return Err(Error::DefaultScope { scope: scope.to_string() });
        }

        let token = self.token_loader.load(&dispatch.uaa_host).await?;
        let user_guids = self.finds_user_guids.user_guids_belonging_to_scope(scope, &token).await?;
        tracing::info!("Notifying {} holders of scope {scope}", user_guids.len());

        let options = Options::new(&dispatch, scope_endorsement(scope));
        let context = enqueue_context(&dispatch, Space::default(), Organization::default(), scope);

        self.enqueuer.enqueue(connection, Recipient::users(user_guids), options, context).await
    }
}
