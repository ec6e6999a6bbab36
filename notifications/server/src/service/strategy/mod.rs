mod email;
mod everyone;
mod organization;
mod space;
mod uaa_scope;
mod user;

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use notifications_core::model::{Audience, Dispatch, Organization, Response, Space};

pub use self::{
    email::{EmailStrategy, EMAIL_ENDORSEMENT},
    everyone::{EveryoneStrategy, EVERYONE_ENDORSEMENT},
    organization::OrganizationStrategy,
    space::SpaceStrategy,
    uaa_scope::UaaScopeStrategy,
    user::{UserStrategy, USER_ENDORSEMENT},
};
use crate::service::{
    collaborator::{
        AllUserGuids, FindsUserGuids, OrganizationLoader, SpaceLoader, TokenLoader,
        ZonedTokenLoader,
    },
    database::Connection,
    error::{Error, Result},
    job_enqueuer::{EnqueueContext, JobEnqueuer},
};

/// Resolves one kind of audience into recipients and hands them to the job
/// enqueuer in a single batch.
#[async_trait]
pub trait Strategy<C>: Send + Sync
where
    C: Connection,
{
    fn audience(&self) -> Audience;

    /// # Errors
    /// Returns the token loader or resolver error unchanged, or a validation
    /// error raised before any job is queued
    async fn dispatch(&self, connection: &C, dispatch: Dispatch) -> Result<Vec<Response>>;
}

fn enqueue_context(
    dispatch: &Dispatch,
    space: Space,
    organization: Organization,
    scope: &str,
) -> EnqueueContext {
    EnqueueContext {
        space,
        organization,
        client_id: dispatch.client.id.clone(),
        uaa_host: dispatch.uaa_host.clone(),
        scope: scope.to_string(),
        vcap_request_id: dispatch.vcap_request.id.clone(),
        request_received: dispatch.vcap_request.receipt_time,
        campaign_id: dispatch.campaign_id.clone(),
    }
}

fn ensure_target(dispatch: &Dispatch, audience: Audience) -> Result<()> {
    if dispatch.guid.trim().is_empty() {
        return Err(Error::MissingTarget { audience: audience.as_str() });
    }
    Ok(())
}

/// Collaborators shared by the standard strategy set.
pub struct StrategyDependencies<C>
where
    C: Connection,
{
    pub token_loader: Arc<dyn TokenLoader>,
    pub zoned_token_loader: Arc<dyn ZonedTokenLoader>,
    pub finds_user_guids: Arc<dyn FindsUserGuids>,
    pub all_user_guids: Arc<dyn AllUserGuids>,
    pub space_loader: Arc<dyn SpaceLoader>,
    pub organization_loader: Arc<dyn OrganizationLoader>,
    pub enqueuer: Arc<dyn JobEnqueuer<C>>,
    pub default_scopes: Vec<String>,
}

/// Maps an audience tag to the strategy serving it.
pub struct StrategyRegistry<C>
where
    C: Connection,
{
    strategies: HashMap<Audience, Arc<dyn Strategy<C>>>,
}

impl<C> Default for StrategyRegistry<C>
where
    C: Connection,
{
    fn default() -> Self { Self { strategies: HashMap::new() } }
}

impl<C> Clone for StrategyRegistry<C>
where
    C: Connection,
{
    fn clone(&self) -> Self { Self { strategies: self.strategies.clone() } }
}

impl<C> StrategyRegistry<C>
where
    C: Connection,
{
    /// Registry holding one strategy per audience.
    #[must_use]
    pub fn new(dependencies: StrategyDependencies<C>) -> Self {
        let StrategyDependencies {
            token_loader,
            zoned_token_loader,
            finds_user_guids,
            all_user_guids,
            space_loader,
            organization_loader,
            enqueuer,
            default_scopes,
        } = dependencies;

        Self::default()
            .register(UserStrategy::new(enqueuer.clone()))
            .register(SpaceStrategy::new(
                token_loader.clone(),
                space_loader,
                organization_loader.clone(),
                finds_user_guids.clone(),
                enqueuer.clone(),
            ))
            .register(OrganizationStrategy::new(
                token_loader.clone(),
                organization_loader,
                finds_user_guids.clone(),
                enqueuer.clone(),
            ))
            .register(EveryoneStrategy::new(token_loader, all_user_guids, enqueuer.clone()))
            .register(UaaScopeStrategy::new(
                zoned_token_loader,
                finds_user_guids,
                enqueuer.clone(),
                default_scopes,
            ))
            .register(EmailStrategy::new(enqueuer))
    }

    /// Adds `strategy`, replacing any strategy registered for the same
    /// audience.
    #[must_use]
    pub fn register<S>(mut self, strategy: S) -> Self
    where
        S: Strategy<C> + 'static,
    {
        let _previous = self.strategies.insert(strategy.audience(), Arc::new(strategy));
        self
    }

    #[must_use]
    pub fn get(&self, audience: Audience) -> Option<Arc<dyn Strategy<C>>> {
        self.strategies.get(&audience).cloned()
    }
}
