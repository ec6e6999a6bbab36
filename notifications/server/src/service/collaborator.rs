use async_trait::async_trait;
use notifications_core::model::{Organization, OrganizationRole, Space, Token};

use crate::service::error::Result;

/// Loads a client-credentials token from the configured UAA.
#[async_trait]
pub trait TokenLoader: Send + Sync {
    async fn load(&self) -> Result<Token>;
}

/// Loads a client-credentials token from the UAA identity zone at `uaa_host`.
#[async_trait]
pub trait ZonedTokenLoader: Send + Sync {
    async fn load(&self, uaa_host: &str) -> Result<Token>;
}

#[async_trait]
pub trait FindsUserGuids: Send + Sync {
    async fn user_guids_belonging_to_space(
        &self,
        space_guid: &str,
        token: &Token,
    ) -> Result<Vec<String>>;

    /// Members of the organization, restricted to holders of `role` when
    /// given.
    async fn user_guids_belonging_to_organization(
        &self,
        organization_guid: &str,
        role: Option<OrganizationRole>,
        token: &Token,
    ) -> Result<Vec<String>>;

    async fn user_guids_belonging_to_scope(&self, scope: &str, token: &Token)
        -> Result<Vec<String>>;
}

#[async_trait]
pub trait AllUserGuids: Send + Sync {
    async fn all_user_guids(&self, token: &Token) -> Result<Vec<String>>;
}

#[async_trait]
pub trait SpaceLoader: Send + Sync {
    async fn load_space(&self, space_guid: &str, token: &Token) -> Result<Space>;
}

#[async_trait]
pub trait OrganizationLoader: Send + Sync {
    async fn load_organization(&self, organization_guid: &str, token: &Token)
        -> Result<Organization>;
}
