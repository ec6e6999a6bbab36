use async_trait::async_trait;
use notifications_core::model::{OrganizationRole, Token};

use crate::{
    cloud_controller::{self, CloudControllerClient},
    service::{self, FindsUserGuids},
    uaa_client::UaaClient,
};

/// Resolves audiences to user GUIDs: space and organization membership comes
/// from Cloud Controller, scope holders come from UAA.
#[derive(Clone)]
pub struct PlatformDirectory {
    cloud_controller: CloudControllerClient,
    uaa: UaaClient,
}

impl PlatformDirectory {
    #[must_use]
    pub const fn new(cloud_controller: CloudControllerClient, uaa: UaaClient) -> Self {
        Self { cloud_controller, uaa }
    }
}

#[async_trait]
impl FindsUserGuids for PlatformDirectory {
    async fn user_guids_belonging_to_space(
        &self,
        space_guid: &str,
        token: &Token,
    ) -> service::Result<Vec<String>> {
        self.cloud_controller
            .space_user_guids(space_guid, token)
            .await
            .map_err(|err| cloud_controller::into_service_error(err, "Space", space_guid))
    }

    async fn user_guids_belonging_to_organization(
        &self,
        organization_guid: &str,
        role: Option<OrganizationRole>,
        token: &Token,
    ) -> service::Result<Vec<String>> {
        self.cloud_controller
            .organization_user_guids(organization_guid, role, token)
            .await
            .map_err(|err| {
                cloud_controller::into_service_error(err, "Organization", organization_guid)
            })
    }

    async fn user_guids_belonging_to_scope(
        &self,
        scope: &str,
        token: &Token,
    ) -> service::Result<Vec<String>> {
        Ok(self.uaa.list_scope_member_guids(scope, token).await?)
    }
}
