pub mod error;

use std::time::Duration;

use async_trait::async_trait;
use notifications_core::{
    config::CloudControllerConfig,
    model::{Organization, OrganizationRole, Space, Token},
};
use serde::{de::DeserializeOwned, Deserialize};
use snafu::ResultExt;
use urlencoding::encode;

pub use self::error::{Error, Result};
use crate::service::{self, OrganizationLoader, SpaceLoader};

const RESULTS_PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct Metadata {
    guid: String,
}

#[derive(Debug, Deserialize)]
struct Resource<E> {
    metadata: Metadata,
    entity: E,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "E: Deserialize<'de>"))]
struct Page<E> {
    #[serde(default)]
    next_url: Option<String>,
    #[serde(default)]
    resources: Vec<Resource<E>>,
}

#[derive(Debug, Deserialize)]
struct SpaceEntity {
    name: String,
    organization_guid: String,
}

#[derive(Debug, Deserialize)]
struct OrganizationEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct IgnoredEntity {}

/// Cloud Controller v2 API client.
#[derive(Clone)]
pub struct CloudControllerClient {
    client: reqwest::Client,
    url: String,
}

impl CloudControllerClient {
    /// # Errors
    /// Returns an error if the HTTP client can not be built
    pub fn new(config: CloudControllerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .timeout(Duration::from_secs(30))
            .build()
            .context(error::InitializeClientSnafu)?;

        Ok(Self { client, url: config.url.trim_end_matches('/').to_string() })
    }

    /// # Errors
    /// Returns an error if the space does not exist or Cloud Controller fails
    pub async fn space(&self, space_guid: &str, token: &Token) -> Result<Space> {
        let Resource { metadata, entity } = self
            .get::<Resource<SpaceEntity>>(&format!("/v2/spaces/{}", encode(space_guid)), token)
            .await?;

        Ok(Space {
            guid: metadata.guid,
            name: entity.name,
            organization_guid: entity.organization_guid,
        })
    }

    /// # Errors
    /// Returns an error if the organization does not exist or Cloud Controller
    /// fails
    pub async fn organization(&self, organization_guid: &str, token: &Token) -> Result<Organization> {
        let Resource { metadata, entity } = self
            .get::<Resource<OrganizationEntity>>(
                &format!("/v2/organizations/{}", encode(organization_guid)),
                token,
            )
            .await?;

        Ok(Organization { guid: metadata.guid, name: entity.name })
    }

    /// # Errors
    /// Returns an error if Cloud Controller fails
    pub async fn space_user_guids(&self, space_guid: &str, token: &Token) -> Result<Vec<String>> {
        self.collect_guids(format!("/v2/users?q=space_guid:{}", encode(space_guid)), token).await
    }

    /// # Errors
    /// Returns an error if Cloud Controller fails
    pub async fn organization_user_guids(
        &self,
        organization_guid: &str,
        role: Option<OrganizationRole>,
        token: &Token,
    ) -> Result<Vec<String>> {
        let path = match role {
            Some(role) => {
                format!("/v2/organizations/{}/{}", encode(organization_guid), role.association())
            }
            None => format!("/v2/users?q=organization_guid:{}", encode(organization_guid)),
        };
        self.collect_guids(path, token).await
    }

    async fn collect_guids(&self, path: String, token: &Token) -> Result<Vec<String>> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut next = Some(format!("{path}{separator}results-per-page={RESULTS_PER_PAGE}"));
        let mut guids = Vec::new();

        while let Some(path) = next {
            let page = self.get::<Page<IgnoredEntity>>(&path, token).await?;
            guids.extend(page.resources.into_iter().map(|resource| resource.metadata.guid));
            next = page.next_url;
        }

        Ok(guids)
    }

    async fn get<T>(&self, path: &str, token: &Token) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token.access_token())
            .send()
            .await
            .context(error::SendRequestSnafu { url: url.clone() })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UnexpectedStatus { url, status: status.as_u16(), body });
        }

        response.json().await.context(error::DecodeResponseSnafu { url })
    }
}

pub(crate) fn into_service_error(err: Error, resource: &'static str, guid: &str) -> service::Error {
    if err.is_not_found() {
        service::Error::CloudControllerNotFound { resource, guid: guid.to_string() }
    } else {
        service::Error::CloudControllerDown { source: err }
    }
}

impl From<Error> for service::Error {
    fn from(source: Error) -> Self { Self::CloudControllerDown { source } }
}

#[async_trait]
impl SpaceLoader for CloudControllerClient {
    async fn load_space(&self, space_guid: &str, token: &Token) -> service::Result<Space> {
        self.space(space_guid, token).await.map_err(|err| into_service_error(err, "Space", space_guid))
    }
}

#[async_trait]
impl OrganizationLoader for CloudControllerClient {
    async fn load_organization(
        &self,
        organization_guid: &str,
        token: &Token,
    ) -> service::Result<Organization> {
        self.organization(organization_guid, token)
            .await
            .map_err(|err| into_service_error(err, "Organization", organization_guid))
    }
}
