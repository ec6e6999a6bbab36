pub mod error;

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use notifications_core::{config::UaaConfig, model::Token};
use serde::{de::DeserializeOwned, Deserialize};
use snafu::ResultExt;
use tokio::sync::RwLock;

pub use self::error::{Error, Result};
use crate::service::{self, AllUserGuids, TokenLoader, ZonedTokenLoader};

const USERS_PAGE_SIZE: usize = 500;

const APPLICATION_JSON: &str = "application/json";

// tokens are refreshed this long before UAA expires them
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
struct ListResponse<T> {
    #[serde(default)]
    resources: Vec<T>,
    #[serde(default)]
    total_results: usize,
}

#[derive(Debug, Deserialize)]
struct UserResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GroupResource {
    #[serde(default)]
    members: Vec<GroupMember>,
}

#[derive(Debug, Deserialize)]
struct GroupMember {
    value: String,
    #[serde(default, rename = "type")]
    type_: String,
}

struct CachedToken {
    token: Token,
    expires_at: Instant,
}

/// Client-credentials UAA client used to load tokens and to look up users.
#[derive(Clone)]
pub struct UaaClient {
    client: reqwest::Client,
    host: String,
    client_id: String,
    client_secret: String,
    tokens: Arc<RwLock<HashMap<String, CachedToken>>>,
}

impl UaaClient {
    /// # Errors
    /// Returns an error if the HTTP client can not be built
    pub fn new(config: UaaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .timeout(Duration::from_secs(30))
            .build()
            .context(error::InitializeClientSnafu)?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            client_id: config.client_id,
            client_secret: config.client_secret,
            tokens: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    #[inline]
    #[must_use]
    pub fn host(&self) -> &str { &self.host }

    /// Returns a cached token for `host` or requests a fresh one.
    ///
    /// # Errors
    /// Returns an error if UAA rejects the client credentials or is unreachable
    pub async fn token(&self, host: &str) -> Result<Token> {
        let host = if host.is_empty() { self.host.as_str() } else { host.trim_end_matches('/') };

        let tokens = self.tokens.read().await;
        if let Some(cached) = tokens.get(host) {
            if cached.expires_at > Instant::now() {
                return Ok(cached.token.clone());
            }
        }
        drop(tokens);

        let url = format!("{host}/oauth/token");
        tracing::debug!("Requesting client credentials token from {url}");
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(http::header::ACCEPT, APPLICATION_JSON)
            .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .context(error::SendRequestSnafu { url: url.clone() })?;
        let TokenResponse { access_token, expires_in } = decode(response, &url).await?;

        let token = Token::issued_by(access_token, host);
        let expires_at =
            Instant::now() + Duration::from_secs(expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        let _previous = self
            .tokens
            .write()
            .await
            .insert(host.to_string(), CachedToken { token: token.clone(), expires_at });

        Ok(token)
    }

    /// UAA zone that issued `token`, the configured host otherwise.
    fn zone_host<'a>(&'a self, token: &'a Token) -> &'a str {
        token.uaa_host().unwrap_or(&self.host)
    }

    /// # Errors
    /// Returns an error if UAA can not list its users
    pub async fn list_user_guids(&self, token: &Token) -> Result<Vec<String>> {
        let url = format!("{}/Users", self.zone_host(token));
        let mut guids = Vec::new();
        let mut start_index = 1;

        loop {
            let query = [
                ("attributes", "id".to_string()),
                ("startIndex", start_index.to_string()),
                ("count", USERS_PAGE_SIZE.to_string()),
            ];
            let page: ListResponse<UserResource> = self.get(&url, &query, token).await?;
            let fetched = page.resources.len();
            guids.extend(page.resources.into_iter().map(|user| user.id));

            start_index += fetched;
            if fetched == 0 || guids.len() >= page.total_results {
                break;
            }
        }

        Ok(guids)
    }

    /// # Errors
    /// Returns an error if UAA can not list the members of the scope group
    pub async fn list_scope_member_guids(&self, scope: &str, token: &Token) -> Result<Vec<String>> {
        let url = format!("{}/Groups", self.zone_host(token));
        let query = [("filter", format!("displayName eq \"{scope}\""))];
        let groups: ListResponse<GroupResource> = self.get(&url, &query, token).await?;

        Ok(groups
            .resources
            .into_iter()
            .flat_map(|group| group.members)
            .filter(|member| member.type_.is_empty() || member.type_.eq_ignore_ascii_case("USER"))
            .map(|member| member.value)
            .collect())
    }

    async fn get<T>(&self, url: &str, query: &[(&str, String)], token: &Token) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(token.access_token())
            .header(http::header::ACCEPT, APPLICATION_JSON)
            .send()
            .await
            .context(error::SendRequestSnafu { url: url.to_string() })?;

        decode(response, url).await
    }
}

async fn decode<T>(response: reqwest::Response, url: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::UnexpectedStatus { url: url.to_string(), status: status.as_u16(), body });
    }

    response.json().await.context(error::DecodeResponseSnafu { url: url.to_string() })
}

impl From<Error> for service::Error {
    fn from(source: Error) -> Self {
        if source.is_unavailable() {
            Self::UaaDown { source }
        } else {
            Self::UaaGeneric { source }
        }
    }
}

#[async_trait]
impl TokenLoader for UaaClient {
    async fn load(&self) -> service::Result<Token> { Ok(self.token("").await?) }
}

#[async_trait]
impl ZonedTokenLoader for UaaClient {
    async fn load(&self, uaa_host: &str) -> service::Result<Token> {
        Ok(self.token(uaa_host).await?)
    }
}

#[async_trait]
impl AllUserGuids for UaaClient {
    async fn all_user_guids(&self, token: &Token) -> service::Result<Vec<String>> {
        Ok(self.list_user_guids(token).await?)
    }
}
