use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use snafu::{ResultExt, Snafu};
use tokio::sync::RwLock;

const CACHE_TTL: Duration = Duration::from_secs(300);

/// Fetches and caches the signing keys UAA publishes at `/token_keys`.
#[derive(Clone)]
pub struct JwksClient {
    jwks_url: String,
    http_client: reqwest::Client,
    cache: Arc<RwLock<JwksCache>>,
}

#[derive(Default)]
struct JwksCache {
    jwks: Option<JwkSet>,
    last_fetch: Option<Instant>,
}

impl JwksClient {
    /// # Errors
    /// Returns an error if the HTTP client can not be built
    pub fn new(uaa_host: &str, verify_ssl: bool) -> Result<Self, JwksError> {
        let jwks_url = format!("{}/token_keys", uaa_host.trim_end_matches('/'));

        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!verify_ssl)
            .timeout(Duration::from_secs(10))
            .build()
            .context(HttpClientSnafu)?;

        Ok(Self { jwks_url, http_client, cache: Arc::new(RwLock::new(JwksCache::default())) })
    }

    #[inline]
    #[must_use]
    pub fn jwks_url(&self) -> &str { &self.jwks_url }

    /// Returns the key `kid`, refetching the key set when the cache is stale
    /// or does not know the key.
    ///
    /// # Errors
    /// Returns an error if the key set can not be fetched or lacks `kid`
    pub async fn get_jwk(&self, kid: &str) -> Result<Jwk, JwksError> {
        let cache = self.cache.read().await;
        if let (Some(jwks), Some(last_fetch)) = (&cache.jwks, cache.last_fetch) {
            if last_fetch.elapsed() < CACHE_TTL {
                if let Some(jwk) = jwks.find(kid) {
                    tracing::debug!("Found JWK in cache for kid: {kid}");
                    return Ok(jwk.clone());
                }
            }
        }
        drop(cache);

        tracing::info!("Fetching token keys from {}", self.jwks_url);
        let jwks = self.fetch_jwks().await?;
        let jwk = jwks.find(kid).cloned().ok_or_else(|| JwksError::KeyNotFound { kid: kid.to_string() })?;

        let mut cache = self.cache.write().await;
        cache.jwks = Some(jwks);
        cache.last_fetch = Some(Instant::now());
        drop(cache);

        Ok(jwk)
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, JwksError> {
        let response = self.http_client.get(&self.jwks_url).send().await.context(FetchJwksSnafu)?;

        if !response.status().is_success() {
            return Err(JwksError::FetchFailed {
                status: response.status().as_u16(),
                url: self.jwks_url.clone(),
            });
        }

        let jwks: JwkSet = response.json().await.context(ParseJwksSnafu)?;
        tracing::debug!("Fetched {} token keys", jwks.keys.len());

        Ok(jwks)
    }
}

#[derive(Debug, Snafu)]
pub enum JwksError {
    #[snafu(display("Failed to create HTTP client: {source}"))]
    HttpClient { source: reqwest::Error },

    #[snafu(display("Failed to fetch token keys: {source}"))]
    FetchJwks { source: reqwest::Error },

    #[snafu(display("Failed to parse token keys: {source}"))]
    ParseJwks { source: reqwest::Error },

    #[snafu(display("Token key fetch failed with status {status} from {url}"))]
    FetchFailed { status: u16, url: String },

    #[snafu(display("Key with kid '{kid}' not found in token keys"))]
    KeyNotFound { kid: String },
}
