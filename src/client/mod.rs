//! Managed client: owns the token slot and exposes the data endpoints.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::AuthClient;
use crate::cache::TokenCache;
use crate::config::settings::ClientConfig;
use crate::error::{ApiError, Error};
use crate::helpers::time::{now_utc, SinceTime};
use crate::models::{ApiEnvelope, PriceStation, StationInfo};
use crate::observability::metrics::{get_metrics, Metrics};
use crate::transport::{ReqwestTransport, Transport};
use crate::utils::constants::{
    DATE_TIME_QUERY_PARAM, FUEL_PRICES_PATH, PFS_INFO_INCREMENTAL_PATH, PFS_INFO_PATH,
};

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Defaults to the public registry; one trailing slash is stripped.
    pub base_url: Option<String>,
    /// No timeout when absent.
    pub timeout_ms: Option<u64>,
}

pub type PriceStations = ApiEnvelope<Vec<PriceStation>>;
pub type StationInfos = ApiEnvelope<Vec<StationInfo>>;

/// Authenticated client for the fuel price and station endpoints.
///
/// The token is acquired lazily and renewed when stale: refresh first,
/// generate from the client credentials if the refresh fails. The slot lock
/// is held across that whole cycle, so concurrent callers share a single
/// acquisition.
pub struct FuelFinderClient<T = ReqwestTransport> {
    credentials: Credentials,
    auth: AuthClient<T>,
    token: Mutex<Option<TokenCache>>,
}

impl FuelFinderClient<ReqwestTransport> {
    pub fn new(credentials: Credentials, options: ClientOptions) -> Result<Self, Error> {
        validate_credentials(&credentials)?;
        Ok(Self::build(credentials, &options, ReqwestTransport::new()?))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, Error> {
        Self::new(
            Credentials::new(config.client_id.clone(), config.client_secret.clone()),
            ClientOptions {
                base_url: config.base_url.clone(),
                timeout_ms: config.timeout_ms,
            },
        )
    }
}

impl<T: Transport> FuelFinderClient<T> {
    pub fn with_transport(credentials: Credentials, options: ClientOptions, transport: T) -> Result<Self, Error> {
        validate_credentials(&credentials)?;
        Ok(Self::build(credentials, &options, transport))
    }

    fn build(credentials: Credentials, options: &ClientOptions, transport: T) -> Self {
        Self {
            auth: AuthClient::from_shared(options, Arc::new(transport)),
            credentials,
            token: Mutex::new(None),
        }
    }

    pub fn auth(&self) -> &AuthClient<T> {
        &self.auth
    }

    /// Snapshot of the cached token, if any.
    pub async fn cached_token(&self) -> Option<TokenCache> {
        self.token.lock().await.clone()
    }

    /// Return a valid access token, acquiring or renewing it first if needed.
    pub async fn get_access_token(&self) -> Result<String, Error> {
        Ok(self.ensure_token().await?.access_token)
    }

    pub async fn get_all_pfs_fuel_prices(&self) -> Result<PriceStations, Error> {
        self.fetch(FUEL_PRICES_PATH, None).await
    }

    pub async fn get_incremental_pfs_fuel_prices(&self, since: impl Into<SinceTime>) -> Result<PriceStations, Error> {
        let date_time = since.into().to_query_value()?;
        self.fetch(FUEL_PRICES_PATH, Some(&date_time)).await
    }

    pub async fn get_pfs_info(&self) -> Result<StationInfos, Error> {
        self.fetch(PFS_INFO_PATH, None).await
    }

    pub async fn get_incremental_pfs_info(&self, since: impl Into<SinceTime>) -> Result<StationInfos, Error> {
        let date_time = since.into().to_query_value()?;
        self.fetch(PFS_INFO_INCREMENTAL_PATH, Some(&date_time)).await
    }

    async fn fetch<R: DeserializeOwned>(&self, path: &'static str, date_time: Option<&str>) -> Result<R, Error> {
        let metrics = get_metrics().await;
        let token = self.ensure_token().await?;

        metrics.api_requests.with_label_values(&[path]).inc();
        let query: Vec<(&str, &str)> = date_time
            .map(|value| vec![(DATE_TIME_QUERY_PARAM, value)])
            .unwrap_or_default();

        let raw = self
            .auth
            .executor()
            .get_json(path, &query, &token.authorization())
            .await
            .inspect_err(|err| {
                metrics.api_failures.with_label_values(&[path, err.reason()]).inc();
            })?;

        serde_json::from_value(raw.clone())
            .map_err(|err| {
                metrics.api_failures.with_label_values(&[path, "decode"]).inc();
                Error::Api(ApiError::decode(err, raw))
            })
    }

    async fn ensure_token(&self) -> Result<TokenCache, ApiError> {
        let metrics = get_metrics().await;
        let mut slot = self.token.lock().await;

        if let Some(cached) = slot.as_ref().filter(|cached| cached.is_fresh()) {
            metrics.token_cache_hits.inc();
            return Ok(cached.clone());
        }

        if let Some(refresh_token) = slot.as_ref().and_then(|cached| cached.refresh_token.clone()) {
            debug!("cached token is stale, refreshing");
            match self
                .auth
                .regenerate_access_token(&self.credentials.client_id, &refresh_token)
                .await
            {
                Ok(payload) => {
                    let next = TokenCache::from_refreshed(payload, Some(refresh_token), now_utc());
                    return Ok(install(&mut slot, next, metrics));
                }
                Err(err) => {
                    warn!("token refresh failed (status {}): {}, generating a new token", err.status, err);
                    metrics.token_refresh_fallbacks.inc();
                    *slot = None;
                }
            }
        }

        let payload = self
            .auth
            .generate_access_token(&self.credentials.client_id, &self.credentials.client_secret)
            .await?;
        Ok(install(&mut slot, TokenCache::from_issued(payload, now_utc()), metrics))
    }
}

fn install(slot: &mut Option<TokenCache>, next: TokenCache, metrics: &Metrics) -> TokenCache {
    info!("token cached until {}", next.expires_at);
    metrics.token_expiry_unix.set(next.expires_at.timestamp());
    *slot = Some(next.clone());
    next
}

fn validate_credentials(credentials: &Credentials) -> Result<(), Error> {
    if credentials.client_id.is_empty() || credentials.client_secret.is_empty() {
        return Err(Error::Config("client_id and client_secret are required.".to_owned()));
    }
    Ok(())
}
