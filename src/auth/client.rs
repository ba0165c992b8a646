use std::sync::Arc;

use tracing::{debug, info};

use crate::auth::payload::{
    access_token_from_envelope, AccessTokenPayload, GenerateTokenRequest, RefreshResponse,
    RefreshedTokenPayload, RegenerateTokenRequest,
};
use crate::client::ClientOptions;
use crate::error::{ApiError, Error};
use crate::observability::metrics::get_metrics;
use crate::request::RequestExecutor;
use crate::transport::{ReqwestTransport, Transport};
use crate::utils::constants::{DEFAULT_BASE_URL, GENERATE_TOKEN_PATH, REGENERATE_TOKEN_PATH};

static GENERATE_OP: &'static str = "generate";
static REGENERATE_OP: &'static str = "regenerate";

/// Calls the two OAuth endpoints. Holds no token state.
pub struct AuthClient<T = ReqwestTransport> {
    executor: RequestExecutor<T>,
}

impl<T> Clone for AuthClient<T> {
    fn clone(&self) -> Self {
        Self { executor: self.executor.clone() }
    }
}

impl AuthClient<ReqwestTransport> {
    /// Build with the default `reqwest` transport.
    pub fn new(options: &ClientOptions) -> Result<Self, Error> {
        Ok(Self::with_transport(options, ReqwestTransport::new()?))
    }
}

impl<T: Transport> AuthClient<T> {
    pub fn with_transport(options: &ClientOptions, transport: T) -> Self {
        Self::from_shared(options, Arc::new(transport))
    }

    pub(crate) fn from_shared(options: &ClientOptions, transport: Arc<T>) -> Self {
        let base_url = options.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Self {
            executor: RequestExecutor::new(base_url, transport, options.timeout_ms),
        }
    }

    pub fn base_url(&self) -> &str {
        self.executor.base_url()
    }

    pub(crate) fn executor(&self) -> &RequestExecutor<T> {
        &self.executor
    }

    /// Exchange client credentials for a new access/refresh token pair.
    pub async fn generate_access_token(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<AccessTokenPayload, ApiError> {
        let metrics = get_metrics().await;
        metrics.auth_requests.with_label_values(&[GENERATE_OP]).inc();

        let body = GenerateTokenRequest { client_id, client_secret };
        let payload = self
            .executor
            .post_json(GENERATE_TOKEN_PATH, &body)
            .await
            .and_then(|raw| access_token_from_envelope(&raw))
            .inspect_err(|err| {
                metrics.auth_failures.with_label_values(&[GENERATE_OP, err.reason()]).inc();
            })?;

        info!("access token generated, expires in {}s", payload.expires_in);
        Ok(payload)
    }

    /// Trade a refresh token for a new access token.
    pub async fn regenerate_access_token(
        &self,
        client_id: &str,
        refresh_token: &str,
    ) -> Result<RefreshedTokenPayload, ApiError> {
        let metrics = get_metrics().await;
        metrics.auth_requests.with_label_values(&[REGENERATE_OP]).inc();

        let body = RegenerateTokenRequest { client_id, refresh_token };
        let payload = self
            .executor
            .post_json(REGENERATE_TOKEN_PATH, &body)
            .await
            .and_then(|raw| {
                let response = RefreshResponse::from_value(raw.clone());
                debug!("refresh response shape: {}", match response {
                    RefreshResponse::Enveloped { .. } => "enveloped",
                    RefreshResponse::Bare(_) => "bare",
                });
                response.into_payload(&raw)
            })
            .inspect_err(|err| {
                metrics.auth_failures.with_label_values(&[REGENERATE_OP, err.reason()]).inc();
            })?;

        info!("access token regenerated, expires in {}s", payload.expires_in);
        Ok(payload)
    }
}
