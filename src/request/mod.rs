//! Shared request wrapper used by both the auth and the data calls.
//!
//! Every call goes through [`RequestExecutor::execute`], which applies the
//! optional timeout and folds every outcome into either a parsed JSON body
//! or a single [`ApiError`].

use std::sync::Arc;
use std::time::Duration;

use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use reqwest::Url;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::debug;

use crate::error::ApiError;
use crate::observability::metrics::get_metrics;
use crate::transport::{HttpRequest, Transport};

/// How a timeout is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimeoutMessage {
    /// `Request timed out after <ms>ms.` (auth POSTs)
    WithDuration,
    /// `Request timed out.` (data GETs)
    Plain,
}

pub(crate) struct RequestExecutor<T> {
    base_url: String,
    transport: Arc<T>,
    timeout: Option<Duration>,
}

impl<T> Clone for RequestExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            transport: self.transport.clone(),
            timeout: self.timeout,
        }
    }
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(base_url: &str, transport: Arc<T>, timeout_ms: Option<u64>) -> Self {
        let base_url = base_url.strip_suffix('/').unwrap_or(base_url).to_owned();
        Self {
            base_url,
            transport,
            timeout: timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join base URL and path verbatim and append the query pairs.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<String, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path)).map_err(ApiError::transport)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url.into())
    }

    pub async fn post_json<B: Serialize>(&self, path: &'static str, body: &B) -> Result<Value, ApiError> {
        let body = serde_json::to_string(body).map_err(ApiError::transport)?;
        let request = HttpRequest {
            method: Method::POST,
            url: self.url(path, &[])?,
            headers: json_headers(),
            body: Some(body),
        };
        self.execute(path, request, TimeoutMessage::WithDuration).await
    }

    pub async fn get_json(
        &self,
        path: &'static str,
        query: &[(&str, &str)],
        authorization: &str,
    ) -> Result<Value, ApiError> {
        let mut headers = json_headers();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(authorization).map_err(ApiError::transport)?,
        );
        let request = HttpRequest {
            method: Method::GET,
            url: self.url(path, query)?,
            headers,
            body: None,
        };
        self.execute(path, request, TimeoutMessage::Plain).await
    }

    async fn execute(
        &self,
        path: &'static str,
        request: HttpRequest,
        timeout_message: TimeoutMessage,
    ) -> Result<Value, ApiError> {
        let metrics = get_metrics().await;
        let method = request.method.clone();
        debug!("{} {}", method, request.url);

        let start = Instant::now();
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.transport.send(request)).await.ok(),
            None => Some(self.transport.send(request).await),
        };
        metrics
            .request_duration
            .with_label_values(&[method.as_str(), path])
            .observe(start.elapsed().as_secs_f64());

        let response = match outcome {
            Some(result) => result.map_err(into_api_error)?,
            None => return Err(ApiError::timeout(self.timeout_text(timeout_message))),
        };

        let status = response.status;
        debug!("{} {} -> {}", method, path, status);
        if !status.is_success() {
            return Err(ApiError::http(status.as_u16(), parse_lenient(&response.body)));
        }

        serde_json::from_str(&response.body)
            .map_err(|err| ApiError::decode(err, Value::String(response.body.clone())))
    }

    fn timeout_text(&self, timeout_message: TimeoutMessage) -> String {
        match (timeout_message, self.timeout) {
            (TimeoutMessage::WithDuration, Some(limit)) => {
                format!("Request timed out after {}ms.", limit.as_millis())
            }
            _ => "Request timed out.".to_owned(),
        }
    }
}

/// Errors a transport already normalized pass through as they are.
fn into_api_error(err: anyhow::Error) -> ApiError {
    err.downcast::<ApiError>().unwrap_or_else(ApiError::transport)
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Best-effort parse of an error body: empty -> `{}`, non-JSON -> the raw text.
pub(crate) fn parse_lenient(body: &str) -> Value {
    if body.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_owned()))
}
