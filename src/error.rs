use serde_json::Value;
use thiserror::Error;

/// Status used when the request never produced an HTTP response.
pub const STATUS_TRANSPORT: u16 = 0;
/// Status used when the client-side timeout fired first.
pub const STATUS_TIMEOUT: u16 = 408;
/// Status used when an auth endpoint answered 2xx with an unusable body.
pub const STATUS_MALFORMED: u16 = 500;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Normalized failure of any call against the API.
///
/// `status` is the real HTTP status for non-2xx answers, `0` for transport
/// failures (network, undecodable body), `408` for client-side timeouts and
/// `500` for malformed auth responses.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    pub details: Option<Value>,
    #[source]
    source: Option<BoxError>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status: u16, details: Option<Value>) -> Self {
        Self {
            message: message.into(),
            status,
            details,
            source: None,
        }
    }

    pub(crate) fn http(status: u16, details: Value) -> Self {
        let message = details
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        Self::new(message, status, Some(details))
    }

    pub(crate) fn timeout(message: String) -> Self {
        Self::new(message, STATUS_TIMEOUT, None)
    }

    pub(crate) fn malformed(message: impl Into<String>, details: Value) -> Self {
        Self::new(message, STATUS_MALFORMED, Some(details))
    }

    pub(crate) fn transport(err: impl Into<BoxError>) -> Self {
        let source: BoxError = err.into();
        Self {
            message: source.to_string(),
            status: STATUS_TRANSPORT,
            details: Some(Value::String(source.to_string())),
            source: Some(source),
        }
    }

    pub(crate) fn decode(err: serde_json::Error, raw: Value) -> Self {
        Self {
            message: format!("Failed to decode response body: {}", err),
            status: STATUS_TRANSPORT,
            details: Some(raw),
            source: Some(Box::new(err)),
        }
    }

    /// Short label used by metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self.status {
            STATUS_TRANSPORT => "transport",
            STATUS_TIMEOUT => "timeout",
            _ => "http",
        }
    }
}

/// Every failure the crate can surface.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Rejected caller input; raised before any request is sent.
    #[error("{0}")]
    InvalidInput(String),
    /// Construction failed; never deferred to first use.
    #[error("{0}")]
    Config(String),
}

impl Error {
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
