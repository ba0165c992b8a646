use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Result of a token-issuance call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenPayload {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub refresh_token: String,
}

/// Result of a refresh call; the API may leave out a new refresh token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshedTokenPayload {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateTokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegenerateTokenRequest<'a> {
    pub client_id: &'a str,
    pub refresh_token: &'a str,
}

/// Both shapes the refresh endpoint answers with, told apart by the
/// presence of a `success` key.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshResponse {
    /// `{ success, data?, message? }`
    Enveloped {
        success: bool,
        data: Option<Value>,
        message: Option<String>,
    },
    /// `{ access_token, token_type, expires_in, refresh_token? }`
    Bare(Value),
}

impl RefreshResponse {
    pub fn from_value(raw: Value) -> Self {
        match raw.get("success") {
            Some(success) => RefreshResponse::Enveloped {
                success: success.as_bool().unwrap_or(false),
                data: raw.get("data").filter(|data| !data.is_null()).cloned(),
                message: raw.get("message").and_then(Value::as_str).map(str::to_owned),
            },
            None => RefreshResponse::Bare(raw),
        }
    }

    /// Normalize either shape; `raw` is the full response kept for error details.
    pub fn into_payload(self, raw: &Value) -> Result<RefreshedTokenPayload, ApiError> {
        let data = match self {
            RefreshResponse::Enveloped { data: Some(data), .. } => data,
            RefreshResponse::Enveloped { message, .. } => {
                return Err(ApiError::malformed(
                    message.unwrap_or_else(|| "Failed to regenerate access token.".to_owned()),
                    raw.clone(),
                ))
            }
            RefreshResponse::Bare(body) => {
                let has_token = body
                    .get("access_token")
                    .and_then(Value::as_str)
                    .is_some_and(|token| !token.is_empty());
                if !has_token {
                    return Err(ApiError::malformed(
                        "Failed to regenerate access token: access_token missing from response.",
                        raw.clone(),
                    ));
                }
                body
            }
        };
        let payload: RefreshedTokenPayload = decode_payload(data, raw, "regenerate")?;
        ensure_usable(&payload.access_token, &payload.token_type, payload.expires_in, raw)?;
        Ok(payload)
    }
}

/// Parse `{ success, data?, message? }` from the generate endpoint.
pub(crate) fn access_token_from_envelope(raw: &Value) -> Result<AccessTokenPayload, ApiError> {
    let success = raw.get("success").and_then(Value::as_bool).unwrap_or(false);
    let data = raw.get("data").filter(|data| !data.is_null());
    let data = match (success, data) {
        (true, Some(data)) => data.clone(),
        _ => {
            let message = raw
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| "Failed to generate access token.".to_owned());
            return Err(ApiError::malformed(message, raw.clone()));
        }
    };
    let payload: AccessTokenPayload = decode_payload(data, raw, "generate")?;
    ensure_usable(&payload.access_token, &payload.token_type, payload.expires_in, raw)?;
    Ok(payload)
}

fn decode_payload<T: serde::de::DeserializeOwned>(data: Value, raw: &Value, operation: &str) -> Result<T, ApiError> {
    serde_json::from_value(data).map_err(|err| {
        ApiError::malformed(
            format!("Failed to {} access token: unexpected payload ({}).", operation, err),
            raw.clone(),
        )
    })
}

fn ensure_usable(access_token: &str, token_type: &str, expires_in: u64, raw: &Value) -> Result<(), ApiError> {
    if access_token.is_empty() || token_type.is_empty() {
        return Err(ApiError::malformed(
            "Token response carried an empty access_token or token_type.",
            raw.clone(),
        ));
    }
    if expires_in == 0 {
        return Err(ApiError::malformed("Token response carried expires_in of 0.", raw.clone()));
    }
    Ok(())
}
