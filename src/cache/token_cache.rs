use chrono::{DateTime, Duration, Utc};

use crate::auth::payload::{AccessTokenPayload, RefreshedTokenPayload};
use crate::utils::constants::TOKEN_SAFETY_MARGIN_MS;

/// The single cached token owned by a client.
///
/// Always replaced as a whole; `access_token` and `token_type` are never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCache {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    /// issue time + `expires_in` minus the safety margin
    pub expires_at: DateTime<Utc>,
}

impl TokenCache {
    pub fn from_issued(payload: AccessTokenPayload, issued_at: DateTime<Utc>) -> Self {
        Self {
            expires_at: effective_expiry(issued_at, payload.expires_in),
            access_token: payload.access_token,
            token_type: payload.token_type,
            refresh_token: Some(payload.refresh_token),
            expires_in: payload.expires_in,
        }
    }

    /// Keeps `previous_refresh_token` when the refresh answer carried none.
    pub fn from_refreshed(
        payload: RefreshedTokenPayload,
        previous_refresh_token: Option<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            expires_at: effective_expiry(issued_at, payload.expires_in),
            access_token: payload.access_token,
            token_type: payload.token_type,
            refresh_token: payload.refresh_token.or(previous_refresh_token),
            expires_in: payload.expires_in,
        }
    }

    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

fn effective_expiry(issued_at: DateTime<Utc>, expires_in: u64) -> DateTime<Utc> {
    let lifetime_ms = i64::try_from(expires_in)
        .ok()
        .and_then(|secs| secs.checked_mul(1000))
        .unwrap_or(i64::MAX);
    let lifetime = Duration::try_milliseconds(lifetime_ms.saturating_sub(TOKEN_SAFETY_MARGIN_MS))
        .unwrap_or(Duration::MAX);
    issued_at.checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
