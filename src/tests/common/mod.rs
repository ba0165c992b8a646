// tests/common/mod.rs
pub use httpmock::Method::{GET, POST};
pub use httpmock::{Mock, MockServer};
pub use serde_json::{json, Value};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use http::StatusCode;

use crate::client::{ClientOptions, Credentials, FuelFinderClient};
use crate::transport::{HttpRequest, HttpResponse, Transport};
use crate::utils::constants::{GENERATE_TOKEN_PATH, REGENERATE_TOKEN_PATH};

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";

pub fn credentials() -> Credentials {
    Credentials::new(CLIENT_ID, CLIENT_SECRET)
}

pub fn options_for(server: &MockServer, timeout_ms: Option<u64>) -> ClientOptions {
    ClientOptions {
        base_url: Some(server.base_url()),
        timeout_ms,
    }
}

pub fn client_for(server: &MockServer) -> FuelFinderClient {
    FuelFinderClient::new(credentials(), options_for(server, None)).expect("client")
}

/// `{ success, data: { success, data: records } }`
pub fn envelope(records: Value) -> Value {
    json!({
        "success": true,
        "data": { "success": true, "data": records, "message": "ok" },
        "message": "ok"
    })
}

pub fn token_body(access_token: &str, refresh_token: &str, expires_in: u64) -> Value {
    json!({
        "success": true,
        "data": {
            "access_token": access_token,
            "token_type": "Bearer",
            "expires_in": expires_in,
            "refresh_token": refresh_token
        },
        "message": "token generated"
    })
}

/// Generate endpoint answering for the test credentials.
pub async fn mock_generate<'a>(
    server: &'a MockServer,
    access_token: &str,
    refresh_token: &str,
    expires_in: u64,
) -> Mock<'a> {
    let body = token_body(access_token, refresh_token, expires_in);
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(GENERATE_TOKEN_PATH)
                .header("content-type", "application/json")
                .json_body(json!({ "client_id": CLIENT_ID, "client_secret": CLIENT_SECRET }));
            then.status(200).json_body(body);
        })
        .await
}

/// Regenerate endpoint expecting `refresh_token` and answering `status` + `body`.
pub async fn mock_regenerate<'a>(server: &'a MockServer, refresh_token: &str, status: u16, body: Value) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(REGENERATE_TOKEN_PATH)
                .json_body(json!({ "client_id": CLIENT_ID, "refresh_token": refresh_token }));
            then.status(status).json_body(body);
        })
        .await
}

/// In-memory transport replaying queued answers and recording requests.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push_raw(status, body.to_string())
    }

    pub fn push_raw(&self, status: u16, body: impl Into<String>) -> &Self {
        let status = StatusCode::from_u16(status).expect("status");
        self.responses.lock().unwrap().push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn push_failure(&self, message: &str) -> &Self {
        self.responses.lock().unwrap().push_back(Err(anyhow!(message.to_owned())));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(anyhow!("no scripted response left")))
    }
}

pub fn scripted_client(transport: &ScriptedTransport, base_url: &str) -> FuelFinderClient<ScriptedTransport> {
    FuelFinderClient::with_transport(
        credentials(),
        ClientOptions {
            base_url: Some(base_url.to_owned()),
            timeout_ms: None,
        },
        transport.clone(),
    )
    .expect("client")
}
