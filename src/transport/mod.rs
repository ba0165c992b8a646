//! Pluggable request-issuing capability.
//!
//! Clients never talk to the network directly; they hand an [`HttpRequest`]
//! to a [`Transport`] and get an [`HttpResponse`] back.

use std::future::Future;

use anyhow::Result;
use http::{HeaderMap, Method, StatusCode};

pub mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL, query string included.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }
}

pub trait Transport: Send + Sync {
    /// Issue the request. Any `Err` is treated as a transport-level failure.
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// Adapter turning an async function into a [`Transport`].
#[derive(Debug, Clone)]
pub struct FnTransport<F>(F);

pub fn transport_fn<F, Fut>(f: F) -> FnTransport<F>
where
    F: Fn(HttpRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HttpResponse>> + Send,
{
    FnTransport(f)
}

impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(HttpRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HttpResponse>> + Send,
{
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send {
        (self.0)(request)
    }
}
