use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

/// Render every registered metric in the prometheus text format.
pub async fn gather_metrics() -> anyhow::Result<String> {
    let metrics = get_metrics().await;
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metrics.registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Auth metrics
    pub auth_requests: IntCounterVec,
    pub auth_failures: IntCounterVec,

    // Data endpoint metrics
    pub api_requests: IntCounterVec,
    pub api_failures: IntCounterVec,

    pub request_duration: HistogramVec,

    // Token cache metrics
    pub token_cache_hits: IntCounter,
    pub token_refresh_fallbacks: IntCounter,
    pub token_expiry_unix: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("fuelfinder".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Auth
            auth_requests: IntCounterVec::new(Opts::new("auth_requests_total", "Token endpoint calls by operation"),&["operation"],).unwrap(),
            auth_failures: IntCounterVec::new(Opts::new("auth_failures_total", "Token endpoint failures by reason"),&["operation", "reason"],).unwrap(),

            // Data
            api_requests: IntCounterVec::new(Opts::new("api_requests_total", "Data endpoint calls by endpoint"),&["endpoint"],).unwrap(),
            api_failures: IntCounterVec::new(Opts::new("api_failures_total", "Data endpoint failures by reason"),&["endpoint", "reason"],).unwrap(),

            request_duration: HistogramVec::new(HistogramOpts::new("request_duration_seconds", "Outbound request duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),&["method", "path"],).unwrap(),

            // Cache
            token_cache_hits: IntCounter::new("token_cache_hits_total", "Authenticated calls served by the cached token").unwrap(),
            token_refresh_fallbacks: IntCounter::new("token_refresh_fallbacks_total", "Refresh attempts that fell back to generating a new token").unwrap(),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Effective expiry of the cached token").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.auth_requests.clone())).unwrap();
        reg.register(Box::new(metrics.auth_failures.clone())).unwrap();
        reg.register(Box::new(metrics.api_requests.clone())).unwrap();
        reg.register(Box::new(metrics.api_failures.clone())).unwrap();
        reg.register(Box::new(metrics.request_duration.clone())).unwrap();
        reg.register(Box::new(metrics.token_cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.token_refresh_fallbacks.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();

        metrics
    }
}
