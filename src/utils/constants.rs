//! Shared constants and invariants

pub const DEFAULT_BASE_URL: &str = "https://www.register-fuel-finder-scheme.service.gov.uk";

/// Cached tokens are treated as stale this long before the server expiry.
pub const TOKEN_SAFETY_MARGIN_MS: i64 = 5000;

// OAuth endpoints
pub const GENERATE_TOKEN_PATH: &str = "/api/v1/oauth/generate_access_token";
pub const REGENERATE_TOKEN_PATH: &str = "/api/v1/oauth/regenerate_access_token";

// Data endpoints
pub const FUEL_PRICES_PATH: &str = "/api/v1/pfs/fuel-prices";
/// The full listing is served with a trailing slash, the incremental one without.
pub const PFS_INFO_PATH: &str = "/api/v1/pfs/";
pub const PFS_INFO_INCREMENTAL_PATH: &str = "/api/v1/pfs";

pub const DATE_TIME_QUERY_PARAM: &str = "date_time";
