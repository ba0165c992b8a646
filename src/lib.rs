//! # Fuel Finder Client Library
//!
//! Client for the Fuel Finder scheme API. Obtains and caches an OAuth2
//! client-credentials access token, renews it transparently, and issues
//! authenticated requests to the fuel price and station endpoints.
//!
//! Modules:
//! - `auth`: token issuance and refresh calls
//! - `client`: managed client holding the token slot, data endpoints
//! - `cache`: cached token record and expiry policy
//! - `transport`: pluggable request-issuing capability, `reqwest` default
//! - `helpers`: timestamp normalization for the incremental endpoints
//!
//! ```no_run
//! use fuel_finder::{ClientOptions, Credentials, FuelFinderClient};
//!
//! # async fn run() -> Result<(), fuel_finder::Error> {
//! let client = FuelFinderClient::new(Credentials::new("id", "secret"), ClientOptions::default())?;
//! let prices = client.get_incremental_pfs_fuel_prices("2025-09-05 10:00:00").await?;
//! println!("{} stations changed", prices.records().len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod helpers;
pub mod models;
pub mod observability;
pub mod transport;
pub mod utils;

mod request;

#[cfg(test)]
mod tests;

pub use crate::auth::{AccessTokenPayload, AuthClient, RefreshedTokenPayload};
pub use crate::cache::TokenCache;
pub use crate::client::{ClientOptions, Credentials, FuelFinderClient};
pub use crate::error::{ApiError, Error};
pub use crate::helpers::time::SinceTime;
pub use crate::models::{ApiEnvelope, FuelPrice, PriceStation, StationInfo};
pub use crate::transport::{transport_fn, HttpRequest, HttpResponse, ReqwestTransport, Transport};
