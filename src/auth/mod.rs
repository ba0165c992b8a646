pub mod client;
pub mod payload;

pub use client::AuthClient;
pub use payload::{AccessTokenPayload, RefreshResponse, RefreshedTokenPayload};
