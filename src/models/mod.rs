pub mod envelope;
pub mod station;

pub use envelope::{ApiEnvelope, EnvelopeData};
pub use station::{FuelPrice, PriceStation, StationInfo};
