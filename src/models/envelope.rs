use serde::{Deserialize, Serialize};

/// Two-level wrapper returned by the data endpoints:
/// `{ success, data: { success, data: T, message? }, message? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: EnvelopeData<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeData<T> {
    #[serde(default)]
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// The records carried by the inner envelope.
    pub fn records(&self) -> &T {
        &self.data.data
    }

    pub fn into_records(self) -> T {
        self.data.data
    }
}
