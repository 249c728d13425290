//! Core data types for diagnostics submissions.

use crate::refid::{MAX_GENERATE_ATTEMPTS, ReferenceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Headers captured from the inbound request, name → value. Only headers
/// actually present on the request appear; absent ones are omitted, never
/// stored as empty strings.
pub type NetworkHeaderSet = BTreeMap<String, String>;

/// The durable unit persisted per accepted submission. Created once,
/// never mutated; callers always receive their own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    /// Code returned to the submitter for later lookup
    pub reference_id: ReferenceId,

    /// Server clock at acceptance (ISO-8601)
    pub submitted_at: DateTime<Utc>,

    /// Best-effort resolved client address
    pub client_ip: String,

    /// Raw user-agent header, when the request carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Allow-listed proxy/CDN/load-balancer headers from the request
    #[serde(default)]
    pub network_headers: NetworkHeaderSet,

    /// Caller-supplied payload, stored verbatim. Opaque to the store
    /// beyond the outer "is a JSON object" check.
    pub diagnostics: serde_json::Value,
}

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Submission payload is not a JSON object.
    InvalidPayload,
    /// Lookup id does not match the reference-code format.
    MalformedId(String),
    /// Well-formed id with no stored record.
    NotFound(String),
    /// Collision-checked generation hit its attempt ceiling.
    ExhaustedRetries,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::InvalidPayload => write!(f, "Invalid diagnostics data"),
            StoreError::MalformedId(id) => write!(f, "invalid reference id format: {}", id),
            StoreError::NotFound(id) => write!(f, "no record found for reference id: {}", id),
            StoreError::ExhaustedRetries => write!(
                f,
                "could not find an unused reference id in {} attempts",
                MAX_GENERATE_ATTEMPTS
            ),
        }
    }
}

impl std::error::Error for StoreError {}
