//! Shared test infrastructure for diagstore integration tests.
//!
//! Provides TestEnv helper for consistent test setup/teardown.

#![allow(dead_code)]

use diagstore::{RequestMeta, Store, SubmissionRecord};
use serde_json::json;
use tempfile::TempDir;

/// Test environment with automatic cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub store: Store,
}

impl TestEnv {
    /// Create a new test environment with an opened store.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Store::open(temp_dir.path()).expect("Failed to open store");
        Self { temp_dir, store }
    }

    /// Submit a payload with typical browser request metadata.
    pub fn submit(&self, payload: serde_json::Value) -> SubmissionRecord {
        self.store
            .submit(payload, &browser_meta())
            .expect("Failed to submit diagnostics")
    }

    /// Number of record files currently on disk.
    pub fn record_count(&self) -> usize {
        std::fs::read_dir(self.temp_dir.path().join("records"))
            .expect("Failed to read records directory")
            .count()
    }
}

/// Request metadata resembling a browser behind one proxy hop.
pub fn browser_meta() -> RequestMeta {
    RequestMeta::new()
        .with_header("user-agent", "Mozilla/5.0 (X11; Linux x86_64) Firefox/133.0")
        .with_header("x-forwarded-for", "5.6.7.8, 9.9.9.9")
        .with_header("via", "1.1 edge-proxy")
        .with_header("accept", "application/json")
        .with_peer_addr("10.0.0.2".parse().unwrap())
}

/// A representative diagnostics payload, shaped like what the browser
/// collector sends.
pub fn sample_payload() -> serde_json::Value {
    json!({
        "connection": { "effectiveType": "4g", "downlink": 10.0, "rtt": 50 },
        "navigator": { "language": "en-US", "onLine": true },
        "webgl": { "vendor": "Mesa", "renderer": "llvmpipe" },
        "timing": { "domContentLoaded": 312, "load": 845 },
    })
}
