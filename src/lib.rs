//! Diagstore: reference-code issuance and persistence for browser
//! network diagnostics.
//!
//! A submission is one opaque JSON object plus the request's header set.
//! The store derives network metadata from the headers, issues a short
//! collision-checked reference code, persists the record as one JSON file
//! keyed by that code, and looks records up again by code.
//!
//! # Example
//!
//! ```no_run
//! use diagstore::{RequestMeta, Store};
//! use serde_json::json;
//! use std::path::Path;
//!
//! let store = Store::open(Path::new("/var/lib/diagstore")).unwrap();
//!
//! let meta = RequestMeta::new()
//!     .with_header("x-forwarded-for", "5.6.7.8")
//!     .with_header("user-agent", "Mozilla/5.0");
//! let record = store.submit(json!({ "rtt": 50 }), &meta).unwrap();
//!
//! let looked_up = store.retrieve(record.reference_id.as_str()).unwrap();
//! assert_eq!(looked_up.diagnostics, json!({ "rtt": 50 }));
//! ```

mod headers;
mod refid;
mod storage;
mod store;
mod types;

pub mod server;

// Re-export public API
pub use headers::{RequestMeta, capture_network_headers, resolve_client_ip};
pub use refid::{MAX_GENERATE_ATTEMPTS, ReferenceId, generate_unique};
pub use store::Store;
pub use types::{NetworkHeaderSet, StoreError, SubmissionRecord};
