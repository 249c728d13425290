//! High-level store API: accept submissions, look them up by reference code.

use crate::headers::{RequestMeta, capture_network_headers, resolve_client_ip};
use crate::refid::{self, MAX_GENERATE_ATTEMPTS, ReferenceId};
use crate::storage::Storage;
use crate::types::{StoreError, SubmissionRecord};
use chrono::Utc;
use eyre::{Context, Result};
use std::path::Path;

/// The diagnostics store. All methods take `&self`; concurrent submissions
/// and lookups share one handle, and the backing files are the only shared
/// state.
pub struct Store {
    storage: Storage,
}

impl Store {
    /// Open (creating as needed) a store rooted at the given directory.
    pub fn open(root: &Path) -> Result<Self> {
        let storage = Storage::open(root)?;
        Ok(Self { storage })
    }

    /// Accept a diagnostics submission and persist it under a fresh
    /// reference code.
    ///
    /// The payload must be a JSON object; anything else fails with
    /// [`StoreError::InvalidPayload`] before any storage access. The
    /// record is durable before this returns, so a successful submit is
    /// immediately visible to [`retrieve`](Self::retrieve).
    pub fn submit(&self, payload: serde_json::Value, meta: &RequestMeta) -> Result<SubmissionRecord> {
        if !payload.is_object() {
            return Err(eyre::eyre!(StoreError::InvalidPayload));
        }

        let submitted_at = Utc::now();
        let client_ip = resolve_client_ip(meta);
        let user_agent = meta.header("user-agent").map(String::from);
        let network_headers = capture_network_headers(meta);

        // The exists() pass inside generate_unique is the cheap filter; the
        // exclusive create below is the authority. Losing a create race
        // just means picking another code, bounded like generation itself.
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let id = refid::generate_unique(|candidate| self.storage.exists(candidate))?;
            let record = SubmissionRecord {
                reference_id: id,
                submitted_at,
                client_ip: client_ip.clone(),
                user_agent: user_agent.clone(),
                network_headers: network_headers.clone(),
                diagnostics: payload.clone(),
            };
            if self.storage.create(&record).context("Failed to persist submission record")? {
                return Ok(record);
            }
        }

        Err(eyre::eyre!(StoreError::ExhaustedRetries))
    }

    /// Look up a stored submission by reference code.
    ///
    /// The id is format-checked before any storage access: a malformed id
    /// fails with [`StoreError::MalformedId`], a well-formed id with no
    /// record fails with [`StoreError::NotFound`].
    pub fn retrieve(&self, id: &str) -> Result<SubmissionRecord> {
        let id: ReferenceId = id.parse().map_err(|e: StoreError| eyre::eyre!(e))?;
        self.storage
            .read(&id)?
            .ok_or_else(|| eyre::eyre!(StoreError::NotFound(id.to_string())))
    }

    /// Does a record with this id exist? Format-checked like
    /// [`retrieve`](Self::retrieve).
    pub fn exists(&self, id: &str) -> Result<bool> {
        let id: ReferenceId = id.parse().map_err(|e: StoreError| eyre::eyre!(e))?;
        self.storage.exists(&id)
    }
}
