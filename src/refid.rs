//! Reference-code generation for diagnostics submissions.

use crate::types::StoreError;
use eyre::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Symbols drawn for generated codes: uppercase letters and digits with
/// the visually ambiguous ones removed (no 0/O, no 1/I/L).
const ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Codes are three hyphen-joined groups of five symbols.
const GROUP_LEN: usize = 5;
const GROUP_COUNT: usize = 3;

/// Attempt ceiling for collision-checked generation. With 15 random
/// symbols per code this is a defensive bound, not an operating path.
pub const MAX_GENERATE_ATTEMPTS: u32 = 10;

/// A reference code like "AB2CD-EFGHJ-23456", shared with the submitter
/// and used for later support lookup.
///
/// Parsing accepts the documented wire pattern
/// `^[A-Z0-9]{5}-[A-Z0-9]{5}-[A-Z0-9]{5}$`; generation draws only from
/// the restricted alphabet, a subset of that class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(String);

impl ReferenceId {
    /// Generate a random code. Pure draw from the alphabet; uniqueness
    /// against the store is the caller's concern (see [`generate_unique`]).
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut code = String::with_capacity(GROUP_COUNT * (GROUP_LEN + 1) - 1);
        for group in 0..GROUP_COUNT {
            if group > 0 {
                code.push('-');
            }
            for _ in 0..GROUP_LEN {
                code.push(ALPHABET[rng.random_range(0..ALPHABET.len())] as char);
            }
        }
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ReferenceId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut groups = 0;
        for group in s.split('-') {
            groups += 1;
            let valid = group.len() == GROUP_LEN
                && group.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
            if groups > GROUP_COUNT || !valid {
                return Err(StoreError::MalformedId(s.to_string()));
            }
        }
        if groups != GROUP_COUNT {
            return Err(StoreError::MalformedId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

/// Generate a code that does not collide with an existing record.
///
/// `exists` is the store's existence check. Retries up to
/// [`MAX_GENERATE_ATTEMPTS`] times and fails with
/// [`StoreError::ExhaustedRetries`] rather than ever returning a
/// colliding code.
pub fn generate_unique<F>(mut exists: F) -> Result<ReferenceId>
where
    F: FnMut(&ReferenceId) -> Result<bool>,
{
    for _ in 0..MAX_GENERATE_ATTEMPTS {
        let id = ReferenceId::generate();
        if !exists(&id)? {
            return Ok(id);
        }
    }
    Err(eyre::eyre!(StoreError::ExhaustedRetries))
}
