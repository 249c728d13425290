//! Network metadata derivation from inbound requests.
//!
//! The store does not touch HTTP types directly; the server layer hands it
//! a [`RequestMeta`] holding the request's headers and transport peer
//! address, and the functions here derive the client address and the
//! captured header set from it.

use crate::types::NetworkHeaderSet;
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Non-`x-` headers copied into the record when present: standard proxy
/// and CDN/edge headers plus a few informational ones. The `x-` family is
/// captured wholesale by prefix and needs no listing here.
const CAPTURED_HEADERS: &[&str] = &[
    "via",
    "forwarded",
    "true-client-ip",
    "cf-connecting-ip",
    "cf-ray",
    "cf-ipcountry",
    "cf-visitor",
    "cf-worker",
    "fastly-client-ip",
    "fly-client-ip",
    "akamai-origin-hop",
    "dnt",
    "save-data",
];

/// Prefix capture for the forwarding/tracing header family.
const CAPTURED_PREFIX: &str = "x-";

/// The request-side inputs a submission needs: header access plus the
/// transport-level peer address. Header names are stored lower-cased; the
/// first value seen for a name wins.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    headers: BTreeMap<String, String>,
    peer_addr: Option<IpAddr>,
}

impl RequestMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style header insertion, mainly for tests and callers
    /// assembling metadata by hand.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.insert_header(name, value);
        self
    }

    pub fn with_peer_addr(mut self, addr: IpAddr) -> Self {
        self.peer_addr = Some(addr);
        self
    }

    /// Record a header. Names are lower-cased; repeated names keep the
    /// first value.
    pub fn insert_header(&mut self, name: &str, value: &str) {
        self.headers.entry(name.to_ascii_lowercase()).or_insert_with(|| value.to_string());
    }

    /// Look up a header by (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn peer_addr(&self) -> Option<IpAddr> {
        self.peer_addr
    }
}

/// Resolve the client address, best effort.
///
/// Priority: CDN-edge connecting IP, then the leftmost entry of
/// `x-forwarded-for`, then `x-real-ip`, then the client-declared
/// `true-client-ip`, then the transport peer address.
pub fn resolve_client_ip(meta: &RequestMeta) -> String {
    if let Some(ip) = meta.header("cf-connecting-ip") {
        return ip.trim().to_string();
    }
    if let Some(list) = meta.header("x-forwarded-for")
        && let Some(first) = list.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }
    if let Some(ip) = meta.header("x-real-ip") {
        return ip.trim().to_string();
    }
    if let Some(ip) = meta.header("true-client-ip") {
        return ip.trim().to_string();
    }
    match meta.peer_addr() {
        Some(addr) => addr.to_string(),
        None => "unknown".to_string(),
    }
}

/// Copy every present header that is on the allow-list or carries the
/// `x-` prefix. Absent headers are simply not represented.
pub fn capture_network_headers(meta: &RequestMeta) -> NetworkHeaderSet {
    let mut captured = NetworkHeaderSet::new();
    for (name, value) in meta.headers() {
        if CAPTURED_HEADERS.contains(&name) || name.starts_with(CAPTURED_PREFIX) {
            captured.insert(name.to_string(), value.to_string());
        }
    }
    captured
}
