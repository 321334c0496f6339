//! # IP Origin Labelling
//!
//! Best-effort labelling of the network address a request came from. The
//! label is display metadata on listings and orders, nothing more: it never
//! gates an operation and never blocks a transaction, so the resolver is a
//! synchronous trait object with an offline default.

use std::net::IpAddr;

/// Resolves a request's originating IP to a human-readable origin label.
///
/// Implementations must not fail: when resolution is impossible the
/// `"unknown"` sentinel is the answer, not an error.
pub trait IpLocator: Send + Sync {
    /// Returns an origin label for `ip`.
    fn label(&self, ip: &str) -> String;
}

/// The default resolver: no network lookups.
///
/// Loopback and private-range addresses are labelled `"local"` (development
/// and LAN traffic); everything else, including unparseable input, gets the
/// `"unknown"` sentinel.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLocator;

impl IpLocator for OfflineLocator {
    fn label(&self, ip: &str) -> String {
        match ip.parse::<IpAddr>() {
            Ok(addr) if is_local(&addr) => "local".to_string(),
            _ => "unknown".to_string(),
        }
    }
}

fn is_local(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_private() || v4.is_link_local(),
        IpAddr::V6(v6) => v6.is_loopback(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
