//! Domain name to SkyDNS storage key conversion.
//!
//! ```text
//! svc.ns.svc.cluster.local  →  /skydns/local/cluster/svc/ns/svc
//! ```
//!
//! Sibling names under one zone share a key prefix, which is what lets the
//! DNS server enumerate a zone with a single prefix range read.

/// Root path every host record key lives under.
pub const SKYDNS_PREFIX: &str = "/skydns";

/// Convert a fully-qualified domain name into its storage key.
///
/// Labels are reversed and joined under [`SKYDNS_PREFIX`], and the whole key is
/// lower-cased. Empty labels (from a trailing dot or `..`) are skipped, so the
/// empty string maps to the bare prefix.
pub fn storage_key(domain: &str) -> String {
    let mut key = String::with_capacity(SKYDNS_PREFIX.len() + domain.len() + 1);
    key.push_str(SKYDNS_PREFIX);

    for label in domain.rsplit('.').filter(|label| !label.is_empty()) {
        key.push('/');
        key.push_str(label);
    }

    key.to_lowercase()
}

/// Whether `domain` contains at least one non-empty label.
pub(crate) fn has_labels(domain: &str) -> bool {
    domain.split('.').any(|label| !label.is_empty())
}
