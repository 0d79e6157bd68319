//! Canonical zone representation for the dynamic-DNS API.

use crate::error::RegistrarError;

/// Normalize a zone suffix into its canonical form.
///
/// The canonical zone is lower-case, has no leading dot, and ends with
/// exactly one dot: `.EXAMPLE.com` becomes `example.com.`. Applying it twice
/// gives the same result as applying it once.
pub fn normalize_zone(zone: &str) -> Result<String, RegistrarError> {
    let trimmed = zone.trim_start_matches('.').trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(RegistrarError::InvalidZone(zone.to_string()));
    }

    let mut normalized = trimmed.to_lowercase();
    normalized.push('.');
    Ok(normalized)
}

/// Lower-case a record name.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}
