//! Small helpers shared by the HTTP-speaking backends.

use reqwest::{Response, StatusCode, Url};

/// Turn a configured address into a base URL without a trailing slash.
///
/// Accepts either `host:port` or a full URL; `http://` is assumed when no
/// scheme is given. The result must parse as an `http` or `https` URL with a
/// host, otherwise the parse failure is returned as a message.
pub fn base_url(address: &str) -> Result<String, String> {
    let address = address.trim().trim_end_matches('/');
    let base = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    };

    let url = Url::parse(&base).map_err(|e| format!("invalid address {address:?}: {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme in {address:?}"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(format!("missing host in {address:?}"));
    }
    Ok(base)
}

/// Consume a response, returning its status and body text.
///
/// The body is always read to the end so the connection can go back to the
/// pool; a body that fails to read is reported as empty.
pub async fn drain(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    (status, body)
}
