use std::time::Duration;

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use thiserror::Error;

use super::types::{Entry, Link};
use crate::util::{validate_probe_url, UrlValidationError};

/// Upper bound for a single HEAD probe unless configured otherwise.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a failed metadata probe.
///
/// Callers treat every variant as fatal; the split exists so that the
/// report can tell a missing resource apart from a slow or broken server.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe source is not an http(s) URL
    #[error("Invalid probe source `{url}`: {source}")]
    InvalidUrl {
        url: String,
        source: UrlValidationError,
    },
    /// The HEAD request exceeded the configured timeout
    #[error("Probe of `{url}` timed out after {}s", .timeout.as_secs())]
    Timeout { url: String, timeout: Duration },
    /// The server answered 404
    #[error("Probe source not found: `{0}`")]
    NotFound(String),
    /// Any other non-2xx status
    #[error("Probe of `{url}` failed: HTTP status {status}")]
    HttpStatus { url: String, status: u16 },
    /// Connection, DNS or TLS failure
    #[error("Probe of `{url}` failed: {source}")]
    Network { url: String, source: reqwest::Error },
}

/// The two response headers a probe reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeMetadata {
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
}

/// Sends one HEAD request to `url` and reads `Content-Length`/`Content-Type`.
///
/// There is no retry. Headers that are missing or unparseable come back as
/// `None`.
pub async fn probe(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<ProbeMetadata, ProbeError> {
    let parsed = validate_probe_url(url).map_err(|source| ProbeError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    let response = tokio::time::timeout(timeout, client.head(parsed).send())
        .await
        .map_err(|_| ProbeError::Timeout {
            url: url.to_string(),
            timeout,
        })?
        .map_err(|source| {
            if source.is_timeout() {
                ProbeError::Timeout {
                    url: url.to_string(),
                    timeout,
                }
            } else {
                ProbeError::Network {
                    url: url.to_string(),
                    source,
                }
            }
        })?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ProbeError::NotFound(url.to_string()));
    }
    if !status.is_success() {
        return Err(ProbeError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    // Read the raw header: for HEAD responses the body-derived length is 0.
    let headers = response.headers();
    let content_length = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Ok(ProbeMetadata {
        content_length,
        content_type,
    })
}

/// Probes the link's source, if any, and fills in what the link leaves unset.
///
/// Returns `true` when a probe was made. The probe source is always cleared
/// on success.
pub async fn enrich_link(
    client: &reqwest::Client,
    link: &mut Link,
    timeout: Duration,
) -> Result<bool, ProbeError> {
    let Some(source) = link.probe.as_deref() else {
        return Ok(false);
    };

    let metadata = probe(client, source, timeout).await?;
    tracing::debug!(
        href = %link.href,
        probe = %source,
        length = ?metadata.content_length,
        content_type = ?metadata.content_type,
        "Probed link metadata"
    );

    if link.length.is_none() {
        link.length = metadata.content_length;
    }
    if link.media_type.is_none() {
        link.media_type = metadata.content_type;
    }
    link.probe = None;

    Ok(true)
}

/// Enriches every entry link in order, stopping at the first failure.
///
/// Returns the number of links that were probed.
pub async fn enrich_entries(
    client: &reqwest::Client,
    entries: &mut [Entry],
    timeout: Duration,
) -> Result<usize, ProbeError> {
    let mut probed = 0;
    for link in entries.iter_mut().flat_map(|e| e.links.iter_mut()) {
        if enrich_link(client, link, timeout).await? {
            probed += 1;
        }
    }
    Ok(probed)
}
