use thiserror::Error;
use url::Url;

/// Why a probe source URL was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host to send a request to.
    #[error("URL has no host")]
    MissingHost,
}

/// Validates a probe source URL before a HEAD request is sent to it.
///
/// Only `http` and `https` URLs with a host are accepted. Private and
/// loopback hosts are allowed: probe sources commonly point at object
/// storage inside the publisher's own network.
///
/// # Examples
///
/// ```
/// use inspire_atom::util::validate_probe_url;
///
/// let url = validate_probe_url("https://example.com/data.zip").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// assert!(validate_probe_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_probe_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlValidationError::MissingHost),
    }

    Ok(url)
}

/// True when `s` parses as an absolute URI (scheme included).
///
/// Relative references such as `download/en.xml` are rejected.
pub fn is_absolute_uri(s: &str) -> bool {
    Url::parse(s).is_ok()
}
