use thiserror::Error;
use url::Url;

/// Errors building or vetting a URL before handing it to the browser.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL cannot take a path: {0}")]
    CannotBeABase(String),
    #[error("Listing has no purchase id")]
    EmptyId,
}

/// Checks that a URL is safe to pass to `open::that`.
///
/// Only `http` and `https` are accepted; anything else (`file:`, `javascript:`,
/// custom handlers) could launch an arbitrary program.
pub fn validate_url_for_open(url: &Url) -> Result<(), UrlValidationError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}

/// Builds the purchase page URL for a listing.
///
/// The external id is appended as a single path segment, so ids containing
/// `/`, `?` or `..` are percent-encoded rather than changing the target.
///
/// ```
/// use listwatch::util::purchase_url;
///
/// let url = purchase_url("https://nbatopshot.com/moment/", "abc-123").unwrap();
/// assert_eq!(url.as_str(), "https://nbatopshot.com/moment/abc-123");
/// ```
pub fn purchase_url(base: &str, external_id: &str) -> Result<Url, UrlValidationError> {
    if external_id.trim().is_empty() {
        return Err(UrlValidationError::EmptyId);
    }

    let mut url = Url::parse(base)?;
    validate_url_for_open(&url)?;
    url.path_segments_mut()
        .map_err(|_| UrlValidationError::CannotBeABase(base.to_owned()))?
        .pop_if_empty()
        .push(external_id);
    Ok(url)
}
