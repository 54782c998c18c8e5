use crate::UrlError;
use url::Url;

/// Resolves a possibly-relative reference against the URL of the page it was found on
///
/// Standard URL resolution applies: the reference may be absolute,
/// scheme-relative (`//host/path`), path-absolute (`/path`) or relative to the
/// base's directory. The result is in canonical form: the `url` crate's
/// serialization with the fragment removed, since fragments never reach the
/// server and would otherwise produce duplicate fetches of the same resource.
///
/// # Arguments
///
/// * `base` - Absolute URL of the page containing the reference
/// * `reference` - Raw attribute value taken from the document
///
/// # Returns
///
/// * `Ok(Url)` - Canonical absolute URL
/// * `Err(UrlError::Malformed)` - The reference cannot be parsed as a URL component
///
/// # Examples
///
/// ```
/// use site_mirror::url::resolve_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/catalogue/page-1.html").unwrap();
/// let url = resolve_url(&base, "../index.html#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/index.html");
/// ```
pub fn resolve_url(base: &Url, reference: &str) -> Result<Url, UrlError> {
    let mut url = base
        .join(reference.trim())
        .map_err(|e| UrlError::Malformed {
            reference: reference.to_string(),
            reason: e.to_string(),
        })?;

    url.set_fragment(None);
    Ok(url)
}

/// Parses an absolute HTTP(S) URL into canonical form
///
/// Used for the seed, which has no page to be resolved against.
pub fn parse_absolute(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Malformed {
        reference: url_str.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(url_str.to_string()));
    }

    url.set_fragment(None);
    Ok(url)
}
