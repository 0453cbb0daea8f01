use crate::{UrlError, UrlResult};
use url::Url;

/// Filenames a web server treats as equivalent to their directory
const DEFAULT_INDEX_FILES: &[&str] = &["index.html", "index.htm"];

/// Resolves a raw link against the page it was found on
///
/// # Resolution Steps
///
/// 1. Parse `raw` relative to `base` (or on its own when there is no base)
/// 2. Lowercase the host
/// 3. Reject the result unless both scheme and host are present
///
/// The fragment is kept; it only matters to [`dedup_key`].
///
/// # Arguments
///
/// * `base` - The URL of the referring page, `None` for the seed
/// * `raw` - The link exactly as it appeared in the page
///
/// # Returns
///
/// * `Ok(Url)` - The absolute, host-lowercased URL
/// * `Err(UrlError)` - The link cannot be turned into a usable absolute URL
///
/// # Examples
///
/// ```
/// use sitegraph::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("http://BaSe.CoM/index.html").unwrap();
/// let url = resolve(Some(&base), "about.html").unwrap();
/// assert_eq!(url.as_str(), "http://base.com/about.html");
/// ```
pub fn resolve(base: Option<&Url>, raw: &str) -> UrlResult<Url> {
    let parsed = match base {
        Some(base) => base.join(raw),
        None => Url::parse(raw),
    };
    let mut url = parsed.map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme().is_empty() {
        return Err(UrlError::MissingScheme);
    }

    let lowered = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_lowercase(),
        _ => return Err(UrlError::MissingHost),
    };

    // Special schemes already come back lowercased from the parser
    if url.host_str() != Some(lowered.as_str()) {
        url.set_host(Some(&lowered))
            .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;
    }

    Ok(url)
}

/// Builds the alias key for a canonical URL
///
/// The key drops the fragment and a trailing default index file
/// (`index.html` / `index.htm`, any case), so that `/dir/`, `/dir/index.html`
/// and `/dir/index.html#top` all share one key. It is only used for
/// deduplication, never for display.
///
/// # Examples
///
/// ```
/// use sitegraph::url::dedup_key;
/// use url::Url;
///
/// let a = Url::parse("http://example.com/dir/INDEX.html#top").unwrap();
/// let b = Url::parse("http://example.com/dir/").unwrap();
/// assert_eq!(dedup_key(&a), dedup_key(&b));
/// ```
pub fn dedup_key(url: &Url) -> String {
    let mut stripped = url.clone();
    stripped.set_fragment(None);

    let path = stripped.path().to_string();
    let (dir, file) = match path.rfind('/') {
        Some(pos) => path.split_at(pos + 1),
        None => ("", path.as_str()),
    };

    if DEFAULT_INDEX_FILES
        .iter()
        .any(|index| file.eq_ignore_ascii_case(index))
    {
        stripped.set_path(dir);
    }

    stripped.to_string()
}
