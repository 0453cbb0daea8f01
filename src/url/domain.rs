use url::Url;

/// Extracts the host from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitegraph::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// The host boundary of a crawl
///
/// A URL is in scope when its host and explicit port match the seed's,
/// whatever its scheme. Everything else is remote and is never fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostScope {
    host: String,
    port: Option<u16>,
}

impl HostScope {
    /// Creates the scope of a crawl from its canonical seed URL
    pub fn new(seed: &Url) -> Self {
        Self {
            host: extract_host(seed).unwrap_or_default(),
            port: seed.port(),
        }
    }

    /// Returns true if `url` belongs to the crawled site
    pub fn contains(&self, url: &Url) -> bool {
        extract_host(url).as_deref() == Some(self.host.as_str())
            && url.port() == self.port
    }

    /// The seed's host
    pub fn host(&self) -> &str {
        &self.host
    }
}
