//! HTTP fetcher implementation
//!
//! This module handles all network access for the crawler:
//! - The `Fetcher` trait the coordinator is driven through
//! - A reqwest-backed implementation with a proper user agent string
//! - HEAD probing to classify a resource before downloading it
//! - GET requests for HTML pages only

use crate::config::Config;
use crate::crawler::parser::parse_html;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use url::Url;

/// Maximum number of redirects the HTTP client follows
const MAX_REDIRECTS: usize = 10;

/// Response to a metadata-only probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadResponse {
    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, if present
    pub content_type: Option<String>,
}

/// Response to a content fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyResponse {
    /// HTTP status code
    pub status: u16,

    /// Decoded body text
    pub body: String,
}

/// Network collaborator used by the coordinator
///
/// Both calls fail only at the transport level; any HTTP status is returned
/// as a response and judged by the caller.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issues a HEAD request
    async fn head(&self, url: &Url) -> Result<HeadResponse, FetchError>;

    /// Issues a GET request and reads the body as text
    async fn get(&self, url: &Url) -> Result<BodyResponse, FetchError>;
}

/// Result of probing and (for HTML) fetching one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// HTML page fetched and scanned
    Page {
        /// Page title, empty if none
        title: String,
        /// Raw link strings in document order
        links: Vec<String>,
    },

    /// Reachable non-HTML resource; the body was not downloaded
    Asset {
        /// The media type reported by the probe
        content_type: String,
    },

    /// Probe or fetch failed
    Broken {
        /// Why the item is broken
        error: FetchError,
    },
}

/// Fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher from the crawl configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn head(&self, url: &Url) -> Result<HeadResponse, FetchError> {
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(HeadResponse {
            status: response.status().as_u16(),
            content_type,
        })
    }

    async fn get(&self, url: &Url) -> Result<BodyResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(BodyResponse { status, body })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawl configuration (user agent and timeouts)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitegraph::config::Config;
/// use sitegraph::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(config.crawler.request_timeout())
        .connect_timeout(config.crawler.connect_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

fn classify_transport_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Returns true if a Content-Type value names an HTML document
///
/// Only the media type is considered; parameters such as `charset` are ignored.
pub fn is_html(content_type: &str) -> bool {
    media_type(content_type).is_some_and(|media| media == "text/html")
}

/// Extracts the lowercased `type/subtype` from a Content-Type value
///
/// Both halves must be non-empty HTTP tokens; anything else has no media type.
fn media_type(content_type: &str) -> Option<String> {
    let media = content_type.split(';').next()?.trim();
    let (kind, subtype) = media.split_once('/')?;
    if !is_token(kind) || !is_token(subtype) {
        return None;
    }
    Some(media.to_ascii_lowercase())
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

/// Probes an item and fetches it if it is an HTML page
///
/// # Request Flow
///
/// 1. Send HEAD request
///    - Transport failure or non-2xx status → Broken
///    - Missing or unparseable Content-Type → Broken
///    - Non-HTML Content-Type → Asset (body never downloaded)
/// 2. Send GET request (HTML only)
///    - Transport failure or non-2xx status → Broken
/// 3. Scan the body for a title and raw links
///
/// No request is ever retried.
///
/// # Arguments
///
/// * `fetcher` - The network collaborator
/// * `url` - The canonical URL of the item
///
/// # Returns
///
/// A FetchResult classifying the item
pub async fn probe_and_fetch(fetcher: &dyn Fetcher, url: &Url) -> FetchResult {
    let head = match fetcher.head(url).await {
        Ok(head) => head,
        Err(error) => return FetchResult::Broken { error },
    };

    if !is_success(head.status) {
        return FetchResult::Broken {
            error: FetchError::Status {
                url: url.to_string(),
                status: head.status,
            },
        };
    }

    let Some(media) = head.content_type.as_deref().and_then(media_type) else {
        return FetchResult::Broken {
            error: FetchError::UnknownContentType {
                url: url.to_string(),
            },
        };
    };

    if !is_html(&media) {
        return FetchResult::Asset {
            content_type: media,
        };
    }

    let page = match fetcher.get(url).await {
        Ok(page) => page,
        Err(error) => return FetchResult::Broken { error },
    };

    if !is_success(page.status) {
        return FetchResult::Broken {
            error: FetchError::Status {
                url: url.to_string(),
                status: page.status,
            },
        };
    }

    let parsed = parse_html(&page.body);
    FetchResult::Page {
        title: parsed.title,
        links: parsed.links,
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
