//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - Plain GET requests with redirects left to the caller
//! - Reading status, `Location` and `Content-Type`, then the body chunk by chunk
//!
//! The coordinator talks to the network only through the [`Transport`] trait,
//! so tests can drive a crawl without a server. Bodies are pulled lazily so
//! binary assets can be streamed to disk instead of held in memory.

use crate::config::HttpConfig;
use reqwest::header::{HeaderMap, HeaderName, CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to the server
///
/// All of them are recoverable: the subpath is marked handled and the crawl
/// moves on.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Reading the body of {url} failed: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("Response from {url} has a non-text {header} header")]
    InvalidHeader { url: String, header: String },
}

/// A response as seen by the crawler: status and headers, body not yet read
#[derive(Debug, Clone)]
pub struct FetchedResponse<B> {
    /// HTTP status code
    pub status: u16,

    /// Raw `Location` header value
    pub location: Option<String>,

    /// Raw `Content-Type` header value
    pub content_type: Option<String>,

    /// Unread body
    pub body: B,
}

impl<B> FetchedResponse<B> {
    /// Returns true for any 3xx status
    pub fn is_redirect(&self) -> bool {
        (300..=399).contains(&self.status)
    }

    /// Media type of the body: the `Content-Type` before any parameters, lowercased
    pub fn media_type(&self) -> Option<String> {
        self.content_type.as_deref().map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    /// Returns true if the media type is one of the given HTML types
    pub fn is_html(&self, html_content_types: &[String]) -> bool {
        self.media_type().is_some_and(|media_type| {
            html_content_types
                .iter()
                .any(|html| html.eq_ignore_ascii_case(&media_type))
        })
    }
}

/// A response body read in chunks
#[allow(async_fn_in_trait)]
pub trait ResponseBody {
    /// Reads the next chunk, or `None` once the body is exhausted
    async fn chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Reads the remaining body into memory
    async fn read_all(&mut self) -> Result<Vec<u8>, TransportError> {
        let mut body = Vec::new();
        while let Some(chunk) = self.chunk().await? {
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

/// Source of responses for the crawler
#[allow(async_fn_in_trait)]
pub trait Transport {
    type Body: ResponseBody;

    /// Issues a single GET request without following redirects
    ///
    /// Only the status line and headers have been received when this returns.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to request
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedResponse)` - Any response, whatever its status code
    /// * `Err(TransportError)` - No usable response was received
    async fn fetch(&self, url: &str) -> Result<FetchedResponse<Self::Body>, TransportError>;
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are never followed; the crawler records them itself.
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_mirror::config::HttpConfig;
/// use site_mirror::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Transport`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport from the HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

impl Transport for HttpTransport {
    type Body = HttpBody;

    async fn fetch(&self, url: &str) -> Result<FetchedResponse<HttpBody>, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        let location = header_text(response.headers(), &LOCATION, url)?;
        let content_type = header_text(response.headers(), &CONTENT_TYPE, url)?;

        Ok(FetchedResponse {
            status,
            location,
            content_type,
            body: HttpBody {
                url: url.to_string(),
                response,
            },
        })
    }
}

/// Body of a reqwest response, pulled from the connection on demand
#[derive(Debug)]
pub struct HttpBody {
    url: String,
    response: Response,
}

impl ResponseBody for HttpBody {
    async fn chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        self.response
            .chunk()
            .await
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .map_err(|source| TransportError::Body {
                url: self.url.clone(),
                source,
            })
    }
}

/// Reads a header as text
fn header_text(
    headers: &HeaderMap,
    name: &HeaderName,
    url: &str,
) -> Result<Option<String>, TransportError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map(str::to_string)
                .map_err(|_| TransportError::InvalidHeader {
                    url: url.to_string(),
                    header: name.to_string(),
                })
        })
        .transpose()
}
