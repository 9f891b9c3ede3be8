//! Production HTTP client implementation using reqwest.

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Largest response body accepted by default (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Production HTTP client using reqwest.
///
/// Bodies are streamed and rejected once they grow past the configured cap,
/// so a misbehaving server cannot exhaust memory.
///
/// # Example
///
/// ```no_run
/// use confscout::fetch::{HttpClient, HttpRequest, ReqwestClient};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReqwestClient::new();
/// let url = Url::parse("https://raw.githubusercontent.com/zed-industries/zed/main/README.md")?;
/// let response = client.request(HttpRequest::get(url)).await?;
/// println!("Status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
    max_body: usize,
}

impl ReqwestClient {
    /// Creates a new HTTP client with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_client(reqwest::Client::new())
    }

    /// Creates an HTTP client from an existing reqwest client.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self {
            inner: client,
            max_body: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Sets the response body cap in bytes.
    #[must_use]
    pub const fn with_max_body(mut self, limit: usize) -> Self {
        self.max_body = limit;
        self
    }

    /// Returns the response body cap in bytes.
    #[must_use]
    pub const fn max_body(&self) -> usize {
        self.max_body
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut response = self
            .inner
            .get(req.url.as_str())
            .headers(req.headers)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if response
            .content_length()
            .is_some_and(|len| len > self.max_body as u64)
        {
            return Err(HttpError::BodyTooLarge {
                limit: self.max_body,
            });
        }

        let status = response.status();

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(map_reqwest_error)? {
            if body.len() + chunk.len() > self.max_body {
                return Err(HttpError::BodyTooLarge {
                    limit: self.max_body,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(HttpResponse::new(status, body))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else if e.is_builder() {
        HttpError::InvalidUrl(e.to_string())
    } else {
        HttpError::Connection(Box::new(e))
    }
}
