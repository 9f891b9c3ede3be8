//! Download request/response types and the client trait.

use std::borrow::Cow;
use std::future::Future;

use http::header::{ACCEPT, USER_AGENT};
use http::{HeaderMap, HeaderValue, StatusCode};
use url::Url;

use super::HttpError;

/// A GET request for one raw documentation file.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// File location
    pub url: Url,
    /// Headers sent with the request
    pub headers: HeaderMap,
}

impl HttpRequest {
    /// Requests `url` with plain-text content negotiation.
    #[must_use]
    pub fn get(url: Url) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/plain, */*"));
        Self { url, headers }
    }

    /// Sets the `User-Agent` header, replacing any previous value.
    ///
    /// Values that are not valid header text are ignored.
    #[must_use]
    pub fn with_user_agent(mut self, agent: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(agent) {
            self.headers.insert(USER_AGENT, value);
        }
        self
    }
}

/// Status and fully buffered body of a download.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub const fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// A `200 OK` response carrying `body`.
    #[must_use]
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::OK, body.into())
    }

    /// True for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The body as text; invalid UTF-8 sequences are replaced.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Downloads documentation files.
///
/// The docs strategy is generic over the client so tests can serve canned
/// pages.
pub trait HttpClient: Send + Sync {
    /// Performs `req`.
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure, timeout, an unusable URL
    /// or a body larger than the client accepts.
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;
}
