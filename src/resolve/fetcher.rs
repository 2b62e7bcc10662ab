//! The network seam: the [`ImageFetcher`] trait and its stock HTTP
//! implementation.
//!
//! The resolver only ever talks to the trait, so hosts with their own network
//! stack (or tests) inject a different fetcher. [`HttpFetcher`] is a blocking
//! `ureq` client with a per-request timeout and a response size cap.

use std::io::Read;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors are `Clone` because one in-flight fetch result is fanned out to
/// every caller waiting on the same URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, DNS, TLS, or timeout failure — anything below HTTP.
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),
    /// The response body exceeded the configured cap.
    #[error("response larger than {limit} bytes")]
    TooLarge { limit: u64 },
}

/// Scheduling hint for fetchers that queue. Photo-view loads are
/// UI-blocking, so the resolver always asks for [`FetchPriority::High`];
/// prefetchers filling upcoming gallery pages use `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPriority {
    Normal,
    High,
}

/// One fetch, fully described. Header names/values come from the photo's
/// effective auth header; most requests carry none.
#[derive(Debug, Clone)]
pub struct FetchRequest<'a> {
    pub url: &'a Url,
    pub headers: Vec<(String, String)>,
    pub priority: FetchPriority,
    pub timeout: Duration,
}

/// Something that can turn a URL into bytes.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<Vec<u8>, FetchError>;
}

/// Default response size cap: 64 MiB. Full-resolution photos from modern
/// cameras fit comfortably; a runaway response does not.
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;

/// Blocking HTTP fetcher backed by a shared [`ureq::Agent`].
///
/// `ureq` issues one request at a time per call, so [`FetchPriority`] is
/// accepted but cannot reorder anything here; it exists for queueing
/// fetchers layered on top.
pub struct HttpFetcher {
    agent: ureq::Agent,
    max_response_bytes: u64,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_max_response_bytes(DEFAULT_MAX_RESPONSE_BYTES)
    }

    pub fn with_max_response_bytes(max_response_bytes: u64) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            max_response_bytes,
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<Vec<u8>, FetchError> {
        let mut req = self
            .agent
            .get(request.url.as_str())
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            req = req.set(name, value);
        }

        let response = req.call().map_err(|e| match e {
            ureq::Error::Status(code, _) => FetchError::Status(code),
            ureq::Error::Transport(t) => FetchError::Transport(t.to_string()),
        })?;

        // Read one byte past the cap to distinguish "exactly at the limit"
        // from "over it".
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(self.max_response_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        if bytes.len() as u64 > self.max_response_bytes {
            return Err(FetchError::TooLarge {
                limit: self.max_response_bytes,
            });
        }
        Ok(bytes)
    }
}
