//! Buffered response model.
//!
//! This struct represents a **fully buffered** response as assembled by the
//! [`ResponseCollector`](crate::net::peers::collector::ResponseCollector). It contains the final
//! URL (after redirects), status code and reason, response headers, the raw body bytes, and what
//! the loader reported along the way.
//!
//! ## Notes
//! - The body is stored as raw `Vec<u8>`. For text responses, convert with
//!   [`Response::text`]. For JSON, parse with `serde_json::from_slice::<T>(&resp.body)`.
//! - `headers` is an `http::HeaderMap`, which is **case-insensitive** for
//!   header names.
//! - `status_text` is derived from the status code's canonical reason phrase and is
//!   `"Unknown"` for non-standard codes.
//! - For download-to-file requests the body stays empty and `downloaded_bytes` tells how much
//!   ended up on disk.

use http::{HeaderMap, StatusCode};
use url::Url;

use crate::net::response_info::ResponseInfo;

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Final URL of the response (after redirects, if any).
    pub url: Url,

    pub status: StatusCode,

    /// Human-readable reason phrase (e.g., `"OK"`, `"Not Found"`).
    pub status_text: String,

    /// Response headers as a case-insensitive map.
    pub headers: HeaderMap,

    pub mime_type: Option<String>,

    /// Raw response body bytes.
    pub body: Vec<u8>,

    /// Target of every followed redirect hop, in order
    pub redirect_chain: Vec<Url>,

    /// Cached metadata attached to the resource, if the cache delivered any
    pub cached_metadata: Option<Vec<u8>>,

    /// Bytes written to file in download-to-file mode
    pub downloaded_bytes: u64,

    /// Encoded (wire) size of the whole transfer
    pub total_transfer_size: u64,

    pub from_cache: bool,
    pub stale_copy_in_cache: bool,
}

impl Response {
    pub(crate) fn from_info(info: &ResponseInfo, redirect_chain: Vec<Url>) -> Self {
        Self {
            url: info.url.clone(),
            status: info.status,
            status_text: info.status_text().to_string(),
            headers: info.headers.clone(),
            mime_type: info.mime_type.clone(),
            body: Vec::new(),
            redirect_chain,
            cached_metadata: None,
            downloaded_bytes: 0,
            total_transfer_size: 0,
            from_cache: info.was_fetched_via_cache,
            stale_copy_in_cache: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn was_redirected(&self) -> bool {
        !self.redirect_chain.is_empty()
    }
}
