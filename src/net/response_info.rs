//! Response metadata snapshot.
//!
//! A [`ResponseInfo`] describes a response as known at the moment its headers were received, or
//! at the moment a redirect was observed. It is owned by the channel and handed to the peer by
//! reference; the reference is not valid after the callback returns, so a peer that wants to keep
//! anything must clone it.
//!
//! ## Notes
//! - `headers` is an `http::HeaderMap`, which is **case-insensitive** for header names.
//! - `mime_type` and `charset` are derived from `Content-Type` when not set explicitly.
//! - `status_text()` is the canonical reason phrase and may be `"Unknown"` for non-standard codes.

use crate::net::completion::SecurityInfo;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use std::time::{Instant, SystemTime};
use url::Url;

/// Timing information of a single response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTiming {
    /// Wall clock time the request was issued
    pub request_time: SystemTime,
    /// Wall clock time the response headers were received
    pub response_time: SystemTime,
    /// Monotonic moment the request was issued
    pub request_start: Instant,
    /// Monotonic moment the response headers were received
    pub response_start: Instant,
}

impl LoadTiming {
    /// Timing where request and response happen "now". Mostly useful for synthesized responses.
    pub fn now() -> Self {
        let wall = SystemTime::now();
        let mono = Instant::now();
        Self {
            request_time: wall,
            response_time: wall,
            request_start: mono,
            response_start: mono,
        }
    }
}

impl Default for LoadTiming {
    fn default() -> Self {
        Self::now()
    }
}

/// Immutable snapshot of response metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseInfo {
    /// URL this response was received for
    pub url: Url,
    /// Numeric HTTP status code
    pub status: StatusCode,
    /// Response headers as a case-insensitive map
    pub headers: HeaderMap,
    /// Mime type, e.g. `text/html`
    pub mime_type: Option<String>,
    /// Charset, e.g. `utf-8`
    pub charset: Option<String>,
    /// Expected (decoded) body length when known
    pub content_length: Option<u64>,
    /// Number of bytes the response headers took on the wire
    pub encoded_data_length: u64,
    /// Response was served from the cache
    pub was_fetched_via_cache: bool,
    /// Response was fetched through a proxy
    pub was_fetched_via_proxy: bool,
    /// Opaque security summary of the connection
    pub security_info: SecurityInfo,
    pub timing: LoadTiming,
}

impl ResponseInfo {
    pub fn new(url: Url, status: StatusCode) -> Self {
        Self {
            url,
            status,
            headers: HeaderMap::new(),
            mime_type: None,
            charset: None,
            content_length: None,
            encoded_data_length: 0,
            was_fetched_via_cache: false,
            was_fetched_via_proxy: false,
            security_info: SecurityInfo::default(),
            timing: LoadTiming::now(),
        }
    }

    /// Adds a header. `Content-Type` and `Content-Length` also update the derived fields.
    /// Invalid header names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) else {
            log::warn!("ignoring invalid response header {name:?}");
            return self;
        };
        self.headers.append(name, value);
        self.sync_derived_fields();
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self.sync_derived_fields();
        self
    }

    pub fn with_content_length(mut self, len: u64) -> Self {
        self.content_length = Some(len);
        self
    }

    pub fn with_encoded_data_length(mut self, len: u64) -> Self {
        self.encoded_data_length = len;
        self
    }

    pub fn fetched_via_cache(mut self, cached: bool) -> Self {
        self.was_fetched_via_cache = cached;
        self
    }

    pub fn fetched_via_proxy(mut self, proxied: bool) -> Self {
        self.was_fetched_via_proxy = proxied;
        self
    }

    pub fn with_security_info(mut self, info: SecurityInfo) -> Self {
        self.security_info = info;
        self
    }

    pub fn with_timing(mut self, timing: LoadTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Human-readable reason phrase (e.g., `"OK"`, `"Not Found"`).
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown")
    }

    pub fn is_redirect(&self) -> bool {
        // 304 has no location and is not followed
        self.status.is_redirection() && self.status != StatusCode::NOT_MODIFIED
    }

    fn sync_derived_fields(&mut self) {
        if let Some(ct) = self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
            let (mime, charset) = parse_content_type(ct);
            self.mime_type = mime;
            self.charset = charset;
        }

        if let Some(len) = self
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.content_length = Some(len);
        }
    }
}

/// Small, permissive `Content-Type` parser returning the lowercased mime type and charset.
pub(crate) fn parse_content_type(ct: &str) -> (Option<String>, Option<String>) {
    let mut parts = ct.split(';');

    let mime = parts
        .next()
        .map(|m| m.trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty());

    let charset = parts.find_map(|p| {
        let (key, value) = p.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_ascii_lowercase())
        } else {
            None
        }
    });

    (mime, charset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> ResponseInfo {
        ResponseInfo::new(Url::parse("https://example.com/").unwrap(), StatusCode::OK)
    }

    #[test]
    fn content_type_fills_mime_and_charset() {
        let ri = info().with_header("Content-Type", "text/HTML; charset=\"UTF-8\"");
        assert_eq!(ri.mime_type.as_deref(), Some("text/html"));
        assert_eq!(ri.charset.as_deref(), Some("utf-8"));
    }

    #[test]
    fn content_type_without_charset() {
        let ri = info().with_header("content-type", "application/json");
        assert_eq!(ri.mime_type.as_deref(), Some("application/json"));
        assert!(ri.charset.is_none());
    }

    #[test]
    fn content_length_header_sets_length() {
        let ri = info().with_header("Content-Length", " 50 ");
        assert_eq!(ri.content_length, Some(50));

        let ri = info().with_header("Content-Length", "nope");
        assert_eq!(ri.content_length, None);
    }

    #[test]
    fn invalid_headers_are_ignored() {
        let ri = info().with_header("bad header", "value");
        assert!(ri.headers.is_empty());
    }

    #[test]
    fn status_text_and_redirects() {
        assert_eq!(info().status_text(), "OK");

        let moved = ResponseInfo::new(Url::parse("https://example.com/").unwrap(), StatusCode::MOVED_PERMANENTLY);
        assert!(moved.is_redirect());

        let not_modified = ResponseInfo::new(Url::parse("https://example.com/").unwrap(), StatusCode::NOT_MODIFIED);
        assert!(!not_modified.is_redirect());

        let odd = ResponseInfo::new(Url::parse("https://example.com/").unwrap(), StatusCode::from_u16(599).unwrap());
        assert_eq!(odd.status_text(), "Unknown");
    }

    #[test]
    fn with_headers_replaces_map() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "image/png".parse().unwrap());
        let ri = info().with_header("X-Old", "1").with_headers(headers);
        assert!(ri.headers.get("x-old").is_none());
        assert_eq!(ri.mime_type.as_deref(), Some("image/png"));
    }
}
