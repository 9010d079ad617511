use crate::net::error_code::NetErrorCode;
use std::time::Instant;

/// Opaque security/certificate summary handed over by the network layer.
///
/// The protocol never looks inside. Consumers that care (e.g. for showing a padlock) decode it
/// themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityInfo(Vec<u8>);

impl SecurityInfo {
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        Self(raw.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Terminal descriptor of a request. Delivered exactly once, either through
/// [`RequestPeer::on_completed_request`](crate::net::RequestPeer::on_completed_request) or as
/// part of the combined response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    /// Result of the request. Zero on success.
    pub error_code: NetErrorCode,
    /// The transport accepted the response but deliberately did not deliver it as usable content
    pub was_ignored_by_handler: bool,
    /// A stale copy of the resource is present in the cache
    pub stale_copy_in_cache: bool,
    /// Opaque security summary
    pub security_info: SecurityInfo,
    /// Moment the request completed
    pub completion_time: Instant,
    /// Total number of bytes transferred over the wire (headers and body)
    pub total_transfer_size: u64,
}

impl CompletionRecord {
    pub fn success(total_transfer_size: u64) -> Self {
        Self::with_code(NetErrorCode::OK, total_transfer_size)
    }

    pub fn failed(error_code: NetErrorCode, total_transfer_size: u64) -> Self {
        Self::with_code(error_code, total_transfer_size)
    }

    /// Completion for a request that got cancelled (rejected redirect or explicit abort)
    pub fn aborted(total_transfer_size: u64) -> Self {
        Self::with_code(NetErrorCode::ERR_ABORTED, total_transfer_size)
    }

    fn with_code(error_code: NetErrorCode, total_transfer_size: u64) -> Self {
        Self {
            error_code,
            was_ignored_by_handler: false,
            stale_copy_in_cache: false,
            security_info: SecurityInfo::default(),
            completion_time: Instant::now(),
            total_transfer_size,
        }
    }

    pub fn ignored_by_handler(mut self, ignored: bool) -> Self {
        self.was_ignored_by_handler = ignored;
        self
    }

    pub fn stale_copy_in_cache(mut self, stale: bool) -> Self {
        self.stale_copy_in_cache = stale;
        self
    }

    pub fn with_security_info(mut self, info: SecurityInfo) -> Self {
        self.security_info = info;
        self
    }

    pub fn is_success(&self) -> bool {
        self.error_code.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::ErrorKind;

    #[test]
    fn constructors_set_error_codes() {
        assert!(CompletionRecord::success(10).is_success());
        assert_eq!(CompletionRecord::aborted(0).error_code.kind(), ErrorKind::Cancellation);

        let failed = CompletionRecord::failed(NetErrorCode::ERR_CONNECTION_RESET, 42);
        assert!(!failed.is_success());
        assert_eq!(failed.total_transfer_size, 42);
        assert_eq!(failed.error_code.kind(), ErrorKind::NetworkFailure);
    }

    #[test]
    fn flags_are_independent_of_error_code() {
        // Staleness is a flag, not an error: it can ride along with success or failure
        let ok = CompletionRecord::success(0).stale_copy_in_cache(true);
        assert!(ok.is_success());
        assert!(ok.stale_copy_in_cache);

        let failed = CompletionRecord::failed(NetErrorCode::ERR_TIMED_OUT, 0)
            .stale_copy_in_cache(true)
            .ignored_by_handler(true);
        assert!(failed.stale_copy_in_cache);
        assert!(failed.was_ignored_by_handler);
    }

    #[test]
    fn security_info_is_opaque_bytes() {
        let rec = CompletionRecord::success(0).with_security_info(SecurityInfo::new(b"cert".to_vec()));
        assert_eq!(rec.security_info.as_bytes(), b"cert");
        assert!(SecurityInfo::default().is_empty());
    }
}
