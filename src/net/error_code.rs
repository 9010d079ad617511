//! Network error codes.
//!
//! Error codes are owned by the network layer and are opaque to the request peer protocol. The
//! only thing this crate relies on is that `0` means success. Everything else is a failure of some
//! kind, which we classify into a coarse [`ErrorKind`] so consumers can tell a cancellation apart
//! from a real network failure.

use std::fmt;

/// Coarse classification of a [`NetErrorCode`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request finished without error
    Success,
    /// The request was cancelled (rejected redirect or explicit abort)
    Cancellation,
    /// Any other failure (connection reset, timeout, DNS, ...)
    NetworkFailure,
}

/// Opaque integer error code as reported by the network layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NetErrorCode(i32);

impl NetErrorCode {
    pub const OK: NetErrorCode = NetErrorCode(0);
    pub const ERR_FAILED: NetErrorCode = NetErrorCode(-2);
    pub const ERR_ABORTED: NetErrorCode = NetErrorCode(-3);
    pub const ERR_TIMED_OUT: NetErrorCode = NetErrorCode(-7);
    pub const ERR_CONNECTION_RESET: NetErrorCode = NetErrorCode(-101);
    pub const ERR_CONNECTION_REFUSED: NetErrorCode = NetErrorCode(-102);
    pub const ERR_NAME_NOT_RESOLVED: NetErrorCode = NetErrorCode(-105);
    pub const ERR_INTERNET_DISCONNECTED: NetErrorCode = NetErrorCode(-106);
    pub const ERR_TOO_MANY_REDIRECTS: NetErrorCode = NetErrorCode(-310);
    pub const ERR_INVALID_RESPONSE: NetErrorCode = NetErrorCode(-320);
    pub const ERR_CONTENT_DECODING_FAILED: NetErrorCode = NetErrorCode(-330);

    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    #[inline]
    pub const fn code(&self) -> i32 {
        self.0
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.0 == 0
    }

    pub fn kind(&self) -> ErrorKind {
        match *self {
            NetErrorCode::OK => ErrorKind::Success,
            NetErrorCode::ERR_ABORTED => ErrorKind::Cancellation,
            _ => ErrorKind::NetworkFailure,
        }
    }

    pub fn is_cancellation(&self) -> bool {
        self.kind() == ErrorKind::Cancellation
    }

    fn name(&self) -> Option<&'static str> {
        let name = match *self {
            NetErrorCode::OK => "OK",
            NetErrorCode::ERR_FAILED => "ERR_FAILED",
            NetErrorCode::ERR_ABORTED => "ERR_ABORTED",
            NetErrorCode::ERR_TIMED_OUT => "ERR_TIMED_OUT",
            NetErrorCode::ERR_CONNECTION_RESET => "ERR_CONNECTION_RESET",
            NetErrorCode::ERR_CONNECTION_REFUSED => "ERR_CONNECTION_REFUSED",
            NetErrorCode::ERR_NAME_NOT_RESOLVED => "ERR_NAME_NOT_RESOLVED",
            NetErrorCode::ERR_INTERNET_DISCONNECTED => "ERR_INTERNET_DISCONNECTED",
            NetErrorCode::ERR_TOO_MANY_REDIRECTS => "ERR_TOO_MANY_REDIRECTS",
            NetErrorCode::ERR_INVALID_RESPONSE => "ERR_INVALID_RESPONSE",
            NetErrorCode::ERR_CONTENT_DECODING_FAILED => "ERR_CONTENT_DECODING_FAILED",
            _ => return None,
        };
        Some(name)
    }
}

impl From<i32> for NetErrorCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for NetErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "net error {}", self.0),
        }
    }
}
