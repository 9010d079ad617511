//! Ordering rules of the channel → peer protocol.
//!
//! The [`Sequencer`] tracks where a single request is in its lifecycle and decides whether a
//! notification may be delivered next. It does not talk to the peer itself; the
//! [`PeerDispatcher`](crate::net::PeerDispatcher) asks it before every call.
//!
//! # States
//!
//! - [`LoadState::Created`]: nothing but (optional) upload progress has happened yet.
//! - [`LoadState::Redirecting`]: one or more redirects have been accepted.
//! - [`LoadState::RedirectRejected`]: the peer rejected a redirect. Only a cancellation
//!   completion may follow.
//! - [`LoadState::Responded`]: the response headers were delivered.
//! - [`LoadState::ReceivingBody`]: at least one body notification was delivered.
//! - [`LoadState::Completed`]: terminal. Nothing may follow.

use crate::errors::ProtocolError;
use crate::net::error_code::NetErrorCode;
use crate::net::flags::LoadFlags;
use std::fmt::{Display, Formatter};

/// Kind of notification sent to a peer. Completion kinds carry their error code since that code
/// takes part in the ordering rules.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Notification {
    UploadProgress,
    Redirect,
    Response,
    CachedMetadata,
    DownloadedData,
    ReceivedData,
    Completed(NetErrorCode),
    CompletedResponse(NetErrorCode),
}

impl Notification {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Notification::Completed(_) | Notification::CompletedResponse(_))
    }

    fn is_body(&self) -> bool {
        matches!(self, Notification::DownloadedData | Notification::ReceivedData)
    }
}

impl Display for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Notification::UploadProgress => write!(f, "UploadProgress"),
            Notification::Redirect => write!(f, "Redirect"),
            Notification::Response => write!(f, "Response"),
            Notification::CachedMetadata => write!(f, "CachedMetadata"),
            Notification::DownloadedData => write!(f, "DownloadedData"),
            Notification::ReceivedData => write!(f, "ReceivedData"),
            Notification::Completed(code) => write!(f, "Completed({code})"),
            Notification::CompletedResponse(code) => write!(f, "CompletedResponse({code})"),
        }
    }
}

/// How the response body is delivered. Fixed for the lifetime of a request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyMode {
    /// Raw bytes through `on_received_data`
    Data,
    /// Byte counts only through `on_downloaded_data`
    DownloadToFile,
}

impl BodyMode {
    pub fn from_flags(flags: LoadFlags) -> Self {
        if flags.contains(LoadFlags::DOWNLOAD_TO_FILE) {
            BodyMode::DownloadToFile
        } else {
            BodyMode::Data
        }
    }

    fn accepts(&self, n: Notification) -> bool {
        match self {
            BodyMode::Data => n == Notification::ReceivedData,
            BodyMode::DownloadToFile => n == Notification::DownloadedData,
        }
    }
}

impl Display for BodyMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BodyMode::Data => write!(f, "Data"),
            BodyMode::DownloadToFile => write!(f, "DownloadToFile"),
        }
    }
}

/// Lifecycle state of a single request.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Created,
    Redirecting,
    RedirectRejected,
    Responded,
    ReceivingBody,
    Completed,
}

impl LoadState {
    fn has_response(&self) -> bool {
        matches!(self, LoadState::Responded | LoadState::ReceivingBody)
    }

    fn before_response(&self) -> bool {
        matches!(self, LoadState::Created | LoadState::Redirecting)
    }
}

impl Display for LoadState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LoadState::Created => "Created",
            LoadState::Redirecting => "Redirecting",
            LoadState::RedirectRejected => "RedirectRejected",
            LoadState::Responded => "Responded",
            LoadState::ReceivingBody => "ReceivingBody",
            LoadState::Completed => "Completed",
        };
        write!(f, "{s}")
    }
}

/// State machine for one request.
#[derive(Debug, Clone)]
pub struct Sequencer {
    state: LoadState,
    mode: BodyMode,
    upload_progress: bool,
    cached_metadata_seen: bool,
    redirects: usize,
    body_events: usize,
    combined: bool,
}

impl Sequencer {
    pub fn new(flags: LoadFlags) -> Self {
        Self {
            state: LoadState::Created,
            mode: BodyMode::from_flags(flags),
            upload_progress: flags.contains(LoadFlags::REPORT_UPLOAD_PROGRESS),
            cached_metadata_seen: false,
            redirects: 0,
            body_events: 0,
            combined: false,
        }
    }

    /// Checks whether `n` may be delivered next, without changing any state.
    pub fn validate(&self, n: Notification) -> Result<(), ProtocolError> {
        let state = self.state;

        if state == LoadState::Completed {
            return Err(ProtocolError::AfterTerminal(n));
        }

        // After a rejected redirect only a cancellation completion is allowed
        if state == LoadState::RedirectRejected {
            return match n {
                Notification::Completed(code) if code.is_cancellation() => Ok(()),
                Notification::Completed(code) => Err(ProtocolError::RejectionNotCancelled(code)),
                Notification::UploadProgress if !self.upload_progress => Err(ProtocolError::UploadProgressNotRequested),
                _ => Err(ProtocolError::AfterRedirectRejected(n)),
            };
        }

        match n {
            Notification::UploadProgress => {
                if !self.upload_progress {
                    return Err(ProtocolError::UploadProgressNotRequested);
                }
            }
            Notification::Redirect => {
                if state.has_response() {
                    return Err(ProtocolError::RedirectAfterResponse);
                }
            }
            Notification::Response => {
                if state.has_response() {
                    return Err(ProtocolError::DuplicateResponse);
                }
            }
            Notification::CachedMetadata => {
                if state.before_response() {
                    return Err(ProtocolError::BeforeResponse(n));
                }
                if self.cached_metadata_seen {
                    return Err(ProtocolError::DuplicateCachedMetadata);
                }
            }
            Notification::DownloadedData | Notification::ReceivedData => {
                if state.before_response() {
                    return Err(ProtocolError::BeforeResponse(n));
                }
                if !self.mode.accepts(n) {
                    return Err(ProtocolError::BodyModeMismatch { got: n, mode: self.mode });
                }
            }
            Notification::Completed(code) => {
                if state.before_response() && code.is_ok() {
                    return Err(ProtocolError::SuccessWithoutResponse);
                }
            }
            Notification::CompletedResponse(_) => {
                if state.has_response() {
                    return Err(ProtocolError::CombinedAfterGranular(state));
                }
                if self.mode == BodyMode::DownloadToFile {
                    return Err(ProtocolError::BodyModeMismatch { got: n, mode: self.mode });
                }
            }
        }

        Ok(())
    }

    /// Validates `n` and moves the state machine forward.
    pub fn advance(&mut self, n: Notification) -> Result<(), ProtocolError> {
        self.validate(n)?;

        match n {
            Notification::UploadProgress => {}
            Notification::Redirect => {
                self.state = LoadState::Redirecting;
                self.redirects += 1;
            }
            Notification::Response => self.state = LoadState::Responded,
            Notification::CachedMetadata => self.cached_metadata_seen = true,
            n if n.is_body() => {
                self.state = LoadState::ReceivingBody;
                self.body_events += 1;
            }
            Notification::CompletedResponse(_) => {
                self.state = LoadState::Completed;
                self.combined = true;
            }
            _ => self.state = LoadState::Completed,
        }

        Ok(())
    }

    /// Records that the peer rejected the redirect that was just delivered.
    pub fn reject_redirect(&mut self) {
        if self.state == LoadState::Redirecting {
            self.state = LoadState::RedirectRejected;
        }
    }

    #[inline]
    pub fn state(&self) -> LoadState {
        self.state
    }

    #[inline]
    pub fn mode(&self) -> BodyMode {
        self.mode
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.state == LoadState::Completed
    }

    pub fn redirects(&self) -> usize {
        self.redirects
    }

    pub fn body_events(&self) -> usize {
        self.body_events
    }

    /// True when the request ended through the combined notification
    pub fn used_combined(&self) -> bool {
        self.combined
    }
}
