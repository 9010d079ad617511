use crate::config::LoaderConfigError;
use crate::net::{BodyMode, LoadState, NetErrorCode, Notification};

/// A notification that arrived out of order. The offending notification is never delivered to
/// the peer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("{0} received after the request completed")]
    AfterTerminal(Notification),

    #[error("Upload progress was not requested for this request")]
    UploadProgressNotRequested,

    #[error("{0} received after a redirect was rejected")]
    AfterRedirectRejected(Notification),

    #[error("Redirect received after the response")]
    RedirectAfterResponse,

    #[error("Response received twice")]
    DuplicateResponse,

    #[error("{0} received before the response")]
    BeforeResponse(Notification),

    #[error("Cached metadata received twice")]
    DuplicateCachedMetadata,

    #[error("{got} does not match body mode {mode}")]
    BodyModeMismatch { got: Notification, mode: BodyMode },

    #[error("Request completed successfully without a response")]
    SuccessWithoutResponse,

    #[error("Request completed with {0} after a rejected redirect")]
    RejectionNotCancelled(NetErrorCode),

    #[error("Combined response received in state {0}")]
    CombinedAfterGranular(LoadState),
}

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Request channel closed")]
    ChannelClosed,

    #[error("Request task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),

    #[error("Invalid loader config: {0}")]
    InvalidConfig(#[from] LoaderConfigError),
}
