use crate::errors::LoaderError;
use crate::net::error_code::NetErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A unique identifier for a request, represented as a UUID.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened to a request, reported once it has ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub id: RequestId,
    /// Error code of the terminal notification, `None` if the request never ended
    pub error_code: Option<NetErrorCode>,
    /// Number of redirects delivered to the peer
    pub redirects: usize,
    /// Decoded body bytes delivered to the peer
    pub bytes_received: u64,
    /// Encoded (wire) body bytes delivered to the peer
    pub encoded_bytes: u64,
    /// The request ended through the combined notification
    pub combined: bool,
}

/// Owning handle of an in-flight request.
///
/// The handle and the request are co-terminated: dropping the handle aborts the request, and the
/// peer then receives an aborted completion. Keep the handle around for as long as the request
/// should live.
#[derive(Debug)]
pub struct RequestHandle {
    id: RequestId,
    cancel: CancellationToken,
    join: Option<JoinHandle<Result<LoadSummary, LoaderError>>>,
}

impl RequestHandle {
    pub(crate) fn new(
        id: RequestId,
        cancel: CancellationToken,
        join: JoinHandle<Result<LoadSummary, LoaderError>>,
    ) -> Self {
        Self {
            id,
            cancel,
            join: Some(join),
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Asks the channel to abort. The peer still gets its terminal notification.
    pub fn abort(&self) {
        log::debug!("Request[{}]: abort requested", self.id);
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, |j| j.is_finished())
    }

    /// Waits for the request to end.
    pub async fn wait(mut self) -> Result<LoadSummary, LoaderError> {
        let join = self.join.take().ok_or(LoaderError::ChannelClosed)?;
        join.await?
    }
}

impl Drop for RequestHandle {
    fn drop(&mut self) {
        // No-op when the request already ended
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_unique() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 36);

        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(serde_json::from_str::<RequestId>(&json).unwrap(), a);
    }

    #[tokio::test]
    async fn dropping_the_handle_cancels() {
        let cancel = CancellationToken::new();
        let child = cancel.clone();
        let id = RequestId::new();
        let join = tokio::spawn(async move {
            child.cancelled().await;
            Ok(LoadSummary {
                id,
                error_code: Some(NetErrorCode::ERR_ABORTED),
                redirects: 0,
                bytes_received: 0,
                encoded_bytes: 0,
                combined: false,
            })
        });

        let handle = RequestHandle::new(id, cancel.clone(), join);
        assert_eq!(handle.id(), id);
        drop(handle);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn wait_returns_task_result() {
        let id = RequestId::new();
        let join = tokio::spawn(async move {
            Ok(LoadSummary {
                id,
                error_code: Some(NetErrorCode::OK),
                redirects: 1,
                bytes_received: 5,
                encoded_bytes: 5,
                combined: true,
            })
        });

        let handle = RequestHandle::new(id, CancellationToken::new(), join);
        let summary = handle.wait().await.unwrap();
        assert_eq!(summary.error_code, Some(NetErrorCode::OK));
        assert!(summary.combined);
    }
}
