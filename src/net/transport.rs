//! Transport side of a request.
//!
//! The actual fetching (sockets, HTTP parsing, caches, following redirects) happens somewhere
//! else. Whatever does it reports back through a [`TransportSender`], which turns every call into
//! a [`TransportEvent`] for the request's channel. The channel checks the
//! ordering and forwards to the peer.
//!
//! The terminal methods ([`TransportSender::complete`] and
//! [`TransportSender::completed_response`]) consume the sender, so a transport cannot send
//! anything after the end of a request.

use crate::errors::LoaderError;
use crate::net::completion::CompletionRecord;
use crate::net::error_code::NetErrorCode;
use crate::net::handle::RequestId;
use crate::net::redirect::RedirectInfo;
use crate::net::response_info::ResponseInfo;
use tokio::sync::{mpsc, oneshot};

/// Message from a transport to its channel.
#[derive(Debug)]
pub enum TransportEvent {
    UploadProgress {
        position: u64,
        size: u64,
    },
    /// A redirect hop. The channel answers on `reply` whether to follow it.
    Redirect {
        redirect: RedirectInfo,
        info: ResponseInfo,
        reply: oneshot::Sender<bool>,
    },
    Response(ResponseInfo),
    CachedMetadata(Vec<u8>),
    Data {
        data: Vec<u8>,
        encoded_data_length: usize,
    },
    DownloadedData {
        len: usize,
        encoded_data_length: usize,
    },
    Complete(CompletionRecord),
    CompletedResponse {
        info: ResponseInfo,
        data: Option<Vec<u8>>,
        encoded_data_length: usize,
        completion: CompletionRecord,
    },
}

/// Handle used by a transport to drive a single request.
#[derive(Debug)]
pub struct TransportSender {
    id: RequestId,
    tx: mpsc::Sender<TransportEvent>,
}

impl TransportSender {
    pub(crate) fn new(id: RequestId, tx: mpsc::Sender<TransportEvent>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    /// True when the channel has gone away (request ended or aborted)
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the channel has gone away. Lets a transport stop fetching early.
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    async fn send(&self, ev: TransportEvent) -> Result<(), LoaderError> {
        self.tx.send(ev).await.map_err(|_| LoaderError::ChannelClosed)
    }

    pub async fn upload_progress(&self, position: u64, size: u64) -> Result<(), LoaderError> {
        self.send(TransportEvent::UploadProgress { position, size }).await
    }

    /// Reports a redirect hop and waits for the decision. `false` means: stop, do not issue the
    /// next hop.
    pub async fn redirect(&self, redirect: RedirectInfo, info: ResponseInfo) -> Result<bool, LoaderError> {
        let (reply, rx) = oneshot::channel();
        self.send(TransportEvent::Redirect { redirect, info, reply }).await?;
        rx.await.map_err(|_| LoaderError::ChannelClosed)
    }

    pub async fn response(&self, info: ResponseInfo) -> Result<(), LoaderError> {
        self.send(TransportEvent::Response(info)).await
    }

    pub async fn cached_metadata(&self, data: Vec<u8>) -> Result<(), LoaderError> {
        self.send(TransportEvent::CachedMetadata(data)).await
    }

    pub async fn data(&self, data: Vec<u8>, encoded_data_length: usize) -> Result<(), LoaderError> {
        self.send(TransportEvent::Data { data, encoded_data_length }).await
    }

    pub async fn downloaded_data(&self, len: usize, encoded_data_length: usize) -> Result<(), LoaderError> {
        self.send(TransportEvent::DownloadedData { len, encoded_data_length }).await
    }

    pub async fn complete(self, completion: CompletionRecord) -> Result<(), LoaderError> {
        self.send(TransportEvent::Complete(completion)).await
    }

    pub async fn completed_response(
        self,
        info: ResponseInfo,
        data: Option<Vec<u8>>,
        encoded_data_length: usize,
        completion: CompletionRecord,
    ) -> Result<(), LoaderError> {
        self.send(TransportEvent::CompletedResponse {
            info,
            data,
            encoded_data_length,
            completion,
        })
        .await
    }
}

impl ResponseInfo {
    /// Snapshot of the metadata of a reqwest response. The body is left untouched.
    pub fn from_reqwest(res: &reqwest::Response) -> Self {
        let info = ResponseInfo::new(res.url().clone(), res.status()).with_headers(res.headers().clone());
        match res.content_length() {
            Some(len) => info.with_content_length(len),
            None => info,
        }
    }
}

impl NetErrorCode {
    /// Maps a reqwest error onto the closest network error code.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            NetErrorCode::ERR_TIMED_OUT
        } else if err.is_connect() {
            NetErrorCode::ERR_CONNECTION_REFUSED
        } else if err.is_redirect() {
            NetErrorCode::ERR_TOO_MANY_REDIRECTS
        } else if err.is_body() || err.is_decode() {
            NetErrorCode::ERR_CONTENT_DECODING_FAILED
        } else {
            NetErrorCode::ERR_FAILED
        }
    }
}
