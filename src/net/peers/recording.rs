//! A peer that writes down everything it is told.
//!
//! Useful for diagnostics (dumping the exact notification sequence of a request) and as the
//! observation tool in tests. The log lives behind an `Arc<Mutex<_>>` so it can be inspected after
//! the peer itself has been dropped by its dispatcher.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::net::chunk::DataChunk;
use crate::net::completion::CompletionRecord;
use crate::net::peer::RequestPeer;
use crate::net::redirect::RedirectInfo;
use crate::net::response_info::ResponseInfo;

/// Owned copy of a single notification.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    UploadProgress { position: u64, size: u64 },
    Redirect { redirect: RedirectInfo, info: ResponseInfo, accepted: bool },
    Response { info: ResponseInfo },
    CachedMetadata { data: Vec<u8> },
    DownloadedData { len: usize, encoded_data_length: usize },
    Data { data: Vec<u8>, encoded_data_length: usize },
    Completed { completion: CompletionRecord },
    CompletedResponse {
        info: ResponseInfo,
        data: Option<(Vec<u8>, usize)>,
        completion: CompletionRecord,
    },
}

impl PeerEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PeerEvent::Completed { .. } | PeerEvent::CompletedResponse { .. })
    }
}

#[derive(Debug, Default)]
struct LogInner {
    events: Vec<PeerEvent>,
    dropped: bool,
}

/// Shared view on the events of a [`RecordingPeer`].
#[derive(Debug, Clone, Default)]
pub struct PeerLog {
    inner: Arc<Mutex<LogInner>>,
}

impl PeerLog {
    fn lock(&self) -> MutexGuard<'_, LogInner> {
        // a panicking peer must not hide what was recorded before the panic
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, ev: PeerEvent) {
        self.lock().events.push(ev);
    }

    /// Snapshot of all events so far
    pub fn events(&self) -> Vec<PeerEvent> {
        self.lock().events.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_response(&self) -> bool {
        self.lock()
            .events
            .iter()
            .any(|e| matches!(e, PeerEvent::Response { .. } | PeerEvent::CompletedResponse { .. }))
    }

    /// Number of raw data notifications
    pub fn data_events(&self) -> usize {
        self.lock().events.iter().filter(|e| matches!(e, PeerEvent::Data { .. })).count()
    }

    pub fn terminal_events(&self) -> usize {
        self.lock().events.iter().filter(|e| e.is_terminal()).count()
    }

    /// True once the peer has been dropped
    pub fn peer_dropped(&self) -> bool {
        self.lock().dropped
    }
}

/// Peer that records every notification. Redirects are answered from a scripted list, falling
/// back to accepting once the list runs out.
#[derive(Debug, Default)]
pub struct RecordingPeer {
    log: PeerLog,
    redirect_answers: VecDeque<bool>,
}

impl RecordingPeer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_redirect_answers(mut self, answers: Vec<bool>) -> Self {
        self.redirect_answers = answers.into();
        self
    }

    pub fn log(&self) -> PeerLog {
        self.log.clone()
    }
}

impl Drop for RecordingPeer {
    fn drop(&mut self) {
        self.log.lock().dropped = true;
    }
}

impl RequestPeer for RecordingPeer {
    fn on_upload_progress(&mut self, position: u64, size: u64) {
        self.log.push(PeerEvent::UploadProgress { position, size });
    }

    fn on_received_redirect(&mut self, redirect_info: &RedirectInfo, info: &ResponseInfo) -> bool {
        let accepted = self.redirect_answers.pop_front().unwrap_or(true);
        self.log.push(PeerEvent::Redirect {
            redirect: redirect_info.clone(),
            info: info.clone(),
            accepted,
        });
        accepted
    }

    fn on_received_response(&mut self, info: &ResponseInfo) {
        self.log.push(PeerEvent::Response { info: info.clone() });
    }

    fn on_downloaded_data(&mut self, len: usize, encoded_data_length: usize) {
        self.log.push(PeerEvent::DownloadedData { len, encoded_data_length });
    }

    fn on_received_data(&mut self, chunk: DataChunk<'_>) {
        self.log.push(PeerEvent::Data {
            data: chunk.data().to_vec(),
            encoded_data_length: chunk.encoded_len(),
        });
    }

    fn on_received_cached_metadata(&mut self, data: &[u8]) {
        self.log.push(PeerEvent::CachedMetadata { data: data.to_vec() });
    }

    fn on_completed_request(&mut self, completion: &CompletionRecord) {
        self.log.push(PeerEvent::Completed { completion: completion.clone() });
    }

    fn on_received_completed_response(
        &mut self,
        info: &ResponseInfo,
        data: Option<DataChunk<'_>>,
        completion: &CompletionRecord,
    ) {
        self.log.push(PeerEvent::CompletedResponse {
            info: info.clone(),
            data: data.map(|c| (c.data().to_vec(), c.encoded_len())),
            completion: completion.clone(),
        });
    }
}
