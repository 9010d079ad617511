use crate::errors::ProtocolError;
use crate::net::chunk::DataChunk;
use crate::net::completion::CompletionRecord;
use crate::net::error_code::NetErrorCode;
use crate::net::flags::LoadFlags;
use crate::net::handle::{LoadSummary, RequestId};
use crate::net::peer::BoxedPeer;
use crate::net::protocol::{LoadState, Notification, Sequencer};
use crate::net::redirect::RedirectInfo;
use crate::net::response_info::ResponseInfo;

/// Sits between a channel and its peer and makes sure the peer only ever sees a valid
/// notification sequence.
///
/// Every method first asks the [`Sequencer`] whether the notification is allowed. A rejected
/// notification returns a [`ProtocolError`] and never reaches the peer. Once the terminal
/// notification has been delivered the peer is dropped, so the peer lives exactly as long as the
/// request. Dropping a dispatcher before that point delivers an aborted completion first.
pub struct PeerDispatcher {
    id: RequestId,
    peer: Option<BoxedPeer>,
    sequencer: Sequencer,
    bytes_received: u64,
    encoded_bytes: u64,
    final_code: Option<NetErrorCode>,
}

impl std::fmt::Debug for PeerDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerDispatcher")
            .field("id", &self.id)
            .field("peer", &self.peer.as_ref().map(|_| "Box<dyn RequestPeer>"))
            .field("sequencer", &self.sequencer)
            .finish_non_exhaustive()
    }
}

impl PeerDispatcher {
    pub fn new(id: RequestId, flags: LoadFlags, peer: BoxedPeer) -> Self {
        Self {
            id,
            peer: Some(peer),
            sequencer: Sequencer::new(flags),
            bytes_received: 0,
            encoded_bytes: 0,
            final_code: None,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn state(&self) -> LoadState {
        self.sequencer.state()
    }

    pub fn is_terminated(&self) -> bool {
        self.sequencer.is_terminated()
    }

    /// True while the peer is still alive
    pub fn has_peer(&self) -> bool {
        self.peer.is_some()
    }

    /// Checks whether `n` would be accepted right now
    pub fn validate(&self, n: Notification) -> Result<(), ProtocolError> {
        self.sequencer.validate(n)
    }

    pub fn upload_progress(&mut self, position: u64, size: u64) -> Result<(), ProtocolError> {
        let peer = self.begin(Notification::UploadProgress)?;
        peer.on_upload_progress(position, size);
        Ok(())
    }

    /// Delivers a redirect and returns the peer's decision.
    pub fn received_redirect(&mut self, redirect: &RedirectInfo, info: &ResponseInfo) -> Result<bool, ProtocolError> {
        let peer = self.begin(Notification::Redirect)?;
        let follow = peer.on_received_redirect(redirect, info);
        if !follow {
            log::debug!("Request[{}]: redirect to {} rejected by peer", self.id, redirect.new_url);
            self.sequencer.reject_redirect();
        }
        Ok(follow)
    }

    pub fn received_response(&mut self, info: &ResponseInfo) -> Result<(), ProtocolError> {
        let peer = self.begin(Notification::Response)?;
        peer.on_received_response(info);
        Ok(())
    }

    pub fn received_cached_metadata(&mut self, data: &[u8]) -> Result<(), ProtocolError> {
        let peer = self.begin(Notification::CachedMetadata)?;
        peer.on_received_cached_metadata(data);
        Ok(())
    }

    pub fn downloaded_data(&mut self, len: usize, encoded_data_length: usize) -> Result<(), ProtocolError> {
        let peer = self.begin(Notification::DownloadedData)?;
        peer.on_downloaded_data(len, encoded_data_length);
        self.count(len, encoded_data_length);
        Ok(())
    }

    pub fn received_data(&mut self, chunk: DataChunk<'_>) -> Result<(), ProtocolError> {
        let peer = self.begin(Notification::ReceivedData)?;
        peer.on_received_data(chunk);
        self.count(chunk.len(), chunk.encoded_len());
        Ok(())
    }

    pub fn completed_request(&mut self, completion: &CompletionRecord) -> Result<(), ProtocolError> {
        let peer = self.begin(Notification::Completed(completion.error_code))?;
        peer.on_completed_request(completion);
        self.finish(completion.error_code);
        Ok(())
    }

    pub fn received_completed_response(
        &mut self,
        info: &ResponseInfo,
        data: Option<DataChunk<'_>>,
        completion: &CompletionRecord,
    ) -> Result<(), ProtocolError> {
        let peer = self.begin(Notification::CompletedResponse(completion.error_code))?;
        peer.on_received_completed_response(info, data, completion);
        if let Some(chunk) = data {
            self.count(chunk.len(), chunk.encoded_len());
        }
        self.finish(completion.error_code);
        Ok(())
    }

    /// Ends the request with `ERR_ABORTED` unless it already ended. Returns true when the abort
    /// was delivered.
    pub fn abort(&mut self) -> bool {
        if self.is_terminated() {
            return false;
        }

        let completion = CompletionRecord::aborted(self.encoded_bytes);
        match self.completed_request(&completion) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Request[{}]: cannot abort: {}", self.id, e);
                false
            }
        }
    }

    pub fn summary(&self) -> LoadSummary {
        LoadSummary {
            id: self.id,
            error_code: self.final_code,
            redirects: self.sequencer.redirects(),
            bytes_received: self.bytes_received,
            encoded_bytes: self.encoded_bytes,
            combined: self.sequencer.used_combined(),
        }
    }

    fn begin(&mut self, n: Notification) -> Result<&mut BoxedPeer, ProtocolError> {
        self.sequencer.advance(n)?;
        log::trace!("Request[{}]: {}", self.id, n);
        self.peer.as_mut().ok_or(ProtocolError::AfterTerminal(n))
    }

    fn count(&mut self, len: usize, encoded: usize) {
        self.bytes_received += len as u64;
        self.encoded_bytes += encoded as u64;
    }

    fn finish(&mut self, code: NetErrorCode) {
        log::debug!("Request[{}]: completed with {}", self.id, code);
        self.final_code = Some(code);
        // co-terminated: the peer goes away together with the request
        self.peer = None;
    }
}

impl Drop for PeerDispatcher {
    fn drop(&mut self) {
        if !self.is_terminated() && self.peer.is_some() {
            log::warn!("Request[{}]: dropped in state {}, aborting", self.id, self.state());
            self.abort();
        }
    }
}
