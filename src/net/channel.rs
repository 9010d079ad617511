//! Channel: the driver task of a single request.
//!
//! A channel sits between a transport (which produces [`TransportEvent`]s) and a
//! [`PeerDispatcher`] (which owns the peer). It runs as its own task and ends as soon as the peer
//! has received its terminal notification.
//!
//! Besides forwarding, the channel:
//! - keeps its own [`Sequencer`] for the transport view, so ordering mistakes of the transport
//!   are caught even while notifications are held back,
//! - aborts the request when the [`RequestHandle`](crate::net::RequestHandle) asks for it or is
//!   dropped,
//! - enforces the redirect hop limit,
//! - completes the request itself when the peer rejects a redirect or the transport hangs up,
//! - coalesces small responses into a single combined notification when allowed.
//!
//! # Coalescing
//!
//! With [`LoadFlags::ALLOW_COMBINED`], a response whose content length is known and fits within
//! `combined_response_limit` is held back together with its data. When the transport completes
//! the request, the peer gets one `on_received_completed_response` call instead of a response,
//! some data and a completion. Should the body outgrow the limit, or cached metadata arrive, the
//! held notifications are flushed and the request continues on the granular path.

use std::sync::Arc;

use crate::config::{Enforcement, LoaderConfig};
use crate::errors::{LoaderError, ProtocolError};
use crate::net::chunk::DataChunk;
use crate::net::completion::CompletionRecord;
use crate::net::dispatcher::PeerDispatcher;
use crate::net::error_code::NetErrorCode;
use crate::net::flags::{LoadFlags, LoadRequest};
use crate::net::handle::{LoadSummary, RequestId};
use crate::net::peer::BoxedPeer;
use crate::net::protocol::{BodyMode, Notification, Sequencer};
use crate::net::redirect::RedirectInfo;
use crate::net::response_info::ResponseInfo;
use crate::net::transport::TransportEvent;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Response (and data) held back for the combined notification.
#[derive(Debug)]
struct HeldResponse {
    info: ResponseInfo,
    body: Vec<u8>,
    /// (decoded, encoded) length of every chunk, so a flush can replay the original chunks
    chunks: Vec<(usize, usize)>,
}

impl HeldResponse {
    fn new(info: ResponseInfo) -> Self {
        Self {
            info,
            body: Vec::new(),
            chunks: Vec::new(),
        }
    }

    fn encoded_len(&self) -> usize {
        self.chunks.iter().map(|(_, enc)| enc).sum()
    }
}

pub(crate) struct Channel {
    id: RequestId,
    request: LoadRequest,
    config: Arc<LoaderConfig>,
    dispatcher: PeerDispatcher,
    /// Ordering as sent by the transport
    transport_view: Sequencer,
    events: mpsc::Receiver<TransportEvent>,
    cancel: CancellationToken,
    held: Option<HeldResponse>,
    violation: Option<ProtocolError>,
}

impl Channel {
    pub(crate) fn new(
        id: RequestId,
        request: LoadRequest,
        config: Arc<LoaderConfig>,
        peer: BoxedPeer,
        events: mpsc::Receiver<TransportEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            dispatcher: PeerDispatcher::new(id, request.flags, peer),
            transport_view: Sequencer::new(request.flags),
            request,
            config,
            events,
            cancel,
            held: None,
            violation: None,
        }
    }

    /// Runs until the peer has received its terminal notification.
    pub(crate) async fn run(mut self) -> Result<LoadSummary, LoaderError> {
        log::debug!(
            "Request[{}]: {} {} started (flags: {})",
            self.id,
            self.request.method,
            self.request.url,
            self.request.flags
        );

        while !self.dispatcher.is_terminated() {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    log::debug!("Request[{}]: aborted", self.id);
                    self.terminate(NetErrorCode::ERR_ABORTED);
                }
                ev = self.events.recv() => match ev {
                    Some(ev) => self.handle(ev),
                    None => {
                        log::warn!("Request[{}]: transport went away before completing", self.id);
                        self.terminate(NetErrorCode::ERR_FAILED);
                    }
                },
            }
        }

        match self.violation.take() {
            Some(e) => Err(LoaderError::Protocol(e)),
            None => Ok(self.dispatcher.summary()),
        }
    }

    fn handle(&mut self, ev: TransportEvent) {
        match ev {
            TransportEvent::UploadProgress { position, size } => {
                if self.track(Notification::UploadProgress) {
                    let res = self.dispatcher.upload_progress(position, size);
                    self.check(res);
                }
            }
            TransportEvent::Redirect { redirect, info, reply } => self.redirect(redirect, info, reply),
            TransportEvent::Response(info) => self.response(info),
            TransportEvent::CachedMetadata(data) => {
                if self.track(Notification::CachedMetadata) {
                    self.flush();
                    let res = self.dispatcher.received_cached_metadata(&data);
                    self.check(res);
                }
            }
            TransportEvent::Data { data, encoded_data_length } => {
                if self.track(Notification::ReceivedData) {
                    self.data(data, encoded_data_length);
                }
            }
            TransportEvent::DownloadedData { len, encoded_data_length } => {
                if self.track(Notification::DownloadedData) {
                    let res = self.dispatcher.downloaded_data(len, encoded_data_length);
                    self.check(res);
                }
            }
            TransportEvent::Complete(completion) => {
                if self.track(Notification::Completed(completion.error_code)) {
                    self.complete(completion);
                }
            }
            TransportEvent::CompletedResponse { info, data, encoded_data_length, completion } => {
                if self.track(Notification::CompletedResponse(completion.error_code)) {
                    let chunk = data.as_deref().map(|d| DataChunk::new(d, encoded_data_length));
                    let res = self.dispatcher.received_completed_response(&info, chunk, &completion);
                    self.check(res);
                }
            }
        }
    }

    fn redirect(&mut self, redirect: RedirectInfo, info: ResponseInfo, reply: oneshot::Sender<bool>) {
        if !self.track(Notification::Redirect) {
            let _ = reply.send(false);
            return;
        }

        if self.transport_view.redirects() > self.config.max_redirects {
            log::warn!(
                "Request[{}]: more than {} redirects, not following {}",
                self.id,
                self.config.max_redirects,
                redirect.new_url
            );
            let _ = reply.send(false);
            self.terminate(NetErrorCode::ERR_TOO_MANY_REDIRECTS);
            return;
        }

        match self.dispatcher.received_redirect(&redirect, &info) {
            Ok(true) => {
                let _ = reply.send(true);
            }
            Ok(false) => {
                self.transport_view.reject_redirect();
                let _ = reply.send(false);
                self.terminate(NetErrorCode::ERR_ABORTED);
            }
            Err(e) => {
                let _ = reply.send(false);
                self.violated(e);
            }
        }
    }

    fn response(&mut self, info: ResponseInfo) {
        if !self.track(Notification::Response) {
            return;
        }

        if self.can_combine(&info) {
            log::debug!(
                "Request[{}]: holding {} byte response for the combined notification",
                self.id,
                info.content_length.unwrap_or_default()
            );
            self.held = Some(HeldResponse::new(info));
            return;
        }

        let res = self.dispatcher.received_response(&info);
        self.check(res);
    }

    fn data(&mut self, data: Vec<u8>, encoded_data_length: usize) {
        if let Some(held) = self.held.as_mut() {
            if held.body.len() + data.len() <= self.config.combined_response_limit {
                held.body.extend_from_slice(&data);
                held.chunks.push((data.len(), encoded_data_length));
                return;
            }
            log::debug!("Request[{}]: body outgrew the combined limit, flushing", self.id);
            self.flush();
        }

        let res = self.dispatcher.received_data(DataChunk::new(&data, encoded_data_length));
        self.check(res);
    }

    fn complete(&mut self, completion: CompletionRecord) {
        if let Some(held) = self.held.take() {
            self.deliver_combined(held, &completion);
            return;
        }

        let res = self.dispatcher.completed_request(&completion);
        self.check(res);
    }

    fn can_combine(&self, info: &ResponseInfo) -> bool {
        self.request.flags.contains(LoadFlags::ALLOW_COMBINED)
            && self.dispatcher_mode() == BodyMode::Data
            && info
                .content_length
                .is_some_and(|len| len <= self.config.combined_response_limit as u64)
    }

    fn dispatcher_mode(&self) -> BodyMode {
        BodyMode::from_flags(self.request.flags)
    }

    /// Delivers held notifications on the granular path.
    fn flush(&mut self) {
        let Some(held) = self.held.take() else {
            return;
        };

        let res = self.dispatcher.received_response(&held.info);
        self.check(res);

        let mut offset = 0;
        for (len, encoded) in held.chunks {
            let chunk = DataChunk::new(&held.body[offset..offset + len], encoded);
            offset += len;
            let res = self.dispatcher.received_data(chunk);
            self.check(res);
        }
    }

    fn deliver_combined(&mut self, held: HeldResponse, completion: &CompletionRecord) {
        // an empty body can still have cost wire bytes
        let chunk = if held.chunks.is_empty() {
            None
        } else {
            Some(DataChunk::new(&held.body, held.encoded_len()))
        };

        let res = self.dispatcher.received_completed_response(&held.info, chunk, completion);
        self.check(res);
    }

    /// Ends the request with `code`, including anything still held back.
    fn terminate(&mut self, code: NetErrorCode) {
        if self.dispatcher.is_terminated() {
            return;
        }

        let held_encoded = self.held.as_ref().map_or(0, |h| h.encoded_len() as u64);
        let total = self.dispatcher.summary().encoded_bytes + held_encoded;
        let completion = CompletionRecord::failed(code, total);

        if let Some(held) = self.held.take() {
            self.deliver_combined(held, &completion);
        } else if let Err(e) = self.dispatcher.completed_request(&completion) {
            log::error!("Request[{}]: cannot complete with {}: {}", self.id, code, e);
            self.dispatcher.abort();
        }
    }

    /// Advances the transport view. Returns false when the event must be dropped.
    fn track(&mut self, n: Notification) -> bool {
        match self.transport_view.advance(n) {
            Ok(()) => true,
            Err(e) => {
                self.violated(e);
                false
            }
        }
    }

    fn check(&mut self, res: Result<(), ProtocolError>) {
        if let Err(e) = res {
            self.violated(e);
        }
    }

    fn violated(&mut self, e: ProtocolError) {
        match self.config.enforcement {
            Enforcement::Strict => {
                log::error!("Request[{}]: protocol violation: {}", self.id, e);
                if self.violation.is_none() {
                    self.violation = Some(e);
                }
                self.terminate(NetErrorCode::ERR_INVALID_RESPONSE);
            }
            Enforcement::Lenient => {
                log::warn!("Request[{}]: dropping notification: {}", self.id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::peers::recording::{PeerEvent, PeerLog, RecordingPeer};
    use crate::net::transport::TransportSender;
    use crate::net::RequestHandle;
    use http::{Method, StatusCode};
    use url::Url;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn spawn(flags: LoadFlags, config: LoaderConfig, peer: RecordingPeer) -> (RequestHandle, TransportSender, PeerLog) {
        init_logging();
        let log = peer.log();
        let id = RequestId::new();
        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let request = LoadRequest::get(url("https://example.com/")).with_flags(flags);
        let channel = Channel::new(id, request, Arc::new(config), Box::new(peer), rx, cancel.clone());
        let join = tokio::spawn(channel.run());
        (RequestHandle::new(id, cancel, join), TransportSender::new(id, tx), log)
    }

    fn sized(len: u64) -> ResponseInfo {
        ResponseInfo::new(url("https://example.com/"), StatusCode::OK).with_content_length(len)
    }

    fn redirect(to: &str) -> (RedirectInfo, ResponseInfo) {
        (
            RedirectInfo::compute(StatusCode::MOVED_PERMANENTLY, &Method::GET, url(to)),
            ResponseInfo::new(url("https://example.com/"), StatusCode::MOVED_PERMANENTLY),
        )
    }

    #[tokio::test]
    async fn granular_path_is_forwarded_in_order() {
        let (handle, tx, log) = spawn(LoadFlags::empty(), LoaderConfig::default(), RecordingPeer::new());

        let (r, i) = redirect("https://example.com/a");
        assert!(tx.redirect(r, i).await.unwrap());
        tx.response(sized(3)).await.unwrap();
        tx.data(b"abc".to_vec(), 3).await.unwrap();
        tx.complete(CompletionRecord::success(3)).await.unwrap();

        let summary = handle.wait().await.unwrap();
        assert_eq!(summary.error_code, Some(NetErrorCode::OK));
        assert_eq!(summary.redirects, 1);
        assert!(!summary.combined);

        let events = log.events();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[1], PeerEvent::Response { .. }));
        assert!(log.peer_dropped());
    }

    #[tokio::test]
    async fn small_response_is_coalesced() {
        let (handle, tx, log) = spawn(LoadFlags::ALLOW_COMBINED, LoaderConfig::default(), RecordingPeer::new());

        tx.response(sized(50).fetched_via_cache(true)).await.unwrap();
        tx.data(vec![b'x'; 20], 20).await.unwrap();
        tx.data(vec![b'y'; 30], 30).await.unwrap();
        tx.complete(CompletionRecord::success(50)).await.unwrap();

        let summary = handle.wait().await.unwrap();
        assert!(summary.combined);
        assert_eq!(summary.bytes_received, 50);

        let events = log.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            PeerEvent::CompletedResponse { data: Some((body, encoded)), completion, .. } => {
                assert_eq!(body.len(), 50);
                assert_eq!(*encoded, 50);
                assert_eq!(&body[..20], &[b'x'; 20][..]);
                assert!(completion.is_success());
            }
            other => panic!("expected combined response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_coalesced_body_has_no_span() {
        let (handle, tx, log) = spawn(LoadFlags::ALLOW_COMBINED, LoaderConfig::default(), RecordingPeer::new());

        tx.response(sized(0)).await.unwrap();
        tx.complete(CompletionRecord::success(0)).await.unwrap();
        handle.wait().await.unwrap();

        assert!(matches!(&log.events()[0], PeerEvent::CompletedResponse { data: None, .. }));
    }

    #[tokio::test]
    async fn oversized_body_is_flushed_granularly() {
        let config = LoaderConfig::builder().combined_response_limit(10).build().unwrap();
        let (handle, tx, log) = spawn(LoadFlags::ALLOW_COMBINED, config, RecordingPeer::new());

        // announced length fits, the actual body does not
        tx.response(sized(8)).await.unwrap();
        tx.data(vec![1; 6], 4).await.unwrap();
        tx.data(vec![2; 6], 5).await.unwrap();
        tx.complete(CompletionRecord::success(9)).await.unwrap();

        let summary = handle.wait().await.unwrap();
        assert!(!summary.combined);

        let events = log.events();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], PeerEvent::Response { .. }));
        assert_eq!(events[1], PeerEvent::Data { data: vec![1; 6], encoded_data_length: 4 });
        assert_eq!(events[2], PeerEvent::Data { data: vec![2; 6], encoded_data_length: 5 });
        assert!(matches!(events[3], PeerEvent::Completed { .. }));
    }

    #[tokio::test]
    async fn cached_metadata_breaks_coalescing() {
        let (handle, tx, log) = spawn(LoadFlags::ALLOW_COMBINED, LoaderConfig::default(), RecordingPeer::new());

        tx.response(sized(4)).await.unwrap();
        tx.data(b"data".to_vec(), 4).await.unwrap();
        tx.cached_metadata(b"meta".to_vec()).await.unwrap();
        tx.complete(CompletionRecord::success(4)).await.unwrap();
        handle.wait().await.unwrap();

        let events = log.events();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], PeerEvent::Response { .. }));
        assert!(matches!(events[1], PeerEvent::Data { .. }));
        assert_eq!(events[2], PeerEvent::CachedMetadata { data: b"meta".to_vec() });
    }

    #[tokio::test]
    async fn rejected_redirect_completes_with_abort() {
        let peer = RecordingPeer::new().with_redirect_answers(vec![false]);
        let (handle, tx, log) = spawn(LoadFlags::empty(), LoaderConfig::default(), peer);

        let (r, i) = redirect("https://evil.example/");
        assert!(!tx.redirect(r, i).await.unwrap());

        let summary = handle.wait().await.unwrap();
        assert_eq!(summary.error_code, Some(NetErrorCode::ERR_ABORTED));

        // the channel is gone, the transport cannot continue
        assert!(tx.response(sized(1)).await.is_err());
        assert_eq!(log.events().len(), 2);
        assert!(!log.has_response());
    }

    #[tokio::test]
    async fn hop_limit_stops_the_request() {
        let config = LoaderConfig::builder().max_redirects(1).build().unwrap();
        let (handle, tx, log) = spawn(LoadFlags::empty(), config, RecordingPeer::new());

        let (r, i) = redirect("https://example.com/1");
        assert!(tx.redirect(r, i).await.unwrap());
        let (r, i) = redirect("https://example.com/2");
        assert!(!tx.redirect(r, i).await.unwrap());

        let summary = handle.wait().await.unwrap();
        assert_eq!(summary.error_code, Some(NetErrorCode::ERR_TOO_MANY_REDIRECTS));
        // the second hop was never shown to the peer
        assert_eq!(log.events().len(), 2);
    }

    #[tokio::test]
    async fn abort_delivers_terminal_event() {
        let (handle, tx, log) = spawn(LoadFlags::empty(), LoaderConfig::default(), RecordingPeer::new());

        tx.response(sized(100)).await.unwrap();
        handle.abort();
        let summary = handle.wait().await.unwrap();

        assert_eq!(summary.error_code, Some(NetErrorCode::ERR_ABORTED));
        assert_eq!(log.terminal_events(), 1);
        assert!(tx.data(vec![0; 10], 10).await.is_err());
    }

    #[tokio::test]
    async fn hang_up_while_holding_uses_combined_notification() {
        let (handle, tx, log) = spawn(LoadFlags::ALLOW_COMBINED, LoaderConfig::default(), RecordingPeer::new());

        tx.response(sized(10)).await.unwrap();
        tx.data(vec![9; 5], 4).await.unwrap();
        drop(tx);

        let summary = handle.wait().await.unwrap();
        assert_eq!(summary.error_code, Some(NetErrorCode::ERR_FAILED));
        assert!(summary.combined);

        let events = log.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            PeerEvent::CompletedResponse { data: Some((body, encoded)), completion, .. } => {
                assert_eq!(body, &vec![9; 5]);
                assert_eq!(*encoded, 4);
                assert_eq!(completion.error_code, NetErrorCode::ERR_FAILED);
                assert_eq!(completion.total_transfer_size, 4);
            }
            other => panic!("expected combined response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn violation_while_holding_uses_combined_notification() {
        let (handle, tx, log) = spawn(LoadFlags::ALLOW_COMBINED, LoaderConfig::default(), RecordingPeer::new());

        tx.response(sized(10)).await.unwrap();
        tx.data(vec![1; 5], 5).await.unwrap();
        tx.response(sized(10)).await.unwrap();

        let err = handle.wait().await.unwrap_err();
        assert!(matches!(err, LoaderError::Protocol(ProtocolError::DuplicateResponse)));

        let events = log.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], PeerEvent::CompletedResponse { data: Some((body, 5)), completion, .. }
            if body.len() == 5 && completion.error_code == NetErrorCode::ERR_INVALID_RESPONSE));
    }

    #[tokio::test]
    async fn abort_while_holding_delivers_one_terminal_event() {
        let (handle, tx, log) = spawn(LoadFlags::ALLOW_COMBINED, LoaderConfig::default(), RecordingPeer::new());

        tx.response(sized(10)).await.unwrap();
        handle.abort();
        handle.wait().await.unwrap();

        assert_eq!(log.terminal_events(), 1);
        assert!(log.events().iter().all(|e| match e {
            PeerEvent::CompletedResponse { completion, .. } | PeerEvent::Completed { completion } =>
                completion.error_code.is_cancellation(),
            _ => false,
        }));
    }

    async fn encoded_empty_body(flags: LoadFlags) -> (LoadSummary, PeerLog) {
        let (handle, tx, log) = spawn(flags, LoaderConfig::default(), RecordingPeer::new());

        tx.response(sized(0)).await.unwrap();
        tx.data(Vec::new(), 7).await.unwrap();
        tx.complete(CompletionRecord::success(7)).await.unwrap();

        (handle.wait().await.unwrap(), log)
    }

    #[tokio::test]
    async fn encoded_empty_body_counts_on_both_paths() {
        let (granular, _) = encoded_empty_body(LoadFlags::empty()).await;
        let (combined, log) = encoded_empty_body(LoadFlags::ALLOW_COMBINED).await;

        assert!(combined.combined);
        assert_eq!(granular.encoded_bytes, 7);
        assert_eq!(combined.encoded_bytes, granular.encoded_bytes);
        assert_eq!(combined.bytes_received, granular.bytes_received);
        assert!(matches!(&log.events()[0], PeerEvent::CompletedResponse { data: Some((body, 7)), .. }
            if body.is_empty()));
    }

    #[tokio::test]
    async fn transport_hang_up_fails_the_request() {
        let (handle, tx, log) = spawn(LoadFlags::empty(), LoaderConfig::default(), RecordingPeer::new());

        tx.response(sized(1)).await.unwrap();
        drop(tx);

        let summary = handle.wait().await.unwrap();
        assert_eq!(summary.error_code, Some(NetErrorCode::ERR_FAILED));
        assert_eq!(log.terminal_events(), 1);
    }

    #[tokio::test]
    async fn strict_mode_terminates_on_violation() {
        let (handle, tx, log) = spawn(LoadFlags::empty(), LoaderConfig::default(), RecordingPeer::new());

        // data before the response
        tx.data(b"oops".to_vec(), 4).await.unwrap();

        let err = handle.wait().await.unwrap_err();
        assert!(matches!(err, LoaderError::Protocol(ProtocolError::BeforeResponse(Notification::ReceivedData))));

        let events = log.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], PeerEvent::Completed { completion }
            if completion.error_code == NetErrorCode::ERR_INVALID_RESPONSE));
    }

    #[tokio::test]
    async fn lenient_mode_drops_the_offending_event() {
        let config = LoaderConfig::builder().enforcement(Enforcement::Lenient).build().unwrap();
        let (handle, tx, log) = spawn(LoadFlags::empty(), config, RecordingPeer::new());

        tx.response(sized(2)).await.unwrap();
        tx.response(sized(2)).await.unwrap();
        tx.downloaded_data(2, 2).await.unwrap();
        tx.data(b"ok".to_vec(), 2).await.unwrap();
        tx.complete(CompletionRecord::success(2)).await.unwrap();

        let summary = handle.wait().await.unwrap();
        assert_eq!(summary.error_code, Some(NetErrorCode::OK));

        let events = log.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], PeerEvent::Response { .. }));
        assert!(matches!(events[1], PeerEvent::Data { .. }));
    }

    #[tokio::test]
    async fn transport_combined_response_is_forwarded() {
        let (handle, tx, log) = spawn(LoadFlags::empty(), LoaderConfig::default(), RecordingPeer::new());

        tx.completed_response(sized(5), Some(b"hello".to_vec()), 3, CompletionRecord::success(3))
            .await
            .unwrap();

        let summary = handle.wait().await.unwrap();
        assert!(summary.combined);
        assert_eq!(summary.encoded_bytes, 3);
        assert_eq!(log.events().len(), 1);
    }

    #[tokio::test]
    async fn download_to_file_is_never_coalesced() {
        let flags = LoadFlags::ALLOW_COMBINED | LoadFlags::DOWNLOAD_TO_FILE;
        let (handle, tx, log) = spawn(flags, LoaderConfig::default(), RecordingPeer::new());

        tx.response(sized(10)).await.unwrap();
        tx.downloaded_data(10, 6).await.unwrap();
        tx.complete(CompletionRecord::success(6)).await.unwrap();

        let summary = handle.wait().await.unwrap();
        assert!(!summary.combined);
        assert_eq!(summary.bytes_received, 10);
        assert_eq!(log.events().len(), 3);
        assert_eq!(log.data_events(), 0);
    }
}
