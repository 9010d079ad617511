//! The consumer side of a request.
//!
//! A [`RequestPeer`] receives every notification for exactly one request. Notifications arrive
//! in a strict order (see [`Sequencer`](crate::net::Sequencer) for the enforced state machine):
//!
//! ```text
//!   upload_progress*  (only with LoadFlags::REPORT_UPLOAD_PROGRESS, any time before the end)
//!   received_redirect* (one per hop, returning false stops the request)
//!   ┌─ received_response
//!   │  received_cached_metadata?   (at most once)
//!   │  downloaded_data* | received_data*   (never both)
//!   │  completed_request
//!   └─ or: received_completed_response   (fast path, replaces the four above)
//! ```
//!
//! The peer and its channel are co-terminated: the peer is dropped right after the terminal
//! notification has been delivered.
//!
//! # Reentrancy
//!
//! During a callback the dispatcher holds the only mutable reference to the peer, so a peer
//! cannot call back into its own channel. The only way to influence the request from inside a
//! callback is the return value of [`RequestPeer::on_received_redirect`].

use crate::net::chunk::DataChunk;
use crate::net::completion::CompletionRecord;
use crate::net::redirect::RedirectInfo;
use crate::net::response_info::ResponseInfo;

pub trait RequestPeer {
    /// Called as upload progress is made. Only for requests with upload progress enabled.
    fn on_upload_progress(&mut self, position: u64, size: u64);

    /// Called when a redirect occurs. `redirect_info` describes the request that will be made if
    /// this method returns true, `info` describes the redirect response itself.
    ///
    /// Returning false stops the request. It will complete with a cancellation error.
    fn on_received_redirect(&mut self, redirect_info: &RedirectInfo, info: &ResponseInfo) -> bool;

    /// Called when response headers are available, after all redirects have been followed.
    fn on_received_response(&mut self, info: &ResponseInfo);

    /// Called when a chunk of the response has been written to file. Only called for requests
    /// with [`LoadFlags::DOWNLOAD_TO_FILE`](crate::net::LoadFlags::DOWNLOAD_TO_FILE), in which
    /// case [`on_received_data`](Self::on_received_data) is never called.
    fn on_downloaded_data(&mut self, len: usize, encoded_data_length: usize);

    /// Called when a chunk of (decoded) response data is available. May be called any number of
    /// times, or not at all when an error occurs.
    fn on_received_data(&mut self, chunk: DataChunk<'_>);

    /// Called when consumer generated metadata is retrieved from the cache. Called at most once.
    fn on_received_cached_metadata(&mut self, _data: &[u8]) {}

    /// Called when the request is done, successfully or not.
    fn on_completed_request(&mut self, completion: &CompletionRecord);

    /// Combined notification of `on_received_response`, a single `on_received_data` and
    /// `on_completed_request`. Unlike `on_received_data`, `data` may be absent.
    ///
    /// Delivered in one call so a peer never has to survive a series of callbacks for a small,
    /// fully known response.
    fn on_received_completed_response(
        &mut self,
        info: &ResponseInfo,
        data: Option<DataChunk<'_>>,
        completion: &CompletionRecord,
    );
}

/// Boxed peer as owned by a dispatcher or channel.
pub type BoxedPeer = Box<dyn RequestPeer + Send>;
