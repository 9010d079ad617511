//! A peer that buffers the whole response.
//!
//! [`ResponseCollector`] is the simplest useful consumer: it gathers metadata and body into a
//! [`Response`] and hands the result over a oneshot channel once the request ends. Both the
//! granular path and the combined notification go through the same steps, so the outcome does
//! not depend on which one the loader picked.

use thiserror::Error;
use tokio::sync::oneshot;
use url::Url;

use crate::net::chunk::DataChunk;
use crate::net::completion::CompletionRecord;
use crate::net::error_code::NetErrorCode;
use crate::net::peer::RequestPeer;
use crate::net::redirect::RedirectInfo;
use crate::net::response::Response;
use crate::net::response_info::ResponseInfo;

/// What to do with redirect hops.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum RedirectPolicy {
    #[default]
    Follow,
    /// Stop at the first hop and report it as [`LoadError::Redirected`]
    Manual,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("Request was canceled")]
    Canceled,

    #[error("Network error: {0}")]
    Net(NetErrorCode),

    #[error("Response was ignored by a handler")]
    IgnoredByHandler,

    #[error("Redirected ({status}) to {location}")]
    Redirected { location: Url, status: http::StatusCode },
}

pub type LoadResult = Result<Response, LoadError>;

#[derive(Debug)]
pub struct ResponseCollector {
    policy: RedirectPolicy,
    redirect_chain: Vec<Url>,
    stopped_at: Option<LoadError>,
    response: Option<Response>,
    done: Option<oneshot::Sender<LoadResult>>,
}

impl ResponseCollector {
    pub fn new(policy: RedirectPolicy) -> (Self, oneshot::Receiver<LoadResult>) {
        let (tx, rx) = oneshot::channel();
        let collector = Self {
            policy,
            redirect_chain: Vec::new(),
            stopped_at: None,
            response: None,
            done: Some(tx),
        };
        (collector, rx)
    }

    fn start_response(&mut self, info: &ResponseInfo) {
        self.response = Some(Response::from_info(info, std::mem::take(&mut self.redirect_chain)));
    }

    fn append(&mut self, data: &[u8]) {
        if let Some(res) = self.response.as_mut() {
            res.body.extend_from_slice(data);
        }
    }

    fn finish(&mut self, completion: &CompletionRecord) {
        let result = self.outcome(completion);
        if let Err(e) = &result {
            log::debug!("ResponseCollector: load failed: {e}");
        }

        if let Some(tx) = self.done.take() {
            // receiver gone means nobody is interested anymore
            let _ = tx.send(result);
        }
    }

    fn outcome(&mut self, completion: &CompletionRecord) -> LoadResult {
        if let Some(e) = self.stopped_at.take() {
            return Err(e);
        }

        let code = completion.error_code;
        if code.is_cancellation() {
            return Err(LoadError::Canceled);
        }
        if !code.is_ok() {
            return Err(LoadError::Net(code));
        }
        if completion.was_ignored_by_handler {
            return Err(LoadError::IgnoredByHandler);
        }

        let mut res = self
            .response
            .take()
            .ok_or(LoadError::Net(NetErrorCode::ERR_INVALID_RESPONSE))?;
        res.total_transfer_size = completion.total_transfer_size;
        res.stale_copy_in_cache = completion.stale_copy_in_cache;
        Ok(res)
    }
}

impl RequestPeer for ResponseCollector {
    fn on_upload_progress(&mut self, position: u64, size: u64) {
        log::trace!("ResponseCollector: uploaded {position}/{size}");
    }

    fn on_received_redirect(&mut self, redirect_info: &RedirectInfo, _info: &ResponseInfo) -> bool {
        match self.policy {
            RedirectPolicy::Follow => {
                self.redirect_chain.push(redirect_info.new_url.clone());
                true
            }
            RedirectPolicy::Manual => {
                self.stopped_at = Some(LoadError::Redirected {
                    location: redirect_info.new_url.clone(),
                    status: redirect_info.status_code,
                });
                false
            }
        }
    }

    fn on_received_response(&mut self, info: &ResponseInfo) {
        self.start_response(info);
    }

    fn on_downloaded_data(&mut self, len: usize, _encoded_data_length: usize) {
        if let Some(res) = self.response.as_mut() {
            res.downloaded_bytes += len as u64;
        }
    }

    fn on_received_data(&mut self, chunk: DataChunk<'_>) {
        self.append(chunk.data());
    }

    fn on_received_cached_metadata(&mut self, data: &[u8]) {
        if let Some(res) = self.response.as_mut() {
            res.cached_metadata = Some(data.to_vec());
        }
    }

    fn on_completed_request(&mut self, completion: &CompletionRecord) {
        self.finish(completion);
    }

    fn on_received_completed_response(
        &mut self,
        info: &ResponseInfo,
        data: Option<DataChunk<'_>>,
        completion: &CompletionRecord,
    ) {
        self.start_response(info);
        if let Some(chunk) = data {
            self.append(chunk.data());
        }
        self.finish(completion);
    }
}
