use std::sync::Arc;

use crate::config::LoaderConfig;
use crate::errors::LoaderError;
use crate::net::channel::Channel;
use crate::net::flags::LoadRequest;
use crate::net::handle::{RequestHandle, RequestId};
use crate::net::peer::BoxedPeer;
use crate::net::transport::TransportSender;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Starts requests. Every request gets its own channel task which pairs the transport with the
/// peer.
///
/// Cloning a loader is cheap; all clones share the same config and shutdown token.
#[derive(Debug, Clone)]
pub struct Loader {
    config: Arc<LoaderConfig>,
    /// Parent of all request tokens, cancelled by [`Loader::abort_all`]
    shutdown: CancellationToken,
}

impl Loader {
    pub fn new(config: LoaderConfig) -> Result<Self, LoaderError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Starts a request. The returned [`TransportSender`] goes to whatever fetches the resource,
    /// the [`RequestHandle`] stays with the caller and keeps the request alive.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn start(&self, request: LoadRequest, peer: BoxedPeer) -> (RequestHandle, TransportSender) {
        let id = RequestId::new();
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let cancel = self.shutdown.child_token();

        log::trace!("Request[{}]: starting channel for {}", id, request.url);

        let channel = Channel::new(id, request, self.config.clone(), peer, rx, cancel.clone());
        let join = tokio::spawn(channel.run());

        (RequestHandle::new(id, cancel, join), TransportSender::new(id, tx))
    }

    /// Aborts every request started by this loader (and its clones).
    pub fn abort_all(&self) {
        log::debug!("Loader: aborting all requests");
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
