//! Channel → peer notification protocol.
//!
//! A request is driven by a transport (anything that fetches bytes) and observed by a peer (a
//! [`RequestPeer`] implementation). In between sits a channel which forwards the transport's
//! events to the peer and guarantees that the peer sees them in a valid order:
//!
//! ```text
//! transport ──TransportSender──▶ Channel ──PeerDispatcher──▶ RequestPeer
//!                                   ▲
//!                      RequestHandle (abort / wait)
//! ```
//!
//! Use [`Loader::start`] to set this up. Transports that want to skip the async layer can drive a
//! [`PeerDispatcher`] directly.

mod channel;
pub mod chunk;
pub mod completion;
pub mod dispatcher;
pub mod error_code;
pub mod flags;
pub mod handle;
pub mod loader;
pub mod peer;
pub mod peers;
pub mod protocol;
pub mod redirect;
pub mod response;
pub mod response_info;
pub mod transport;

pub use chunk::DataChunk;
pub use completion::{CompletionRecord, SecurityInfo};
pub use dispatcher::PeerDispatcher;
pub use error_code::{ErrorKind, NetErrorCode};
pub use flags::{LoadFlags, LoadRequest};
pub use handle::{LoadSummary, RequestHandle, RequestId};
pub use loader::Loader;
pub use peer::{BoxedPeer, RequestPeer};
pub use protocol::{BodyMode, LoadState, Notification, Sequencer};
pub use redirect::{RedirectInfo, ReferrerPolicy};
pub use response::Response;
pub use response_info::{LoadTiming, ResponseInfo};
pub use transport::{TransportEvent, TransportSender};

/// Number of transport events buffered per request
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;
