//! Ready-made [`RequestPeer`](crate::net::RequestPeer) implementations.

pub mod collector;
pub mod recording;

pub use collector::{LoadError, LoadResult, RedirectPolicy, ResponseCollector};
pub use recording::{PeerEvent, PeerLog, RecordingPeer};
