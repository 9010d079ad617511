pub mod config;
pub mod errors;
pub mod net;

pub use config::{Enforcement, LoaderConfig};
pub use errors::{LoaderError, ProtocolError};
pub use net::{Loader, RequestHandle, RequestPeer, TransportSender};
