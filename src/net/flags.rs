use bitflags::bitflags;
use http::Method;
use std::fmt::{Display, Formatter};
use url::Url;

bitflags! {
    /// Per-request options that shape which notifications a peer may receive.
    #[derive(Default)]
    pub struct LoadFlags: u8 {
        /// The peer wants upload progress notifications
        const REPORT_UPLOAD_PROGRESS = 0b0001;
        /// The body is downloaded to a file; the peer only sees byte counts
        const DOWNLOAD_TO_FILE       = 0b0010;
        /// The channel may deliver small responses as one combined notification
        const ALLOW_COMBINED         = 0b0100;
    }
}

impl Display for LoadFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();

        if self.contains(LoadFlags::REPORT_UPLOAD_PROGRESS) {
            parts.push("UploadProgress");
        }
        if self.contains(LoadFlags::DOWNLOAD_TO_FILE) {
            parts.push("DownloadToFile");
        }
        if self.contains(LoadFlags::ALLOW_COMBINED) {
            parts.push("AllowCombined");
        }

        if parts.is_empty() {
            write!(f, "None")
        } else {
            write!(f, "{}", parts.join("+"))
        }
    }
}

/// Request as seen by the loader: what to fetch and which notifications to expect.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub url: Url,
    pub method: Method,
    pub flags: LoadFlags,
}

impl LoadRequest {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: Method::GET,
            flags: LoadFlags::default(),
        }
    }

    pub fn post(url: Url) -> Self {
        Self {
            url,
            method: Method::POST,
            flags: LoadFlags::default(),
        }
    }

    pub fn with_flags(mut self, flags: LoadFlags) -> Self {
        self.flags |= flags;
        self
    }
}
