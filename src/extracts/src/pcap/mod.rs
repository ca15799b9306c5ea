mod linktype;
mod reader;

pub use linktype::LinkType;
pub use reader::PcapReader;

use std::fmt;

/// Faults raised while opening or walking one capture source.
///
/// These are contained at the source: the owning extractor reports the
/// failure upward as an advisory diagnostic and sibling sources keep
/// running.
#[derive(Debug)]
pub enum CaptureError {
    /// The capture file could not be read at all.
    Open(std::io::Error),

    /// The container is not a capture file we understand.
    Format(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Open(e) => write!(f, "failed to open capture: {}", e),
            CaptureError::Format(msg) => write!(f, "invalid capture format: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Open(e) => Some(e),
            CaptureError::Format(_) => None,
        }
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Open(err)
    }
}
