use crate::types::{CursorPosition, FrameKey};

/// Errors reported by a host surface.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The frame element has already been removed from the host.
    #[error("frame {0} is detached")]
    FrameDetached(FrameKey),

    /// The host refused to mount a frame element.
    #[error("failed to mount frame: {0}")]
    MountFailed(String),

    /// A cursor position does not exist in the editor buffer.
    #[error("invalid editor position {}:{}", .0.line, .0.ch)]
    InvalidPosition(CursorPosition),
}

pub type Result<T> = std::result::Result<T, HostError>;
