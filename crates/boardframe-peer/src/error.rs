/// Errors that can occur while embedding frames.
///
/// Protocol-level conditions (dropped sends, unknown or untrusted messages)
/// are not errors; they surface as [`crate::SendOutcome`] and
/// [`crate::Dispatch`] values.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// Host surface error.
    #[error("host error: {0}")]
    Host(#[from] boardframe_host::HostError),

    /// Block or URL error.
    #[error("block error: {0}")]
    Block(#[from] boardframe_block::BlockError),

    /// Insertion needs a focused, editable document.
    #[error("no document open")]
    NoActiveDocument,

    /// The host declined to allocate a side-panel leaf.
    #[error("host declined to allocate a panel leaf for {0}")]
    MissingPanelSlot(String),

    /// The frame instance has been destroyed.
    #[error("frame instance destroyed")]
    Destroyed,

    /// Configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EmbedError>;
