//! Embedded whiteboard frames for document editors.
//!
//! boardframe embeds a remote whiteboard application into a host document
//! editor through frame elements and a small cross-context message protocol.
//!
//! # Crate Structure
//!
//! - [`host`]: traits for the host editor, plus an in-memory host
//! - [`block`]: block codec, identifiers, frame URLs and container markup
//! - [`peer`]: frame lifecycle, side panel, inline registry and the embedder

/// Re-export host types.
pub mod host {
    pub use boardframe_host::*;
}

/// Re-export block types.
pub mod block {
    pub use boardframe_block::*;
}

/// Re-export peer types.
pub mod peer {
    pub use boardframe_peer::*;
}
