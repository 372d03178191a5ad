//! Host editor abstraction for embedded whiteboard frames.
//!
//! The document editor that embeds the whiteboard is an external collaborator.
//! Everything the embedding core needs from it goes through the traits here:
//! - [`Workspace`]: active document view, locale, user agent, active editor
//! - [`FrameHost`]: mounting frame elements inline or into a panel leaf
//! - [`PanelHost`]: side-panel leaves
//! - [`Notifier`]: transient user-visible notices
//!
//! This is the lowest layer of boardframe. [`MemoryHost`] implements every
//! trait in memory and records each effect, which is what the tests and the
//! CLI replay tool run against.

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{HostError, Result};
pub use memory::{MemoryHost, MountedFrame, PostedMessage};
pub use traits::{Editor, FrameElement, FrameHost, Host, Notifier, PanelHost, Workspace};
pub use types::{
    ActiveView, CursorPosition, DocumentId, FrameKey, FrameSpec, LeafId, MountTarget, ViewMode,
};
