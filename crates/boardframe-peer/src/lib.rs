//! Frame lifecycle and host synchronization for embedded whiteboards.
//!
//! Each embedded whiteboard is a [`FrameInstance`]: a frame element that
//! waits for its peer's readiness signal, answers it with a single init
//! message, and only then accepts outbound messages. Around it:
//! - [`PanelRegistry`] owns the single side-panel frame
//! - [`LiveFrames`] tracks inline frames per document and render mode and
//!   broadcasts reloads on layout changes
//! - [`insert_new_block`] writes a fresh block at the editor cursor
//! - [`Embedder`] ties these together for one host
//!
//! Everything runs on the host's event thread. Nothing here blocks or spawns.

pub mod commands;
pub mod config;
pub mod embedder;
pub mod error;
pub mod insert;
pub mod instance;
pub mod live;
pub mod message;
pub mod origin;
pub mod panel;

pub use commands::{editor_menu_items, ribbon_item, HostCommand, MenuItem, PanelView};
pub use config::EmbedConfig;
pub use embedder::{CommandOutcome, Embedder, RenderSite, RenderedBlock, UnloadReport};
pub use error::{EmbedError, Result};
pub use insert::{insert_new_block, InsertedBlock, NO_DOCUMENT_NOTICE};
pub use instance::{Dispatch, FrameInstance, FrameState, InstanceOptions, SendOutcome};
pub use live::{BroadcastReport, LiveFrames};
pub use message::{
    HostMessage, PeerEvent, PeerMessage, ACTION_NAVIGATE, ACTION_RELOAD, READY_SIGNAL, TYPE_INIT,
};
pub use origin::OriginPolicy;
pub use panel::{PanelLaunch, PanelRegistry, ToggleOutcome};
