use boardframe_host::{FrameHost, FrameKey, FrameSpec, LeafId, MountTarget, PanelHost};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{EmbedError, Result};
use crate::instance::{Dispatch, FrameInstance, InstanceOptions, SendOutcome};
use crate::message::{HostMessage, PeerEvent};

/// Everything needed to create the panel frame.
#[derive(Debug, Clone)]
pub struct PanelLaunch {
    pub spec: FrameSpec,
    pub options: InstanceOptions,
}

/// What a toggle or open request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// A new panel frame was created and revealed.
    Opened { frame: FrameKey },
    /// The existing panel frame was revealed.
    Revealed { frame: FrameKey },
    /// The panel was closed.
    Closed,
}

struct PanelSlot {
    leaf: LeafId,
    frame: FrameInstance,
}

/// Owner of the single side-panel frame.
///
/// All mutation goes through `toggle`, `open`, `close` and `teardown`, so at
/// most one panel frame exists at a time.
pub struct PanelRegistry {
    view_type: String,
    close_on_second_toggle: bool,
    slot: Option<PanelSlot>,
}

impl PanelRegistry {
    pub fn new(view_type: impl Into<String>) -> Self {
        Self {
            view_type: view_type.into(),
            close_on_second_toggle: false,
            slot: None,
        }
    }

    /// Close the panel when toggled while open, instead of revealing it.
    pub fn with_close_on_second_toggle(mut self, close: bool) -> Self {
        self.close_on_second_toggle = close;
        self
    }

    pub fn view_type(&self) -> &str {
        &self.view_type
    }

    pub fn is_open(&self) -> bool {
        self.slot.is_some()
    }

    pub fn leaf(&self) -> Option<LeafId> {
        self.slot.as_ref().map(|slot| slot.leaf)
    }

    pub fn frame(&self) -> Option<&FrameInstance> {
        self.slot.as_ref().map(|slot| &slot.frame)
    }

    pub fn frame_key(&self) -> Option<FrameKey> {
        self.frame().and_then(FrameInstance::key)
    }

    /// Reveal the panel, creating it if needed, or close it when the
    /// close-on-second-toggle policy is set and it is already open.
    pub fn toggle<H>(&mut self, host: &mut H, launch: PanelLaunch) -> Result<ToggleOutcome>
    where
        H: FrameHost + PanelHost + ?Sized,
    {
        self.forget_stale(&*host);
        if self.close_on_second_toggle && self.slot.is_some() {
            self.close(host);
            return Ok(ToggleOutcome::Closed);
        }
        self.open(host, launch)
    }

    /// Expand the side split, then reveal the panel, creating it if needed.
    pub fn open<H>(&mut self, host: &mut H, launch: PanelLaunch) -> Result<ToggleOutcome>
    where
        H: FrameHost + PanelHost + ?Sized,
    {
        if host.is_side_collapsed() {
            host.expand_side();
        }
        self.forget_stale(&*host);

        if let Some(slot) = &self.slot {
            host.reveal_leaf(slot.leaf);
            let frame = slot.frame.key().ok_or(EmbedError::Destroyed)?;
            debug!(leaf = %slot.leaf, %frame, "revealed panel");
            return Ok(ToggleOutcome::Revealed { frame });
        }

        let existing = host.leaves_of_type(&self.view_type).into_iter().next();
        let (leaf, allocated) = match existing {
            Some(leaf) => (leaf, false),
            None => match host.allocate_side_leaf(&self.view_type) {
                Some(leaf) => (leaf, true),
                None => {
                    warn!(view_type = %self.view_type, "host declined to allocate a panel leaf");
                    return Err(EmbedError::MissingPanelSlot(self.view_type.clone()));
                }
            },
        };

        let mut frame = FrameInstance::new(MountTarget::Panel(leaf), launch.spec, launch.options);
        let key = match frame.mount(host) {
            Ok(key) => key,
            Err(err) => {
                if allocated {
                    host.detach_leaf(leaf);
                }
                return Err(err);
            }
        };

        host.reveal_leaf(leaf);
        self.slot = Some(PanelSlot { leaf, frame });
        info!(%leaf, frame = %key, "opened panel");
        Ok(ToggleOutcome::Opened { frame: key })
    }

    /// Destroy the panel frame and detach its leaf.
    pub fn close<H: PanelHost + ?Sized>(&mut self, host: &mut H) -> bool {
        match self.slot.take() {
            Some(mut slot) => {
                slot.frame.destroy();
                host.detach_leaf(slot.leaf);
                info!(leaf = %slot.leaf, "closed panel");
                true
            }
            None => false,
        }
    }

    /// Detach every leaf of the panel's view type. Returns how many were
    /// detached.
    pub fn teardown<H: PanelHost + ?Sized>(&mut self, host: &mut H) -> usize {
        if let Some(mut slot) = self.slot.take() {
            slot.frame.destroy();
        }
        let leaves = host.leaves_of_type(&self.view_type);
        for leaf in &leaves {
            host.detach_leaf(*leaf);
        }
        debug!(count = leaves.len(), "tore down panel leaves");
        leaves.len()
    }

    /// The host closed `leaf` on its own.
    pub fn on_panel_closed(&mut self, leaf: LeafId) -> bool {
        if self.leaf() != Some(leaf) {
            return false;
        }
        if let Some(mut slot) = self.slot.take() {
            slot.frame.destroy();
        }
        debug!(%leaf, "panel closed by host");
        true
    }

    /// Route an inbound message. `None` when it is not from the panel frame.
    pub fn dispatch(&mut self, event: &PeerEvent) -> Option<Dispatch> {
        let slot = self.slot.as_mut()?;
        if slot.frame.key() != Some(event.source) {
            return None;
        }
        Some(slot.frame.handle(event))
    }

    /// Send to the panel frame if it exists.
    pub fn send(&mut self, message: &HostMessage) -> Option<SendOutcome> {
        self.slot.as_mut().map(|slot| slot.frame.send(message))
    }

    fn forget_stale<H: PanelHost + ?Sized>(&mut self, host: &H) {
        let Some(slot) = &self.slot else {
            return;
        };
        if host.leaves_of_type(&self.view_type).contains(&slot.leaf) {
            return;
        }
        debug!(leaf = %slot.leaf, "panel leaf disappeared, forgetting it");
        if let Some(mut slot) = self.slot.take() {
            slot.frame.destroy();
        }
    }
}
