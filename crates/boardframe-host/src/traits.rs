use serde_json::Value;
use url::Url;

use crate::error::Result;
use crate::types::{ActiveView, CursorPosition, FrameKey, FrameSpec, LeafId, MountTarget};

/// A frame element mounted by the host.
///
/// The embedding core owns each element exclusively through a `Box` and is
/// responsible for calling [`FrameElement::detach`] when its instance is
/// destroyed.
pub trait FrameElement {
    /// Host handle of this element.
    fn key(&self) -> FrameKey;

    /// Post a message into the frame's browsing context.
    fn post_message(&mut self, message: &Value, target_origin: &str) -> Result<()>;

    /// Point the frame at a new location without recreating the element.
    fn set_location(&mut self, url: &Url) -> Result<()>;

    /// Remove the element from the host. Idempotent.
    fn detach(&mut self);
}

/// Mounts frame elements into the host's rendering tree.
pub trait FrameHost {
    fn mount_frame(&mut self, target: &MountTarget, spec: &FrameSpec)
        -> Result<Box<dyn FrameElement>>;
}

/// Cursor and text access for the focused document editor.
pub trait Editor {
    fn cursor(&self) -> CursorPosition;

    /// Insert `text` at `at`.
    fn replace_range(&mut self, text: &str, at: CursorPosition) -> Result<()>;

    fn set_cursor(&mut self, position: CursorPosition);
}

/// Ambient host state queried on demand.
pub trait Workspace {
    /// The focused document view, if any.
    fn active_view(&self) -> Option<ActiveView>;

    /// Host locale tag, e.g. `en` or `zh-cn`.
    fn locale(&self) -> String;

    /// User-agent-like string carrying the host product version.
    fn user_agent(&self) -> String;

    /// The editor of the focused document, if it is editable.
    fn active_editor(&mut self) -> Option<&mut dyn Editor>;
}

/// Side-panel leaf management.
pub trait PanelHost {
    fn is_side_collapsed(&self) -> bool;

    fn expand_side(&mut self);

    /// Ask for a new leaf in the side split. `None` means the host declined.
    fn allocate_side_leaf(&mut self, view_type: &str) -> Option<LeafId>;

    fn reveal_leaf(&mut self, leaf: LeafId);

    fn detach_leaf(&mut self, leaf: LeafId);

    /// Leaves currently holding a view of `view_type`, in host order.
    fn leaves_of_type(&self, view_type: &str) -> Vec<LeafId>;
}

/// Transient user-visible notices.
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Every host surface the embedding core talks to.
pub trait Host: Workspace + FrameHost + PanelHost + Notifier {}

impl<T: Workspace + FrameHost + PanelHost + Notifier + ?Sized> Host for T {}
