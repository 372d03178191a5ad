use std::collections::BTreeMap;

use boardframe_host::{ActiveView, DocumentId, FrameKey, MountTarget, ViewMode};
use serde::Serialize;
use tracing::debug;

use crate::instance::{Dispatch, FrameInstance, SendOutcome};
use crate::message::{HostMessage, PeerEvent};

/// Delivery summary of a reload broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    /// Frames that received the reload, in document order.
    pub delivered: Vec<FrameKey>,
    /// Frames that were targeted but not ready.
    pub skipped: Vec<FrameKey>,
}

/// Registry of live inline frames, keyed by document and render mode.
///
/// Frames of one view are kept in document order. Registering a frame at a
/// position already taken replaces (and destroys) the previous one, which is
/// what happens when the host re-renders a block in place. A block that moves
/// to another line leaves its old frame behind until the host releases it
/// with [`LiveFrames::release`] or [`LiveFrames::release_view`].
#[derive(Debug, Default)]
pub struct LiveFrames {
    views: BTreeMap<(DocumentId, ViewMode), Vec<FrameInstance>>,
}

impl LiveFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a mounted inline frame. Panel frames are refused and
    /// handed back.
    pub fn register(&mut self, frame: FrameInstance) -> Result<(), FrameInstance> {
        let (document, mode, position) = match frame.target() {
            MountTarget::Inline {
                document,
                mode,
                position,
            } => (document.clone(), *mode, *position),
            MountTarget::Panel(_) => return Err(frame),
        };

        let frames = self.views.entry((document, mode)).or_default();
        let slot = frames.partition_point(|existing| inline_position(existing) < position);
        if frames
            .get(slot)
            .is_some_and(|existing| inline_position(existing) == position)
        {
            debug!(position, "replacing frame at rendered position");
            frames[slot] = frame;
        } else {
            frames.insert(slot, frame);
        }
        Ok(())
    }

    /// Frames of one view, in document order.
    pub fn frames(&self, document: &DocumentId, mode: ViewMode) -> &[FrameInstance] {
        self.views
            .get(&(document.clone(), mode))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn find(&self, key: FrameKey) -> Option<&FrameInstance> {
        self.views
            .values()
            .flatten()
            .find(|frame| frame.key() == Some(key))
    }

    pub fn len(&self) -> usize {
        self.views.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Send `{action:"reload"}` to every frame of the active view.
    ///
    /// Frames that are not ready are skipped. Frames of other documents and
    /// of the other render mode are not touched.
    pub fn broadcast_reload(&mut self, active: &ActiveView) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let Some(frames) = self.views.get_mut(&(active.document.clone(), active.mode)) else {
            return report;
        };

        for frame in frames.iter_mut() {
            let Some(key) = frame.key() else {
                continue;
            };
            match frame.send(&HostMessage::Reload) {
                SendOutcome::Delivered => report.delivered.push(key),
                _ => report.skipped.push(key),
            }
        }
        debug!(
            document = %active.document,
            mode = %active.mode,
            delivered = report.delivered.len(),
            skipped = report.skipped.len(),
            "broadcast reload"
        );
        report
    }

    /// Route an inbound message. `None` when no live frame has that key.
    pub fn dispatch(&mut self, event: &PeerEvent) -> Option<Dispatch> {
        self.views
            .values_mut()
            .flatten()
            .find(|frame| frame.key() == Some(event.source))
            .map(|frame| frame.handle(event))
    }

    /// Destroy every frame of `document`, in both modes.
    pub fn release_document(&mut self, document: &DocumentId) -> usize {
        let keys: Vec<_> = self
            .views
            .keys()
            .filter(|(doc, _)| doc == document)
            .cloned()
            .collect();
        let mut released = 0;
        for key in keys {
            if let Some(frames) = self.views.remove(&key) {
                released += frames.len();
            }
        }
        debug!(%document, released, "released document frames");
        released
    }

    /// Destroy one frame. Returns whether it was live.
    pub fn release(&mut self, key: FrameKey) -> bool {
        let mut emptied = None;
        let mut released = false;
        for (view, frames) in self.views.iter_mut() {
            if let Some(index) = frames.iter().position(|frame| frame.key() == Some(key)) {
                frames.remove(index);
                released = true;
                if frames.is_empty() {
                    emptied = Some(view.clone());
                }
                break;
            }
        }
        if let Some(view) = emptied {
            self.views.remove(&view);
        }
        if released {
            debug!(%key, "released frame");
        }
        released
    }

    /// Destroy every frame of one view, e.g. before a full re-render.
    pub fn release_view(&mut self, document: &DocumentId, mode: ViewMode) -> usize {
        let released = self
            .views
            .remove(&(document.clone(), mode))
            .map(|frames| frames.len())
            .unwrap_or(0);
        debug!(%document, %mode, released, "released view frames");
        released
    }

    /// Destroy every frame.
    pub fn release_all(&mut self) -> usize {
        let released = self.len();
        self.views.clear();
        released
    }
}

fn inline_position(frame: &FrameInstance) -> usize {
    match frame.target() {
        MountTarget::Inline { position, .. } => *position,
        MountTarget::Panel(_) => usize::MAX,
    }
}

#[cfg(test)]
mod tests {
    use boardframe_host::{FrameSpec, MemoryHost};
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::instance::InstanceOptions;

    fn spec(id: &str) -> FrameSpec {
        FrameSpec {
            url: Url::parse(&format!("https://moredraw.com/app/get-started/obsidian?id={id}"))
                .unwrap(),
            title: "Plan".to_string(),
            height: 400,
            class_marker: "moredraw-iframe".to_string(),
            allow: "clipboard-read; clipboard-write".to_string(),
            data_id: Some(id.to_string()),
        }
    }

    fn mount(
        host: &mut MemoryHost,
        live: &mut LiveFrames,
        document: &str,
        mode: ViewMode,
        position: usize,
    ) -> FrameKey {
        let target = MountTarget::Inline {
            document: DocumentId::new(document),
            mode,
            position,
        };
        let mut frame =
            FrameInstance::new(target, spec(&format!("b{position}")), InstanceOptions::default());
        let key = frame.mount(host).unwrap();
        live.register(frame).unwrap();
        key
    }

    fn ready(live: &mut LiveFrames, key: FrameKey) {
        assert_eq!(
            live.dispatch(&PeerEvent::new(key, json!("ready"))),
            Some(Dispatch::Ready)
        );
    }

    fn active(document: &str, mode: ViewMode) -> ActiveView {
        ActiveView {
            document: DocumentId::new(document),
            mode,
        }
    }

    #[test]
    fn reload_reaches_only_active_view_in_document_order() {
        let mut host = MemoryHost::new();
        let mut live = LiveFrames::new();
        let late = mount(&mut host, &mut live, "a.md", ViewMode::Edit, 20);
        let early = mount(&mut host, &mut live, "a.md", ViewMode::Edit, 2);
        let preview = mount(&mut host, &mut live, "a.md", ViewMode::Preview, 2);
        let other = mount(&mut host, &mut live, "b.md", ViewMode::Edit, 2);
        for key in [late, early, preview, other] {
            ready(&mut live, key);
        }

        let report = live.broadcast_reload(&active("a.md", ViewMode::Edit));

        assert_eq!(report.delivered, vec![early, late]);
        assert!(report.skipped.is_empty());
        let reloads: Vec<_> = host
            .posted()
            .into_iter()
            .filter(|posted| posted.message == json!({"action": "reload"}))
            .map(|posted| posted.frame)
            .collect();
        assert_eq!(reloads, vec![early, late]);
    }

    #[test]
    fn reload_skips_frames_awaiting_ready() {
        let mut host = MemoryHost::new();
        let mut live = LiveFrames::new();
        let key = mount(&mut host, &mut live, "a.md", ViewMode::Preview, 0);

        let report = live.broadcast_reload(&active("a.md", ViewMode::Preview));

        assert!(report.delivered.is_empty());
        assert_eq!(report.skipped, vec![key]);
        assert!(host.posted().is_empty());
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn reload_never_changes_the_frame_set() {
        let mut host = MemoryHost::new();
        let mut live = LiveFrames::new();
        let key = mount(&mut host, &mut live, "a.md", ViewMode::Edit, 0);
        ready(&mut live, key);

        live.broadcast_reload(&active("a.md", ViewMode::Edit));
        live.broadcast_reload(&active("missing.md", ViewMode::Edit));

        assert_eq!(live.len(), 1);
        assert_eq!(host.frames().len(), 1);
        assert_eq!(host.attached_frames(), vec![key]);
    }

    #[test]
    fn re_render_at_same_position_replaces() {
        let mut host = MemoryHost::new();
        let mut live = LiveFrames::new();
        let first = mount(&mut host, &mut live, "a.md", ViewMode::Edit, 4);
        let second = mount(&mut host, &mut live, "a.md", ViewMode::Edit, 4);

        assert_eq!(live.len(), 1);
        assert!(live.find(first).is_none());
        assert!(live.find(second).is_some());
        assert_eq!(host.attached_frames(), vec![second]);
    }

    #[test]
    fn release_document_destroys_both_modes() {
        let mut host = MemoryHost::new();
        let mut live = LiveFrames::new();
        mount(&mut host, &mut live, "a.md", ViewMode::Edit, 0);
        mount(&mut host, &mut live, "a.md", ViewMode::Preview, 0);
        let kept = mount(&mut host, &mut live, "b.md", ViewMode::Edit, 0);

        assert_eq!(live.release_document(&DocumentId::new("a.md")), 2);

        assert_eq!(host.attached_frames(), vec![kept]);
        assert_eq!(live.release_all(), 1);
        assert!(live.is_empty());
        assert!(host.attached_frames().is_empty());
    }

    #[test]
    fn release_drops_one_frame() {
        let mut host = MemoryHost::new();
        let mut live = LiveFrames::new();
        let gone = mount(&mut host, &mut live, "a.md", ViewMode::Edit, 0);
        let kept = mount(&mut host, &mut live, "a.md", ViewMode::Edit, 3);

        assert!(live.release(gone));
        assert!(!live.release(gone));

        assert_eq!(live.len(), 1);
        assert_eq!(host.attached_frames(), vec![kept]);
        assert!(live.release(kept));
        assert!(live.is_empty());
    }

    #[test]
    fn release_view_leaves_other_mode() {
        let mut host = MemoryHost::new();
        let mut live = LiveFrames::new();
        mount(&mut host, &mut live, "a.md", ViewMode::Edit, 0);
        mount(&mut host, &mut live, "a.md", ViewMode::Edit, 5);
        let kept = mount(&mut host, &mut live, "a.md", ViewMode::Preview, 0);

        assert_eq!(live.release_view(&DocumentId::new("a.md"), ViewMode::Edit), 2);
        assert_eq!(live.release_view(&DocumentId::new("a.md"), ViewMode::Edit), 0);

        assert_eq!(host.attached_frames(), vec![kept]);
        assert!(live.frames(&DocumentId::new("a.md"), ViewMode::Edit).is_empty());
    }

    #[test]
    fn panel_frames_are_refused() {
        let mut host = MemoryHost::new();
        let mut live = LiveFrames::new();
        let leaf = boardframe_host::PanelHost::allocate_side_leaf(&mut host, "view").unwrap();
        let mut frame = FrameInstance::new(
            MountTarget::Panel(leaf),
            spec("panel"),
            InstanceOptions::default(),
        );
        frame.mount(&mut host).unwrap();

        assert!(live.register(frame).is_err());
        assert!(live.is_empty());
    }

    #[test]
    fn unknown_source_is_not_dispatched() {
        let mut live = LiveFrames::new();
        assert_eq!(live.dispatch(&PeerEvent::new(FrameKey(7), json!("ready"))), None);
    }
}
