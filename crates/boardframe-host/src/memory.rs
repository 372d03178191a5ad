//! In-memory host.
//!
//! Records every frame mount, posted message, location change, panel leaf and
//! notice so that callers can assert on the effects of the embedding core
//! without a real editor.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{HostError, Result};
use crate::traits::{Editor, FrameElement, FrameHost, Notifier, PanelHost, Workspace};
use crate::types::{
    ActiveView, CursorPosition, DocumentId, FrameKey, FrameSpec, LeafId, MountTarget, ViewMode,
};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) obsidian/1.7.7 Chrome/128.0.6613.186 Electron/32.2.5 Safari/537.36 Obsidian/1.7.7";

/// A message observed on its way into a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostedMessage {
    pub frame: FrameKey,
    pub message: Value,
    pub target_origin: String,
}

/// Snapshot of a frame element the host has mounted.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedFrame {
    pub key: FrameKey,
    pub target: MountTarget,
    pub spec: FrameSpec,
    /// Current location; starts at `spec.url` and follows navigation.
    pub location: Url,
    pub attached: bool,
}

#[derive(Debug, Default)]
struct FrameLog {
    next_key: u64,
    frames: BTreeMap<FrameKey, MountedFrame>,
    posted: Vec<PostedMessage>,
}

struct MemoryFrame {
    key: FrameKey,
    log: Rc<RefCell<FrameLog>>,
}

impl FrameElement for MemoryFrame {
    fn key(&self) -> FrameKey {
        self.key
    }

    fn post_message(&mut self, message: &Value, target_origin: &str) -> Result<()> {
        let mut log = self.log.borrow_mut();
        let attached = log
            .frames
            .get(&self.key)
            .map(|frame| frame.attached)
            .unwrap_or(false);
        if !attached {
            return Err(HostError::FrameDetached(self.key));
        }
        log.posted.push(PostedMessage {
            frame: self.key,
            message: message.clone(),
            target_origin: target_origin.to_string(),
        });
        Ok(())
    }

    fn set_location(&mut self, url: &Url) -> Result<()> {
        let mut log = self.log.borrow_mut();
        match log.frames.get_mut(&self.key) {
            Some(frame) if frame.attached => {
                frame.location = url.clone();
                Ok(())
            }
            _ => Err(HostError::FrameDetached(self.key)),
        }
    }

    fn detach(&mut self) {
        if let Some(frame) = self.log.borrow_mut().frames.get_mut(&self.key) {
            frame.attached = false;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PanelLeaf {
    id: LeafId,
    view_type: String,
    reveals: usize,
}

#[derive(Debug, Default, Clone)]
struct MemoryEditor {
    text: String,
    cursor: CursorPosition,
}

impl MemoryEditor {
    fn byte_offset(&self, at: CursorPosition) -> Option<usize> {
        let mut offset = 0;
        for (index, line) in self.text.split('\n').enumerate() {
            if index == at.line {
                let within = match line.char_indices().nth(at.ch) {
                    Some((byte, _)) => byte,
                    None if line.chars().count() == at.ch => line.len(),
                    None => return None,
                };
                return Some(offset + within);
            }
            offset += line.len() + 1;
        }
        None
    }
}

impl Editor for MemoryEditor {
    fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    fn replace_range(&mut self, text: &str, at: CursorPosition) -> Result<()> {
        let offset = self.byte_offset(at).ok_or(HostError::InvalidPosition(at))?;
        self.text.insert_str(offset, text);
        Ok(())
    }

    fn set_cursor(&mut self, position: CursorPosition) {
        self.cursor = position;
    }
}

/// A host that lives entirely in memory.
pub struct MemoryHost {
    log: Rc<RefCell<FrameLog>>,
    active: Option<ActiveView>,
    locale: String,
    user_agent: String,
    editors: HashMap<DocumentId, MemoryEditor>,
    side_collapsed: bool,
    refuse_side_leaves: bool,
    leaves: Vec<PanelLeaf>,
    next_leaf: u64,
    notices: Vec<String>,
}

impl MemoryHost {
    /// Create a host with locale `en`, no open document and a collapsed side split.
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(FrameLog::default())),
            active: None,
            locale: "en".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            editors: HashMap::new(),
            side_collapsed: true,
            refuse_side_leaves: false,
            leaves: Vec::new(),
            next_leaf: 1,
            notices: Vec::new(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Open an editable document with `text` and focus it in `mode`.
    pub fn open_document(&mut self, document: DocumentId, text: &str, mode: ViewMode) {
        self.editors.insert(
            document.clone(),
            MemoryEditor {
                text: text.to_string(),
                cursor: CursorPosition::default(),
            },
        );
        self.active = Some(ActiveView { document, mode });
    }

    /// Focus an arbitrary view, or none.
    pub fn set_active_view(&mut self, view: Option<ActiveView>) {
        self.active = view;
    }

    /// Switch the focused view between reading and editing.
    pub fn set_mode(&mut self, mode: ViewMode) {
        if let Some(active) = self.active.as_mut() {
            active.mode = mode;
        }
    }

    /// Close a document. Unfocuses it if it was active.
    pub fn close_document(&mut self, document: &DocumentId) {
        self.editors.remove(document);
        if self
            .active
            .as_ref()
            .is_some_and(|active| &active.document == document)
        {
            self.active = None;
        }
    }

    pub fn set_side_collapsed(&mut self, collapsed: bool) {
        self.side_collapsed = collapsed;
    }

    /// Make `allocate_side_leaf` decline every request.
    pub fn refuse_side_leaves(&mut self, refuse: bool) {
        self.refuse_side_leaves = refuse;
    }

    pub fn set_cursor(&mut self, document: &DocumentId, position: CursorPosition) {
        if let Some(editor) = self.editors.get_mut(document) {
            editor.cursor = position;
        }
    }

    pub fn document_text(&self, document: &DocumentId) -> Option<&str> {
        self.editors.get(document).map(|editor| editor.text.as_str())
    }

    pub fn document_cursor(&self, document: &DocumentId) -> Option<CursorPosition> {
        self.editors.get(document).map(|editor| editor.cursor)
    }

    /// Every message posted so far, in delivery order.
    pub fn posted(&self) -> Vec<PostedMessage> {
        self.log.borrow().posted.clone()
    }

    /// Messages posted into one frame, in delivery order.
    pub fn posted_to(&self, frame: FrameKey) -> Vec<Value> {
        self.log
            .borrow()
            .posted
            .iter()
            .filter(|posted| posted.frame == frame)
            .map(|posted| posted.message.clone())
            .collect()
    }

    /// Every frame ever mounted, attached or not, ordered by key.
    pub fn frames(&self) -> Vec<MountedFrame> {
        self.log.borrow().frames.values().cloned().collect()
    }

    pub fn frame(&self, key: FrameKey) -> Option<MountedFrame> {
        self.log.borrow().frames.get(&key).cloned()
    }

    /// Keys of frames still attached, ordered by key.
    pub fn attached_frames(&self) -> Vec<FrameKey> {
        self.log
            .borrow()
            .frames
            .values()
            .filter(|frame| frame.attached)
            .map(|frame| frame.key)
            .collect()
    }

    /// Open side-panel leaves, in allocation order.
    pub fn leaves(&self) -> Vec<LeafId> {
        self.leaves.iter().map(|leaf| leaf.id).collect()
    }

    /// How often a leaf has been revealed.
    pub fn reveal_count(&self, leaf: LeafId) -> usize {
        self.leaves
            .iter()
            .find(|candidate| candidate.id == leaf)
            .map(|candidate| candidate.reveals)
            .unwrap_or(0)
    }

    pub fn side_collapsed(&self) -> bool {
        self.side_collapsed
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace for MemoryHost {
    fn active_view(&self) -> Option<ActiveView> {
        self.active.clone()
    }

    fn locale(&self) -> String {
        self.locale.clone()
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn active_editor(&mut self) -> Option<&mut dyn Editor> {
        let document = self.active.as_ref()?.document.clone();
        self.editors
            .get_mut(&document)
            .map(|editor| editor as &mut dyn Editor)
    }
}

impl FrameHost for MemoryHost {
    fn mount_frame(
        &mut self,
        target: &MountTarget,
        spec: &FrameSpec,
    ) -> Result<Box<dyn FrameElement>> {
        if let MountTarget::Panel(leaf) = target {
            if !self.leaves.iter().any(|candidate| candidate.id == *leaf) {
                return Err(HostError::MountFailed(format!("{leaf} is not open")));
            }
        }

        let mut log = self.log.borrow_mut();
        log.next_key += 1;
        let key = FrameKey(log.next_key);
        log.frames.insert(
            key,
            MountedFrame {
                key,
                target: target.clone(),
                spec: spec.clone(),
                location: spec.url.clone(),
                attached: true,
            },
        );
        debug!(%key, url = %spec.url, "mounted frame");

        Ok(Box::new(MemoryFrame {
            key,
            log: Rc::clone(&self.log),
        }))
    }
}

impl PanelHost for MemoryHost {
    fn is_side_collapsed(&self) -> bool {
        self.side_collapsed
    }

    fn expand_side(&mut self) {
        self.side_collapsed = false;
    }

    fn allocate_side_leaf(&mut self, view_type: &str) -> Option<LeafId> {
        if self.refuse_side_leaves {
            return None;
        }
        let id = LeafId(self.next_leaf);
        self.next_leaf += 1;
        self.leaves.push(PanelLeaf {
            id,
            view_type: view_type.to_string(),
            reveals: 0,
        });
        Some(id)
    }

    fn reveal_leaf(&mut self, leaf: LeafId) {
        if let Some(candidate) = self.leaves.iter_mut().find(|candidate| candidate.id == leaf) {
            candidate.reveals += 1;
        }
    }

    fn detach_leaf(&mut self, leaf: LeafId) {
        self.leaves.retain(|candidate| candidate.id != leaf);
    }

    fn leaves_of_type(&self, view_type: &str) -> Vec<LeafId> {
        self.leaves
            .iter()
            .filter(|leaf| leaf.view_type == view_type)
            .map(|leaf| leaf.id)
            .collect()
    }
}

impl Notifier for MemoryHost {
    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn spec() -> FrameSpec {
        FrameSpec {
            url: Url::parse("https://board.example/app?id=1").unwrap(),
            title: "Plan".to_string(),
            height: 300,
            class_marker: "moredraw-iframe".to_string(),
            allow: "clipboard-read; clipboard-write".to_string(),
            data_id: Some("1".to_string()),
        }
    }

    fn inline() -> MountTarget {
        MountTarget::Inline {
            document: DocumentId::new("notes.md"),
            mode: ViewMode::Edit,
            position: 0,
        }
    }

    #[test]
    fn posts_are_recorded_until_detach() {
        let mut host = MemoryHost::new();
        let mut frame = host.mount_frame(&inline(), &spec()).unwrap();

        frame.post_message(&json!({"action": "reload"}), "*").unwrap();
        frame.detach();
        let err = frame.post_message(&json!({"action": "reload"}), "*");

        assert!(matches!(err, Err(HostError::FrameDetached(_))));
        assert_eq!(host.posted_to(frame.key()), vec![json!({"action": "reload"})]);
        assert!(host.attached_frames().is_empty());
    }

    #[test]
    fn set_location_updates_snapshot() {
        let mut host = MemoryHost::new();
        let mut frame = host.mount_frame(&inline(), &spec()).unwrap();
        let next = Url::parse("https://board.example/app/board/42").unwrap();

        frame.set_location(&next).unwrap();

        assert_eq!(host.frame(frame.key()).unwrap().location, next);
    }

    #[test]
    fn panel_mount_requires_open_leaf() {
        let mut host = MemoryHost::new();
        let result = host.mount_frame(&MountTarget::Panel(LeafId(9)), &spec());
        assert!(matches!(result, Err(HostError::MountFailed(_))));

        let leaf = host.allocate_side_leaf("view").unwrap();
        assert!(host.mount_frame(&MountTarget::Panel(leaf), &spec()).is_ok());
    }

    #[test]
    fn editor_inserts_at_line_and_char() {
        let mut host = MemoryHost::new();
        let doc = DocumentId::new("a.md");
        host.open_document(doc.clone(), "first\nsecond", ViewMode::Edit);

        let editor = host.active_editor().unwrap();
        editor.replace_range("X", CursorPosition::new(1, 3)).unwrap();
        assert!(editor
            .replace_range("Y", CursorPosition::new(5, 0))
            .is_err());

        assert_eq!(host.document_text(&doc), Some("first\nsecXond"));
    }

    #[test]
    fn closing_active_document_clears_focus() {
        let mut host = MemoryHost::new();
        let doc = DocumentId::new("a.md");
        host.open_document(doc.clone(), "", ViewMode::Preview);
        host.close_document(&doc);

        assert!(host.active_view().is_none());
        assert!(host.active_editor().is_none());
    }
}
