use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Opaque identifier of a document open in the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render mode of a document view.
///
/// A document renders reading (`preview`) and editing (`edit`) views into
/// separate containers, so a frame mounted for one mode is distinct from a
/// frame mounted for the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Preview,
    Edit,
}

impl ViewMode {
    /// Query-parameter spelling of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Preview => "preview",
            ViewMode::Edit => "edit",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The document view that currently has focus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveView {
    pub document: DocumentId,
    pub mode: ViewMode,
}

/// Host-assigned handle of a side-panel leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeafId(pub u64);

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "leaf-{}", self.0)
    }
}

/// Host-assigned handle of a mounted frame element.
///
/// Inbound peer messages carry the key of the frame they came from, which is
/// how they are routed back to the owning instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameKey(pub u64);

impl fmt::Display for FrameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame-{}", self.0)
    }
}

/// Zero-based editor cursor position. `ch` counts characters, not bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub line: usize,
    pub ch: usize,
}

impl CursorPosition {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// Where a frame element is placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountTarget {
    /// Inside a rendered block of a document. `position` is the block's line
    /// in the document and defines document order.
    Inline {
        document: DocumentId,
        mode: ViewMode,
        position: usize,
    },
    /// Inside a side-panel leaf.
    Panel(LeafId),
}

/// Everything the host needs to create a frame element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    pub url: Url,
    pub title: String,
    pub height: u32,
    pub class_marker: String,
    pub allow: String,
    pub data_id: Option<String>,
}
