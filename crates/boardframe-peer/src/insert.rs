use boardframe_block::{generate_identifier, BlockState};
use boardframe_host::{CursorPosition, Notifier, Workspace};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{EmbedError, Result};

/// Notice shown when insertion has no editable document to write into.
pub const NO_DOCUMENT_NOTICE: &str = "No document open";

/// A block written into the focused document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertedBlock {
    pub id: String,
    /// Where the block text was inserted.
    pub at: CursorPosition,
    /// Cursor after insertion: the first line after the block.
    pub cursor: CursorPosition,
}

/// Insert a fresh whiteboard block at the cursor of the focused document.
///
/// Without an editable document the user is notified and nothing changes.
pub fn insert_new_block<H>(host: &mut H, language: &str, id_length: usize) -> Result<InsertedBlock>
where
    H: Workspace + Notifier + ?Sized,
{
    let Some(editor) = host.active_editor() else {
        warn!("block insertion without an open document");
        host.notify(NO_DOCUMENT_NOTICE);
        return Err(EmbedError::NoActiveDocument);
    };

    let id = generate_identifier(id_length);
    let text = BlockState::new(id.clone()).to_fenced(language);
    let at = editor.cursor();
    editor.replace_range(&text, at)?;

    let cursor = CursorPosition::new(at.line + text.matches('\n').count(), 0);
    editor.set_cursor(cursor);
    info!(%id, line = at.line, "inserted whiteboard block");

    Ok(InsertedBlock { id, at, cursor })
}
