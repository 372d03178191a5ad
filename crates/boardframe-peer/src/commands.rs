use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Actions a host exposes to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostCommand {
    /// Insert a whiteboard block at the cursor.
    #[serde(rename = "insert")]
    InsertBlock,
    /// Toggle the side-panel view.
    #[serde(rename = "toggle-view")]
    TogglePanel,
}

impl HostCommand {
    pub const ALL: [HostCommand; 2] = [HostCommand::InsertBlock, HostCommand::TogglePanel];

    /// Stable command id.
    pub fn id(self) -> &'static str {
        match self {
            HostCommand::InsertBlock => "insert",
            HostCommand::TogglePanel => "toggle-view",
        }
    }

    /// Name shown in the host's command list.
    pub fn name(self) -> &'static str {
        match self {
            HostCommand::InsertBlock => "Insert White Board",
            HostCommand::TogglePanel => "Toggle White Board panel",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.id() == id)
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for HostCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| format!("unknown command: {s}"))
    }
}

/// An entry the host adds to a menu or toolbar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub title: String,
    pub icon: String,
    pub command: HostCommand,
}

/// How the host registers the side-panel view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelView {
    pub view_type: String,
    pub display_text: String,
    pub icon: String,
}

/// Entries of the editor context menu.
pub fn editor_menu_items() -> Vec<MenuItem> {
    vec![MenuItem {
        title: "Add WhiteBoard".to_string(),
        icon: "pencil".to_string(),
        command: HostCommand::InsertBlock,
    }]
}

/// The ribbon entry that toggles the side panel.
pub fn ribbon_item(icon: &str, tooltip: &str) -> MenuItem {
    MenuItem {
        title: tooltip.to_string(),
        icon: icon.to_string(),
        command: HostCommand::TogglePanel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for command in HostCommand::ALL {
            assert_eq!(HostCommand::from_id(command.id()), Some(command));
            assert_eq!(command.to_string().parse::<HostCommand>(), Ok(command));
        }
        assert_eq!(HostCommand::from_id("delete"), None);
    }

    #[test]
    fn ribbon_toggles_panel() {
        let item = ribbon_item("moredraw-icon", "MoreDraw");
        assert_eq!(item.command, HostCommand::TogglePanel);
        assert_eq!(item.title, "MoreDraw");
    }

    #[test]
    fn serde_uses_ids() {
        let json = serde_json::to_string(&HostCommand::TogglePanel).unwrap();
        assert_eq!(json, "\"toggle-view\"");
        let parsed: HostCommand = serde_json::from_str("\"insert\"").unwrap();
        assert_eq!(parsed, HostCommand::InsertBlock);
    }

    #[test]
    fn editor_menu_inserts_block() {
        let items = editor_menu_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Add WhiteBoard");
        assert_eq!(items[0].icon, "pencil");
        assert_eq!(items[0].command, HostCommand::InsertBlock);
    }
}
