use crate::params::{ParamValue, ParameterMap};

/// Title written into newly inserted blocks.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Title shown when a rendered block has none.
pub const FALLBACK_TITLE: &str = "Default Title";

/// Frame height in pixels for new blocks and blocks without a usable height.
pub const DEFAULT_HEIGHT: u32 = 400;

/// The persisted form of one whiteboard.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockState {
    pub id: String,
    pub title: String,
    pub height: u32,
    pub data: Option<ParamValue>,
}

impl BlockState {
    /// A fresh block with the default title and height.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            height: DEFAULT_HEIGHT,
            data: None,
        }
    }

    /// Read a block back from parsed parameters.
    ///
    /// Missing titles fall back to [`FALLBACK_TITLE`]; missing or non-numeric
    /// heights to [`DEFAULT_HEIGHT`]. The `id` is taken as given.
    pub fn from_params(params: &ParameterMap, id: impl Into<String>) -> Self {
        let title = params
            .get_text("title")
            .filter(|title| !title.is_empty())
            .unwrap_or(FALLBACK_TITLE)
            .to_string();
        let height = params
            .get_text("height")
            .and_then(parse_height)
            .unwrap_or(DEFAULT_HEIGHT);

        Self {
            id: id.into(),
            title,
            height,
            data: params.get("data").cloned(),
        }
    }

    /// Block body: one `key:value` line per field, newline terminated.
    pub fn to_block_text(&self) -> String {
        let mut out = format!("id:{}\ntitle:{}\nheight:{}\n", self.id, self.title, self.height);
        if let Some(data) = &self.data {
            out.push_str("data:");
            out.push_str(&data.to_text());
            out.push('\n');
        }
        out
    }

    /// The block as inserted into a document: a fenced code block tagged with
    /// `language`, surrounded by one newline on each side.
    pub fn to_fenced(&self, language: &str) -> String {
        format!("\n```{language}\n{}```\n", self.to_block_text())
    }
}

/// Accepts `300` and `300px`.
fn parse_height(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let digits = raw.strip_suffix("px").unwrap_or(raw).trim_end();
    digits.parse::<u32>().ok().filter(|height| *height > 0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::codec::parse_block;

    use super::*;

    #[test]
    fn fenced_block_layout() {
        let block = BlockState::new("abc");
        assert_eq!(
            block.to_fenced("moredraw"),
            "\n```moredraw\nid:abc\ntitle:Untitled\nheight:400\n```\n"
        );
    }

    #[test]
    fn from_params_applies_fallbacks() {
        let parsed = parse_block("height:tall");
        let block = BlockState::from_params(&parsed.params, "x");

        assert_eq!(block.title, FALLBACK_TITLE);
        assert_eq!(block.height, DEFAULT_HEIGHT);
        assert!(block.data.is_none());
    }

    #[test]
    fn from_params_reads_fields() {
        let parsed = parse_block("title:Plan\nheight:320px\ndata:{\"a\":1}");
        let block = BlockState::from_params(&parsed.params, "x");

        assert_eq!(block.title, "Plan");
        assert_eq!(block.height, 320);
        assert_eq!(block.data, Some(ParamValue::Json(json!({"a": 1}))));
    }

    #[test]
    fn block_text_reparses_to_same_state() {
        let mut block = BlockState::new("abc");
        block.data = Some(ParamValue::Json(json!({"zoom": 1.5})));

        let parsed = parse_block(&block.to_block_text());
        let id = parsed.params.get_text("id").unwrap().to_string();

        assert_eq!(BlockState::from_params(&parsed.params, id), block);
    }
}
