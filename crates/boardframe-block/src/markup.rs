//! Frame element description and container markup.

use boardframe_host::FrameSpec;
use html_escape::encode_double_quoted_attribute as attr;
use url::Url;

use crate::params::ParameterMap;
use crate::state::BlockState;

/// Fixed attributes shared by every frame element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameAppearance {
    /// Class placed on every frame element.
    pub class_marker: String,
    /// Permission grant for the embedded context.
    pub allow: String,
}

impl Default for FrameAppearance {
    fn default() -> Self {
        Self {
            class_marker: "moredraw-iframe".to_string(),
            allow: "clipboard-read; clipboard-write".to_string(),
        }
    }
}

/// Describe the inline frame for a parsed block and its built URL.
///
/// The frame's `data-id` is the `id` that ended up in the URL, which is the
/// generated one when the block had none.
pub fn frame_spec_for(params: &ParameterMap, url: Url, appearance: &FrameAppearance) -> FrameSpec {
    let data_id = url
        .query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned());
    let block = BlockState::from_params(params, data_id.clone().unwrap_or_default());

    FrameSpec {
        url,
        title: block.title,
        height: block.height,
        class_marker: appearance.class_marker.clone(),
        allow: appearance.allow.clone(),
        data_id,
    }
}

/// Render the container a host inserts in place of a block.
pub fn render_frame_markup(spec: &FrameSpec) -> String {
    let data_id = spec
        .data_id
        .as_deref()
        .map(|id| format!(" data-id=\"{}\"", attr(id)))
        .unwrap_or_default();

    format!(
        "<div class=\"iframe-container\" title=\"{title}\"><iframe src=\"{src}\" style=\"width:100%;height:{height}px\" title=\"{title}\"{data_id} class=\"{class}\" allow=\"{allow}\"></iframe></div>",
        title = attr(&spec.title),
        src = attr(spec.url.as_str()),
        height = spec.height,
        class = attr(&spec.class_marker),
        allow = attr(&spec.allow),
    )
}

#[cfg(test)]
mod tests {
    use crate::codec::parse_block;
    use crate::state::{DEFAULT_HEIGHT, FALLBACK_TITLE};

    use super::*;

    #[test]
    fn spec_takes_id_from_url() {
        let parsed = parse_block("title:Plan\nheight:250");
        let url = Url::parse("https://board.example/app?id=generated1&title=Plan").unwrap();
        let spec = frame_spec_for(&parsed.params, url, &FrameAppearance::default());

        assert_eq!(spec.data_id.as_deref(), Some("generated1"));
        assert_eq!(spec.title, "Plan");
        assert_eq!(spec.height, 250);
        assert_eq!(spec.class_marker, "moredraw-iframe");
    }

    #[test]
    fn spec_falls_back_to_defaults() {
        let parsed = parse_block("");
        let url = Url::parse("https://board.example/app").unwrap();
        let spec = frame_spec_for(&parsed.params, url, &FrameAppearance::default());

        assert_eq!(spec.title, FALLBACK_TITLE);
        assert_eq!(spec.height, DEFAULT_HEIGHT);
        assert!(spec.data_id.is_none());
    }

    #[test]
    fn markup_escapes_attributes() {
        let parsed = parse_block("title:\"Tom\" & <Jerry>");
        let url = Url::parse("https://board.example/app?id=a1&x=1").unwrap();
        let spec = frame_spec_for(&parsed.params, url, &FrameAppearance::default());
        let html = render_frame_markup(&spec);

        assert!(html.contains("title=\"&quot;Tom&quot; &amp; "));
        assert!(!html.contains("\"Tom\""));
        assert!(html.contains("src=\"https://board.example/app?id=a1&amp;x=1\""));
        assert!(html.contains("data-id=\"a1\""));
        assert!(html.contains("style=\"width:100%;height:400px\""));
        assert!(html.contains("allow=\"clipboard-read; clipboard-write\""));
        assert!(html.contains("class=\"moredraw-iframe\""));
    }
}
