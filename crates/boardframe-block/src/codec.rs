use tracing::warn;

use crate::error::BlockError;
use crate::params::{is_valid_key, ParamValue, ParameterMap, DATA_KEY};

/// Result of decoding a block.
///
/// Decoding never fails as a whole. A malformed `data` value is kept as raw
/// text in `params` and the decode failure is reported in `data_error`.
#[derive(Debug)]
pub struct ParsedBlock {
    pub params: ParameterMap,
    pub data_error: Option<BlockError>,
}

/// Decode the `key:value` lines of a block.
///
/// Lines that do not start with a word-character key followed by `:` are
/// skipped. Values are trimmed. The last occurrence of a key wins.
pub fn parse_block(text: &str) -> ParsedBlock {
    let mut params = ParameterMap::new();
    let mut data_error = None;

    for line in text.lines() {
        let Some((raw_key, raw_value)) = line.split_once(':') else {
            continue;
        };
        let key = raw_key.trim_end();
        if !is_valid_key(key) {
            continue;
        }
        let raw_value = raw_value.trim();

        let value = if key == DATA_KEY {
            match serde_json::from_str(raw_value) {
                Ok(json) => {
                    data_error = None;
                    ParamValue::Json(json)
                }
                Err(source) => {
                    warn!(raw = raw_value, error = %source, "block data is not valid JSON, keeping raw text");
                    data_error = Some(BlockError::InvalidData {
                        raw: raw_value.to_string(),
                        source,
                    });
                    ParamValue::Text(raw_value.to_string())
                }
            }
        } else {
            ParamValue::Text(raw_value.to_string())
        };

        // Key was validated above, insert cannot fail.
        let _ = params.insert(key, value);
    }

    ParsedBlock { params, data_error }
}

/// Encode a parameter map as block lines, one `key:value` per line.
pub fn serialize_block(params: &ParameterMap) -> String {
    let mut out = String::new();
    for (key, value) in params.iter() {
        out.push_str(key);
        out.push(':');
        out.push_str(&value.to_text());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_recognized_keys() {
        let parsed = parse_block("id:abc\ntitle:Plan\nheight:300");

        assert!(parsed.data_error.is_none());
        assert_eq!(parsed.params.get_text("id"), Some("abc"));
        assert_eq!(parsed.params.get_text("title"), Some("Plan"));
        assert_eq!(parsed.params.get_text("height"), Some("300"));
        assert_eq!(
            parsed.params.keys().collect::<Vec<_>>(),
            vec!["id", "title", "height"]
        );
    }

    #[test]
    fn trims_and_allows_space_before_colon() {
        let parsed = parse_block("title  :   Weekly plan  \r\nurl:https://a.example/x");
        assert_eq!(parsed.params.get_text("title"), Some("Weekly plan"));
        assert_eq!(parsed.params.get_text("url"), Some("https://a.example/x"));
    }

    #[test]
    fn skips_lines_without_word_key() {
        let parsed = parse_block("  indented:1\nno colon here\nbad-key:2\n:3\nok:4");
        assert_eq!(parsed.params.keys().collect::<Vec<_>>(), vec!["ok"]);
    }

    #[test]
    fn last_occurrence_wins() {
        let parsed = parse_block("title:One\nheight:10\ntitle:Two");
        assert_eq!(parsed.params.get_text("title"), Some("Two"));
        assert_eq!(parsed.params.len(), 2);
    }

    #[test]
    fn decodes_data_json() {
        let parsed = parse_block(r#"data:{"zoom":2,"tags":["a"]}"#);
        assert!(parsed.data_error.is_none());
        assert_eq!(
            parsed.params.get("data").and_then(ParamValue::as_json),
            Some(&json!({"zoom": 2, "tags": ["a"]}))
        );
    }

    #[test]
    fn malformed_data_keeps_raw_string() {
        let parsed = parse_block("id:abc\ndata:{bad json");

        assert_eq!(parsed.params.get_text("data"), Some("{bad json"));
        assert!(matches!(
            parsed.data_error,
            Some(BlockError::InvalidData { ref raw, .. }) if raw == "{bad json"
        ));
    }

    #[test]
    fn later_valid_data_clears_error() {
        let parsed = parse_block("data:{bad\ndata:[1]");
        assert!(parsed.data_error.is_none());
        assert_eq!(
            parsed.params.get("data").and_then(ParamValue::as_json),
            Some(&json!([1]))
        );
    }

    #[test]
    fn serializes_json_compactly() {
        let mut params = ParameterMap::new();
        params.insert("id", "abc").unwrap();
        params.insert("data", json!({"a": 1})).unwrap();

        assert_eq!(serialize_block(&params), "id:abc\ndata:{\"a\":1}\n");
    }

    proptest! {
        #[test]
        fn text_maps_survive_serialize_then_parse(
            entries in prop::collection::vec(
                (
                    "[A-Za-z0-9_]{1,10}".prop_filter("data is reserved", |key| key != "data"),
                    "[A-Za-z0-9 .:/_-]{0,24}".prop_map(|value| value.trim().to_string()),
                ),
                0..12,
            )
        ) {
            let mut map = ParameterMap::new();
            for (key, value) in &entries {
                map.insert(key.as_str(), value.as_str()).unwrap();
            }

            let parsed = parse_block(&serialize_block(&map));

            prop_assert!(parsed.data_error.is_none());
            prop_assert_eq!(parsed.params, map);
        }
    }
}
